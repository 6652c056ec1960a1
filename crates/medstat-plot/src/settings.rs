//! Process-wide rendering configuration.
//!
//! Settings are installed at most once per process with
//! [`init_plot_settings`]. Renderers only read them through
//! [`plot_settings`], which falls back to [`PlotSettings::default`] when
//! nothing was installed.

use std::sync::OnceLock;

static SETTINGS: OnceLock<PlotSettings> = OnceLock::new();

/// Fonts and canvas size shared by every figure.
///
/// Figures are written as SVG, where every label stays a `<text>` element
/// that vector editors can select and retype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotSettings {
    /// Font family written into the `font-family` attribute of text elements.
    pub font_family: String,
    pub font_size: u32,
    pub title_font_size: u32,
    /// Width of a single panel in pixels.
    pub width: u32,
    /// Height of a single panel in pixels.
    pub height: u32,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 14,
            title_font_size: 18,
            width: 640,
            height: 480,
        }
    }
}

impl PlotSettings {
    /// Settings for figures that are post-edited in a vector editor.
    ///
    /// Names a concrete font that editors have installed so the text is
    /// re-rendered with the same metrics.
    #[must_use]
    pub fn editable_text() -> Self {
        Self {
            font_family: "Arial".to_string(),
            ..Self::default()
        }
    }
}

/// Installs [`PlotSettings::editable_text`] for the rest of the process.
///
/// Calling it again, from any thread, returns the already installed settings.
pub fn init_plot_settings() -> &'static PlotSettings {
    SETTINGS.get_or_init(PlotSettings::editable_text)
}

/// Installed settings, or the defaults before [`init_plot_settings`] runs.
#[must_use]
pub fn plot_settings() -> PlotSettings {
    SETTINGS.get().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_init_is_idempotent_across_threads() {
        let handles = (0..4)
            .map(|_| thread::spawn(|| init_plot_settings().clone()))
            .collect::<Vec<_>>();
        let installed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();
        assert!(installed.iter().all(|s| *s == PlotSettings::editable_text()));
        assert_eq!(plot_settings(), PlotSettings::editable_text());
        assert!(std::ptr::eq(init_plot_settings(), init_plot_settings()));
    }
}
