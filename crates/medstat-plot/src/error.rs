use std::{io, path::PathBuf};

use medstat_analysis::error::AnalysisError;
use medstat_stats::agreement::AgreementError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RenderError {
    #[display("failed to draw figure: {message}")]
    Draw { message: String },
    #[display("failed to write figure to {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("a {rows}x{cols} grid cannot hold {panels} panels")]
    InvalidGrid {
        rows: usize,
        cols: usize,
        panels: usize,
    },
}

pub(crate) fn draw_error<E>(error: E) -> RenderError
where
    E: std::fmt::Display,
{
    RenderError::Draw {
        message: error.to_string(),
    }
}

/// Failure of a plotting workflow.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PlotError {
    #[display("{source}")]
    Analysis { source: AnalysisError },
    #[display("{source}")]
    Render { source: RenderError },
}

impl From<AnalysisError> for PlotError {
    fn from(source: AnalysisError) -> Self {
        Self::Analysis { source }
    }
}

impl From<RenderError> for PlotError {
    fn from(source: RenderError) -> Self {
        Self::Render { source }
    }
}

impl From<AgreementError> for PlotError {
    fn from(source: AgreementError) -> Self {
        Self::Analysis {
            source: source.into(),
        }
    }
}
