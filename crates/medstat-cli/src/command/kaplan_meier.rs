use std::path::PathBuf;

use clap::Args;
use medstat_analysis::kaplan_meier::KaplanMeierParams;
use medstat_plot::{
    kaplan_meier::{DEFAULT_OUTPUT_PATH, KaplanMeierPlot, KaplanMeierPlotConfig, kaplan_meier_plot},
    settings::init_plot_settings,
};

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct KaplanMeierArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Column with time to event or censoring
    #[arg(long)]
    pub time: String,

    /// Column with the event indicator (1 = event, 0 = censored)
    #[arg(long)]
    pub event: String,

    /// Column used to split the rows into two cohorts
    #[arg(long)]
    pub group: String,

    /// Split at `group <= threshold`; without it the group column must have two values
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Output SVG path
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Skip the log-rank test
    #[arg(long)]
    pub no_test: bool,

    /// Plot title (default: derived from the group column)
    #[arg(long)]
    pub title: Option<String>,

    /// Also write both survival tables as CSV to this path
    #[arg(long)]
    pub km_csv: Option<PathBuf>,
}

pub(crate) fn run(arg: &KaplanMeierArg) -> anyhow::Result<()> {
    init_plot_settings();
    let dataset = util::read_dataset_file(&arg.dataset)?;

    let params = KaplanMeierParams {
        time_column: arg.time.clone(),
        event_column: arg.event.clone(),
        group_column: arg.group.clone(),
        threshold: arg.threshold,
    };
    let config = KaplanMeierPlotConfig {
        include_significance_test: !arg.no_test,
        output_path: Some(arg.output.clone()),
        title: arg.title.clone(),
    };

    eprintln!("Computing Kaplan-Meier curves by {}...", params.group_column);
    let plot = kaplan_meier_plot(&dataset, &params, &config)?;
    eprintln!("Plot saved to: {}", arg.output.display());

    print_summary(&plot);

    if let Some(path) = &arg.km_csv {
        util::write_text_file("KM curve CSV", path, &plot.comparison.to_csv())?;
    }

    Ok(())
}

fn print_summary(plot: &KaplanMeierPlot) {
    let comparison = &plot.comparison;
    println!("Kaplan-Meier comparison by {}", comparison.group_column);
    println!("==========================================");
    println!(
        "{:<24} {:>8} {:>8} {:>10}",
        "Cohort", "N", "Events", "Median"
    );
    for labeled in &comparison.curves {
        let median = labeled
            .curve
            .median_survival()
            .map_or_else(|| "NR".to_string(), |m| format!("{m:.2}"));
        println!(
            "{:<24} {:>8} {:>8} {:>10}",
            labeled.label,
            labeled.curve.n_observations(),
            labeled.curve.n_events(),
            median
        );
    }
    if let Some(result) = &comparison.log_rank {
        println!();
        println!(
            "Log-rank test: chi2 = {:.4} (df = {}), p-value: {:.5}",
            result.chi_squared, result.df, result.p_value
        );
    }
}
