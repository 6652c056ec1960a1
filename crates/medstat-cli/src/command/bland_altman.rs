use std::path::PathBuf;

use clap::Args;
use medstat_plot::{
    bland_altman::bland_altman_plot_columns, figure::Figure, kaplan_meier::DEFAULT_OUTPUT_PATH,
    settings::init_plot_settings,
};

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct BlandAltmanArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Column with the reference measurements
    #[arg(long)]
    pub true_column: String,

    /// Column with the compared measurements
    #[arg(long)]
    pub pred_column: String,

    /// Output SVG path
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Plot title
    #[arg(long)]
    pub title: Option<String>,
}

pub(crate) fn run(arg: &BlandAltmanArg) -> anyhow::Result<()> {
    init_plot_settings();
    let dataset = util::read_dataset_file(&arg.dataset)?;

    let (axes, stats) = bland_altman_plot_columns(
        &dataset,
        &arg.true_column,
        &arg.pred_column,
        arg.title.as_deref(),
    )?;
    Figure::single(axes).save(&arg.output)?;
    eprintln!("Plot saved to: {}", arg.output.display());

    println!("Bland-Altman agreement ({} pairs)", stats.means.len());
    println!("==========================================");
    println!("Mean difference: {:.4}", stats.mean_difference);
    println!("SD of differences: {:.4}", stats.std_dev_difference);
    println!("Upper LoA: {:.4}", stats.upper_limit);
    println!("Lower LoA: {:.4}", stats.lower_limit);
    if let Some(test) = &stats.t_test {
        println!(
            "Paired t-test: t = {:.4} (df = {}), p-value: {:.6}",
            test.t_statistic, test.df, test.p_value
        );
    }
    Ok(())
}
