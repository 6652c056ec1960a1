use std::path::PathBuf;

use clap::Args;
use medstat_analysis::regression::{multivariate_cox_regression, univariate_cox_regression};

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct CoxArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Column with time to event or censoring
    #[arg(long)]
    pub duration: String,

    /// Column with the event indicator (1 = event, 0 = censored)
    #[arg(long)]
    pub event: String,

    /// Covariate columns (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub features: Vec<String>,

    /// Fit one model per covariate instead of one model with all of them
    #[arg(long)]
    pub univariate: bool,

    /// Also write the summaries as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub(crate) fn run(arg: &CoxArg) -> anyhow::Result<()> {
    let dataset = util::read_dataset_file(&arg.dataset)?;
    let features = arg.features.iter().map(String::as_str).collect::<Vec<_>>();

    let summaries = if arg.univariate {
        eprintln!("Fitting {} univariate Cox models...", features.len());
        univariate_cox_regression(&dataset, &arg.duration, &arg.event, &features)?
    } else {
        eprintln!("Fitting multivariate Cox model...");
        vec![multivariate_cox_regression(
            &dataset,
            &arg.duration,
            &arg.event,
            &features,
        )?]
    };

    for summary in &summaries {
        println!("{summary}");
    }

    if let Some(path) = &arg.json {
        util::save_json("Cox summaries", &summaries, path)?;
    }
    Ok(())
}
