use std::path::PathBuf;

use clap::Args;
use medstat_analysis::regression::{
    ClassificationReport, LogisticOptions, multivariate_logistic_regression,
    multivariate_logistic_regression_adjusted, univariate_logistic_regression,
};

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct LogisticArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Binary outcome column
    #[arg(long)]
    pub target: String,

    /// Covariate columns (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub features: Vec<String>,

    /// Fit one classifier per covariate
    #[arg(long, conflicts_with = "adjust")]
    pub univariate: bool,

    /// Fit an unpenalized logit on all rows, adjusted for these columns (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub adjust: Option<Vec<String>>,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = LogisticOptions::default().test_size)]
    pub test_size: f64,

    /// Seed of the train/test split
    #[arg(long, default_value_t = LogisticOptions::default().seed)]
    pub seed: u64,

    /// Write the results as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub(crate) fn run(arg: &LogisticArg) -> anyhow::Result<()> {
    let dataset = util::read_dataset_file(&arg.dataset)?;
    let features = arg.features.iter().map(String::as_str).collect::<Vec<_>>();

    if let Some(adjust) = &arg.adjust {
        let adjust = adjust.iter().map(String::as_str).collect::<Vec<_>>();
        eprintln!("Fitting adjusted logit model...");
        let summary =
            multivariate_logistic_regression_adjusted(&dataset, &arg.target, &features, &adjust)?;
        println!("{summary}");
        if let Some(path) = &arg.json {
            util::save_json("Logit summary", &summary, path)?;
        }
        return Ok(());
    }

    let options = LogisticOptions {
        test_size: arg.test_size,
        seed: arg.seed,
        ..LogisticOptions::default()
    };
    let reports = if arg.univariate {
        eprintln!("Fitting {} univariate classifiers...", features.len());
        univariate_logistic_regression(&dataset, &arg.target, &features, &options)?
    } else {
        eprintln!("Fitting multivariate classifier...");
        vec![multivariate_logistic_regression(
            &dataset,
            &arg.target,
            &features,
            &options,
        )?]
    };

    for report in &reports {
        print_report(report);
    }
    if let Some(path) = &arg.json {
        util::save_json("Classification reports", &reports, path)?;
    }
    Ok(())
}

fn print_report(report: &ClassificationReport) {
    println!("Features: {}", report.features.join(", "));
    println!("  train/test rows: {}/{}", report.n_train, report.n_test);
    println!("  Accuracy: {:.2}", report.accuracy);
    match report.roc_auc {
        Some(auc) => println!("  ROC AUC: {auc:.2}"),
        None => println!("  ROC AUC: undefined (single class in test rows)"),
    }
}
