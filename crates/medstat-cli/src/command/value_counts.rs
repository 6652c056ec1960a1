use std::path::PathBuf;

use clap::Args;
use medstat_analysis::value_counts::value_counts_for;

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct ValueCountsArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Columns to tabulate (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// Write the tables as JSON to this path instead of printing them
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub(crate) fn run(arg: &ValueCountsArg) -> anyhow::Result<()> {
    let dataset = util::read_dataset_file(&arg.dataset)?;
    let columns = arg.columns.iter().map(String::as_str).collect::<Vec<_>>();
    let tables = value_counts_for(&dataset, &columns)?;

    if let Some(path) = &arg.json {
        util::save_json("Value counts", &tables, path)?;
        return Ok(());
    }
    for table in &tables {
        println!("{table}");
    }
    Ok(())
}
