use clap::{Parser, Subcommand};

use self::{
    bland_altman::BlandAltmanArg, cox::CoxArg, kaplan_meier::KaplanMeierArg,
    logistic::LogisticArg, value_counts::ValueCountsArg,
};

mod bland_altman;
mod cox;
mod kaplan_meier;
mod logistic;
mod value_counts;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Compare survival of two cohorts with a Kaplan-Meier plot and log-rank test
    KaplanMeier(#[clap(flatten)] KaplanMeierArg),
    /// Plot agreement between two measurement columns
    BlandAltman(#[clap(flatten)] BlandAltmanArg),
    /// Print frequency tables of categorical columns
    ValueCounts(#[clap(flatten)] ValueCountsArg),
    /// Fit Cox proportional hazards models
    Cox(#[clap(flatten)] CoxArg),
    /// Fit logistic regression models
    Logistic(#[clap(flatten)] LogisticArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::KaplanMeier(arg) => kaplan_meier::run(&arg)?,
        Mode::BlandAltman(arg) => bland_altman::run(&arg)?,
        Mode::ValueCounts(arg) => value_counts::run(&arg)?,
        Mode::Cox(arg) => cox::run(&arg)?,
        Mode::Logistic(arg) => logistic::run(&arg)?,
    }
    Ok(())
}
