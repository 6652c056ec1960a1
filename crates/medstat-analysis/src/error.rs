use medstat_stats::{
    agreement::AgreementError, regression::RegressionError, survival::SurvivalDataError,
};

/// Failure of a dataset-level analysis.
///
/// Every precondition violation has its own variant so calling scripts can
/// react to it (for example skip a covariate that is not binary).
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    #[display("column '{column}' not found in dataset")]
    MissingColumn { column: String },
    #[display(
        "column '{column}' must have exactly two distinct values to split without a threshold, found {}: {distinct_values:?}",
        distinct_values.len()
    )]
    InvalidGrouping {
        column: String,
        distinct_values: Vec<String>,
    },
    #[display("cohort '{cohort}' has no observations")]
    InsufficientData { cohort: String },
    #[display("column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[display("column '{column}' appears more than once")]
    DuplicateColumn { column: String },
    #[display("column '{column}', row {row}: value is missing")]
    MissingValue { column: String, row: usize },
    #[display("column '{column}', row {row}: expected a number, got '{value}'")]
    NonNumericValue {
        column: String,
        row: usize,
        value: String,
    },
    #[display("column '{column}', row {row}: expected 0/1 or true/false, got '{value}'")]
    InvalidBinaryValue {
        column: String,
        row: usize,
        value: String,
    },
    #[display("column '{column}', row {row}: time must be non-negative, got {value}")]
    NegativeTime {
        column: String,
        row: usize,
        value: f64,
    },
    #[display("{source}")]
    Survival { source: SurvivalDataError },
    #[display("{source}")]
    Regression { source: RegressionError },
    #[display("{source}")]
    Agreement { source: AgreementError },
}

impl From<SurvivalDataError> for AnalysisError {
    fn from(source: SurvivalDataError) -> Self {
        Self::Survival { source }
    }
}

impl From<RegressionError> for AnalysisError {
    fn from(source: RegressionError) -> Self {
        Self::Regression { source }
    }
}

impl From<AgreementError> for AnalysisError {
    fn from(source: AgreementError) -> Self {
        Self::Agreement { source }
    }
}
