//! Frequency tables of categorical columns.

use std::fmt;

use crate::{
    dataset::{Dataset, Value},
    error::AnalysisError,
};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValueCount {
    pub value: Value,
    pub count: usize,
    /// `count` over all rows of the dataset, missing ones included.
    pub proportion: f64,
}

/// Counts of each distinct non-missing value of one column.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValueCounts {
    pub column: String,
    pub total_rows: usize,
    /// Descending by count, ties in order of first appearance.
    pub counts: Vec<ValueCount>,
}

impl ValueCounts {
    /// # Examples
    ///
    /// ```
    /// use medstat_analysis::{
    ///     dataset::{Column, Dataset},
    ///     value_counts::ValueCounts,
    /// };
    ///
    /// let dataset =
    ///     Dataset::from_columns(vec![Column::new("sex", ["F", "M", "F", "F"])]).unwrap();
    /// let counts = ValueCounts::compute(&dataset, "sex").unwrap();
    /// assert_eq!(counts.counts[0].count, 3);
    /// assert!((counts.counts[0].proportion - 0.75).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn compute(dataset: &Dataset, column: &str) -> Result<Self, AnalysisError> {
        let values = &dataset.column(column)?.values;
        let mut counts = Vec::<(Value, usize)>::new();
        for value in values.iter().filter(|v| !v.is_missing()) {
            match counts.iter_mut().find(|(v, _)| v == value) {
                Some((_, count)) => *count += 1,
                None => counts.push((value.clone(), 1)),
            }
        }
        // stable sort keeps first-appearance order among ties
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let total_rows = dataset.len();
        let counts = counts
            .into_iter()
            .map(|(value, count)| ValueCount {
                value,
                count,
                proportion: count as f64 / total_rows as f64,
            })
            .collect();
        Ok(Self {
            column: column.to_string(),
            total_rows,
            counts,
        })
    }
}

impl fmt::Display for ValueCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .counts
            .iter()
            .map(|c| c.value.to_string().len())
            .chain([self.column.len()])
            .max()
            .unwrap_or(0);

        writeln!(f, "{:<width$}  count", self.column)?;
        for c in &self.counts {
            writeln!(f, "{:<width$}  {:>5}", c.value.to_string(), c.count)?;
        }
        writeln!(f)?;
        writeln!(f, "{:<width$}  proportion", self.column)?;
        for c in &self.counts {
            writeln!(f, "{:<width$}  {:>10.6}", c.value.to_string(), c.proportion)?;
        }
        Ok(())
    }
}

/// [`ValueCounts::compute`] for each column in turn.
pub fn value_counts_for(
    dataset: &Dataset,
    columns: &[&str],
) -> Result<Vec<ValueCounts>, AnalysisError> {
    columns
        .iter()
        .map(|column| ValueCounts::compute(dataset, column))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            Column::new("stage", [Some("II"), Some("I"), None, Some("I"), Some("II"), Some("III")]),
            Column::new("smoker", [1, 0, 0, 1, 0, 0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_counts_order_and_denominator() {
        let counts = ValueCounts::compute(&dataset(), "stage").unwrap();
        let order = counts
            .counts
            .iter()
            .map(|c| (c.value.to_string(), c.count))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                ("II".to_string(), 2),
                ("I".to_string(), 2),
                ("III".to_string(), 1)
            ]
        );
        assert_eq!(counts.total_rows, 6);
        assert!((counts.counts[2].proportion - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_display_has_both_tables() {
        let counts = ValueCounts::compute(&dataset(), "smoker").unwrap();
        let text = counts.to_string();
        assert!(text.contains("count"));
        assert!(text.contains("proportion"));
        assert!(text.contains("0.666667"));
    }

    #[test]
    fn test_multiple_columns() {
        let all = value_counts_for(&dataset(), &["stage", "smoker"]).unwrap();
        assert_eq!(all.len(), 2);
        assert!(value_counts_for(&dataset(), &["stage", "bmi"]).is_err());
    }
}
