//! Splitting a dataset into two comparison cohorts.
//!
//! Rows with a missing time, event or grouping value are dropped once before
//! splitting. The two cohorts then partition the remaining rows exactly.

use crate::{
    dataset::{Dataset, Value},
    error::AnalysisError,
    kaplan_meier::KaplanMeierParams,
};

/// How the grouping column is turned into two cohorts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupSplit {
    /// `value <= threshold` versus `value > threshold`.
    Threshold(f64),
    /// The two distinct values of an already binary column.
    Categorical,
}

impl From<Option<f64>> for GroupSplit {
    fn from(threshold: Option<f64>) -> Self {
        threshold.map_or(GroupSplit::Categorical, GroupSplit::Threshold)
    }
}

/// One side of the comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    pub label: String,
    /// Row indices into [`CohortPair::filtered`].
    pub rows: Vec<usize>,
    pub times: Vec<f64>,
    pub events: Vec<bool>,
}

impl Cohort {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CohortPair {
    /// Time, event and grouping columns with incomplete rows removed.
    pub filtered: Dataset,
    /// `<= threshold`, or the first value encountered.
    pub first: Cohort,
    /// `> threshold`, or the second value encountered.
    pub second: Cohort,
}

/// Drops incomplete rows and splits the rest into two non-empty cohorts.
///
/// # Examples
///
/// ```
/// use medstat_analysis::{
///     cohort::split_cohorts,
///     dataset::{Column, Dataset},
///     kaplan_meier::KaplanMeierParams,
/// };
///
/// let dataset = Dataset::from_columns(vec![
///     Column::new("time", [1.0, 2.0, 3.0, 4.0]),
///     Column::new("event", [1, 0, 1, 1]),
///     Column::new("age", [40.0, 70.0, 55.0, 62.0]),
/// ])
/// .unwrap();
/// let params = KaplanMeierParams::new("time", "event", "age").with_threshold(60.0);
/// let pair = split_cohorts(&dataset, &params).unwrap();
/// assert_eq!(pair.first.label, "age <= 60");
/// assert_eq!(pair.first.rows, vec![0, 2]);
/// assert_eq!(pair.second.rows, vec![1, 3]);
/// ```
pub fn split_cohorts(
    dataset: &Dataset,
    params: &KaplanMeierParams,
) -> Result<CohortPair, AnalysisError> {
    let filtered = dataset.select_complete(&[
        params.time_column.as_str(),
        params.event_column.as_str(),
        params.group_column.as_str(),
    ])?;
    let times = filtered.times(&params.time_column)?;
    let events = filtered.binary(&params.event_column)?;

    let column = &params.group_column;
    let (first, second) = match GroupSplit::from(params.threshold) {
        GroupSplit::Threshold(threshold) => {
            let values = filtered.numeric(column)?;
            let (low, high): (Vec<usize>, Vec<usize>) =
                (0..values.len()).partition(|&row| values[row] <= threshold);
            (
                (format!("{column} <= {threshold}"), low),
                (format!("{column} > {threshold}"), high),
            )
        }
        GroupSplit::Categorical => {
            let values = &filtered.column(column)?.values;
            let distinct = distinct_in_order(values);
            let [a, b] = distinct.as_slice() else {
                return Err(AnalysisError::InvalidGrouping {
                    column: column.clone(),
                    distinct_values: distinct.iter().map(ToString::to_string).collect(),
                });
            };
            let (rows_a, rows_b): (Vec<usize>, Vec<usize>) =
                (0..values.len()).partition(|&row| &&values[row] == a);
            ((a.to_string(), rows_a), (b.to_string(), rows_b))
        }
    };

    let make_cohort = |(label, rows): (String, Vec<usize>)| {
        if rows.is_empty() {
            return Err(AnalysisError::InsufficientData { cohort: label });
        }
        Ok(Cohort {
            times: rows.iter().map(|&row| times[row]).collect(),
            events: rows.iter().map(|&row| events[row]).collect(),
            label,
            rows,
        })
    };
    let first = make_cohort(first)?;
    let second = make_cohort(second)?;

    Ok(CohortPair {
        filtered,
        first,
        second,
    })
}

fn distinct_in_order(values: &[Value]) -> Vec<&Value> {
    let mut distinct = Vec::<&Value>::new();
    for value in values {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }
    distinct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    fn dataset(group: Vec<Value>) -> Dataset {
        let n = group.len();
        #[expect(clippy::cast_precision_loss)]
        let times = (1..=n).map(|t| t as f64).collect::<Vec<_>>();
        Dataset::from_columns(vec![
            Column::new("time", times),
            Column::new("event", vec![1; n]),
            Column { name: "group".to_string(), values: group },
        ])
        .unwrap()
    }

    #[test]
    fn test_threshold_boundary_goes_low() {
        let data = dataset(vec![4.0.into(), 5.0.into(), 6.0.into()]);
        let params = KaplanMeierParams::new("time", "event", "group").with_threshold(5.0);
        let pair = split_cohorts(&data, &params).unwrap();
        assert_eq!(pair.first.rows, vec![0, 1]);
        assert_eq!(pair.second.rows, vec![2]);
        assert_eq!(pair.first.label, "group <= 5");
        assert_eq!(pair.second.label, "group > 5");
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let group = [3.0, 8.0, 1.0, 9.0, 5.0, 5.5, 2.0, 7.0]
            .into_iter()
            .map(Value::from)
            .chain([Value::Missing])
            .collect::<Vec<_>>();
        let data = dataset(group);
        for threshold in [1.0, 4.0, 5.0, 8.5] {
            let params = KaplanMeierParams::new("time", "event", "group").with_threshold(threshold);
            let pair = split_cohorts(&data, &params).unwrap();
            assert_eq!(pair.filtered.len(), 8);
            let mut all = pair.first.rows.clone();
            all.extend(&pair.second.rows);
            all.sort_unstable();
            assert_eq!(all, (0..8).collect::<Vec<_>>());
            assert!(pair.first.rows.iter().all(|r| !pair.second.rows.contains(r)));
        }
    }

    #[test]
    fn test_categorical_labels_in_first_encountered_order() {
        let data = dataset(vec!["male".into(), "female".into(), "male".into(), Value::Missing]);
        let params = KaplanMeierParams::new("time", "event", "group");
        let pair = split_cohorts(&data, &params).unwrap();
        assert_eq!(pair.first.label, "male");
        assert_eq!(pair.first.rows, vec![0, 2]);
        assert_eq!(pair.second.label, "female");
        assert_eq!(pair.second.times, vec![2.0]);
    }

    #[test]
    fn test_categorical_requires_two_values() {
        let params = KaplanMeierParams::new("time", "event", "group");

        let one = dataset(vec!["a".into(), "a".into()]);
        assert!(matches!(
            split_cohorts(&one, &params),
            Err(AnalysisError::InvalidGrouping { ref distinct_values, .. }) if distinct_values.len() == 1
        ));

        let three = dataset(vec!["a".into(), "b".into(), "c".into()]);
        assert!(matches!(
            split_cohorts(&three, &params),
            Err(AnalysisError::InvalidGrouping { ref distinct_values, .. }) if distinct_values.len() == 3
        ));
    }

    #[test]
    fn test_empty_cohort_is_an_error() {
        let data = dataset(vec![1.0.into(), 2.0.into()]);
        let params = KaplanMeierParams::new("time", "event", "group").with_threshold(10.0);
        assert_eq!(
            split_cohorts(&data, &params).unwrap_err(),
            AnalysisError::InsufficientData {
                cohort: "group > 10".to_string()
            }
        );
    }

    #[test]
    fn test_missing_group_column() {
        let data = dataset(vec![1.0.into()]);
        let params = KaplanMeierParams::new("time", "event", "arm");
        assert!(matches!(
            split_cohorts(&data, &params),
            Err(AnalysisError::MissingColumn { ref column }) if column == "arm"
        ));
    }
}
