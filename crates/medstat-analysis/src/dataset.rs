//! In-memory tabular data
//!
//! A [`Dataset`] is an ordered collection of rows sharing a schema of named
//! [`Column`]s. Cells are dynamically typed [`Value`]s so the same table can
//! hold numeric covariates, 0/1 indicators and categorical labels.
//!
//! # Serialization
//!
//! Datasets deserialize from JSON in either of two layouts:
//!
//! ```json
//! [{"time": 5, "event": 1, "arm": "A"}, {"time": 8, "event": 0, "arm": "B"}]
//! ```
//!
//! ```json
//! {"time": [5, 8], "event": [1, 0], "arm": ["A", "B"]}
//! ```
//!
//! `null` is a missing value. In the records layout a key absent from a row
//! is missing as well.

use std::{fmt, marker::PhantomData};

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use crate::error::AnalysisError;

/// A single cell.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// `true` for [`Value::Missing`] and for `NaN` numbers.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(v) => v.is_nan(),
            Value::Bool(_) | Value::Text(_) => false,
        }
    }

    /// Numeric view of the cell: numbers as-is, booleans as 0/1.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) if !v.is_nan() => Some(*v),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Binary view of the cell: 0/1, `true`/`false` and their string forms.
    #[must_use]
    pub fn as_binary(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Number(v) if *v == 0.0 => Some(false),
            Value::Number(v) if *v == 1.0 => Some(true),
            Value::Text(s) => match s.trim() {
                "0" | "false" | "False" | "FALSE" => Some(false),
                "1" | "true" | "True" | "TRUE" => Some(true),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "NaN"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new<S, I, V>(name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Rows × named columns.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(try_from = "DatasetRepr")]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum DatasetRepr {
    Records(Vec<OrderedObject<Value>>),
    Columns(OrderedObject<Vec<Value>>),
}

/// JSON object entries in document order.
#[derive(Debug)]
struct OrderedObject<V>(Vec<(String, V)>);

impl<V> OrderedObject<V> {
    /// Value of the last entry named `key`, like a map built from the object.
    fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl<'de, V> Deserialize<'de> for OrderedObject<V>
where
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V> Visitor<'de> for EntriesVisitor<V>
        where
            V: Deserialize<'de>,
        {
            type Value = OrderedObject<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(OrderedObject(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl TryFrom<DatasetRepr> for Dataset {
    type Error = AnalysisError;

    fn try_from(repr: DatasetRepr) -> Result<Self, Self::Error> {
        match repr {
            DatasetRepr::Columns(object) => Self::from_columns(
                object
                    .0
                    .into_iter()
                    .map(|(name, values)| Column { name, values })
                    .collect(),
            ),
            DatasetRepr::Records(records) => {
                let mut names = Vec::<String>::new();
                for record in &records {
                    for (key, _) in &record.0 {
                        if !names.contains(key) {
                            names.push(key.clone());
                        }
                    }
                }
                let columns = names
                    .into_iter()
                    .map(|name| {
                        let values = records
                            .iter()
                            .map(|r| r.get(&name).cloned().unwrap_or(Value::Missing))
                            .collect();
                        Column { name, values }
                    })
                    .collect();
                Self::from_columns(columns)
            }
        }
    }
}

impl Dataset {
    /// Builds a dataset from columns of equal length with unique names.
    ///
    /// # Examples
    ///
    /// ```
    /// use medstat_analysis::dataset::{Column, Dataset};
    ///
    /// let dataset = Dataset::from_columns(vec![
    ///     Column::new("time", [3.0, 5.0]),
    ///     Column::new("arm", ["A", "B"]),
    /// ])
    /// .unwrap();
    /// assert_eq!(dataset.len(), 2);
    /// ```
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, AnalysisError> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        for (i, column) in columns.iter().enumerate() {
            if column.values.len() != n_rows {
                return Err(AnalysisError::ColumnLengthMismatch {
                    column: column.name.clone(),
                    expected: n_rows,
                    actual: column.values.len(),
                });
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(AnalysisError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
        }
        Ok(Self { columns, n_rows })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n_rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Result<&Column, AnalysisError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| AnalysisError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Projects onto `names` and drops every row with a missing value in them.
    ///
    /// Repeated names are kept once.
    pub fn select_complete(&self, names: &[&str]) -> Result<Self, AnalysisError> {
        let mut selected = Vec::<&Column>::new();
        for name in names {
            let column = self.column(name)?;
            if !selected.iter().any(|c| c.name == column.name) {
                selected.push(column);
            }
        }

        let keep = (0..self.n_rows)
            .filter(|&row| selected.iter().all(|c| !c.values[row].is_missing()))
            .collect::<Vec<_>>();
        let columns = selected
            .into_iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: keep.iter().map(|&row| c.values[row].clone()).collect(),
            })
            .collect();
        Ok(Self {
            columns,
            n_rows: keep.len(),
        })
    }

    /// Column as numbers (booleans count as 0/1).
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>, AnalysisError> {
        let column = self.column(name)?;
        column
            .values
            .iter()
            .enumerate()
            .map(|(row, value)| {
                if value.is_missing() {
                    return Err(AnalysisError::MissingValue {
                        column: name.to_string(),
                        row,
                    });
                }
                value.as_f64().ok_or_else(|| AnalysisError::NonNumericValue {
                    column: name.to_string(),
                    row,
                    value: value.to_string(),
                })
            })
            .collect()
    }

    /// Column as non-negative times.
    pub fn times(&self, name: &str) -> Result<Vec<f64>, AnalysisError> {
        let times = self.numeric(name)?;
        if let Some((row, &value)) = times.iter().enumerate().find(|(_, t)| **t < 0.0) {
            return Err(AnalysisError::NegativeTime {
                column: name.to_string(),
                row,
                value,
            });
        }
        Ok(times)
    }

    /// Column as a binary indicator (event observed, outcome present).
    pub fn binary(&self, name: &str) -> Result<Vec<bool>, AnalysisError> {
        let column = self.column(name)?;
        column
            .values
            .iter()
            .enumerate()
            .map(|(row, value)| {
                if value.is_missing() {
                    return Err(AnalysisError::MissingValue {
                        column: name.to_string(),
                        row,
                    });
                }
                value
                    .as_binary()
                    .ok_or_else(|| AnalysisError::InvalidBinaryValue {
                        column: name.to_string(),
                        row,
                        value: value.to_string(),
                    })
            })
            .collect()
    }

    /// Row-wise numeric matrix of `names`.
    pub fn numeric_rows(&self, names: &[&str]) -> Result<Vec<Vec<f64>>, AnalysisError> {
        let columns = names
            .iter()
            .map(|name| self.numeric(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((0..self.n_rows)
            .map(|row| columns.iter().map(|c| c[row]).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_columns(vec![
            Column::new("time", [Some(1.0), Some(2.0), None, Some(4.0)]),
            Column::new("event", [1, 0, 1, 1]),
            Column::new("arm", ["A", "B", "A", "B"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_select_complete_drops_missing_rows() {
        let filtered = sample().select_complete(&["time", "event"]).unwrap();
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered.column_names().collect::<Vec<_>>(), vec!["time", "event"]);
        assert_eq!(filtered.numeric("time").unwrap(), vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_select_complete_deduplicates_names() {
        let filtered = sample().select_complete(&["arm", "arm"]).unwrap();
        assert_eq!(filtered.columns().len(), 1);
        assert_eq!(filtered.len(), 4);
    }

    #[test]
    fn test_missing_column() {
        assert_eq!(
            sample().column("age").unwrap_err(),
            AnalysisError::MissingColumn {
                column: "age".to_string()
            }
        );
        assert!(matches!(
            sample().select_complete(&["time", "age"]),
            Err(AnalysisError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_typed_accessors() {
        let dataset = sample();
        assert_eq!(
            dataset.binary("event").unwrap(),
            vec![true, false, true, true]
        );
        assert!(matches!(
            dataset.numeric("time"),
            Err(AnalysisError::MissingValue { row: 2, .. })
        ));
        assert!(matches!(
            dataset.numeric("arm"),
            Err(AnalysisError::NonNumericValue { row: 0, .. })
        ));
        assert!(matches!(
            dataset.binary("arm"),
            Err(AnalysisError::InvalidBinaryValue { .. })
        ));
    }

    #[test]
    fn test_negative_time_is_rejected() {
        let dataset = Dataset::from_columns(vec![Column::new("t", [1.0, -3.0])]).unwrap();
        assert!(matches!(
            dataset.times("t"),
            Err(AnalysisError::NegativeTime { row: 1, .. })
        ));
    }

    #[test]
    fn test_column_length_mismatch() {
        let result = Dataset::from_columns(vec![
            Column::new("a", [1.0, 2.0]),
            Column::new("b", [1.0]),
        ]);
        assert!(matches!(
            result,
            Err(AnalysisError::ColumnLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_deserialize_records_and_columns() {
        let records: Dataset = serde_json::from_str(
            r#"[{"time": 1, "event": 1, "arm": "A"}, {"time": 2, "arm": null}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records.column("event").unwrap().values[1], Value::Missing);
        assert_eq!(records.column("arm").unwrap().values[1], Value::Missing);

        let columns: Dataset =
            serde_json::from_str(r#"{"time": [1, 2.5], "ok": [true, false]}"#).unwrap();
        assert_eq!(columns.numeric("time").unwrap(), vec![1.0, 2.5]);
        assert_eq!(columns.binary("ok").unwrap(), vec![true, false]);

        let ragged = serde_json::from_str::<Dataset>(r#"{"a": [1, 2], "b": [1]}"#);
        assert!(ragged.is_err());
    }

    #[test]
    fn test_deserialize_keeps_column_order() {
        let columns: Dataset =
            serde_json::from_str(r#"{"time": [1], "event": [0], "arm": ["B"]}"#).unwrap();
        assert_eq!(
            columns.column_names().collect::<Vec<_>>(),
            vec!["time", "event", "arm"]
        );

        let records: Dataset = serde_json::from_str(
            r#"[{"time": 1, "event": 0}, {"time": 2, "age": 60, "event": 1}]"#,
        )
        .unwrap();
        assert_eq!(
            records.column_names().collect::<Vec<_>>(),
            vec!["time", "event", "age"]
        );
        assert_eq!(records.column("age").unwrap().values[0], Value::Missing);

        let duplicated =
            serde_json::from_str::<Dataset>(r#"{"a": [1], "a": [2]}"#).unwrap_err();
        assert!(duplicated.to_string().contains("appears more than once"));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from(1.0).to_string(), "1");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from("male").to_string(), "male");
    }
}
