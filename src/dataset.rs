use crate::error::{BayesError, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashSet},
    fmt, io,
    path::Path,
};

/// A single categorical cell. Two values are the same category when their string forms match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Parses a raw text field (CSV cell, JSON string, CLI argument). Finite numbers become `Number`, everything else stays text.
    pub fn parse(field: &str) -> Self {
        let field = field.trim();
        match field.parse::<f64>() {
            Ok(number) if number.is_finite() => Value::Number(number),
            _ => Value::Text(field.to_string()),
        }
    }

    fn from_json(column: &str, value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).ok_or_else(|| {
                BayesError::InvalidInput(format!("column '{column}' holds an unrepresentable number"))
            }),
            // Same typing as a CSV field, so "3.0" and 3 are one category:
            serde_json::Value::String(s) => Ok(Value::parse(&s)),
            other => Err(BayesError::InvalidInput(format!(
                "column '{column}' holds a non-categorical value: {other}"
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// An unlabeled record, column name to value.
pub type Record = BTreeMap<String, Value>;

/// One column of a dataset with its values aligned to the dataset's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Column<'a> {
    pub name: &'a str,
    pub values: Vec<&'a Value>,
}

/// The values a UI may offer for one feature, in the order they first appear.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSchema {
    pub name: String,
    pub values: Vec<Value>,
}

/// Tabular, categorical data. The last column is the label.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(BayesError::InvalidInput(format!(
                    "duplicate column '{column}'"
                )));
            }
        }

        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(BayesError::InvalidInput(format!(
                "row {} has {} values, expected {}",
                i + 1,
                row.len(),
                columns.len()
            )));
        }

        Ok(Dataset { columns, rows })
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Self::csv_builder().from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_csv_reader<R: io::Read>(rdr: R) -> Result<Self> {
        Self::from_csv(Self::csv_builder().from_reader(rdr))
    }

    // Ragged rows are let through so `new` reports them as invalid input.
    fn csv_builder() -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.flexible(true);
        builder
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let columns = reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Value::parse).collect());
        }

        Self::new(columns, rows)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Builds a dataset from a JSON array of objects. The first object's key order fixes the
    /// column order; every other object must carry the same keys.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let objects: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(text)?;

        let columns: Vec<String> = match objects.first() {
            Some(first) => first.keys().cloned().collect(),
            None => return Self::new(Vec::new(), Vec::new()),
        };

        let mut rows = Vec::with_capacity(objects.len());
        for (i, mut object) in objects.into_iter().enumerate() {
            if object.len() != columns.len() {
                return Err(BayesError::InvalidInput(format!(
                    "record {} has {} columns, expected {}",
                    i + 1,
                    object.len(),
                    columns.len()
                )));
            }

            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                let value = object.remove(column).ok_or_else(|| {
                    BayesError::InvalidInput(format!("record {} is missing column '{column}'", i + 1))
                })?;
                row.push(Value::from_json(column, value)?);
            }
            rows.push(row);
        }

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn require_label(&self) -> Result<usize> {
        if self.columns.len() < 2 {
            return Err(BayesError::InvalidInput(format!(
                "need at least one feature column and a label column, got {} column(s)",
                self.columns.len()
            )));
        }
        Ok(self.columns.len() - 1)
    }

    /// Every column but the last, in their original order.
    pub fn features(&self) -> Result<Vec<Column<'_>>> {
        let label = self.require_label()?;
        Ok((0..label).map(|i| self.column(i)).collect())
    }

    /// The last column: one label per row.
    pub fn target(&self) -> Result<Column<'_>> {
        let label = self.require_label()?;
        Ok(self.column(label))
    }

    fn column(&self, i: usize) -> Column<'_> {
        Column {
            name: &self.columns[i],
            values: self.rows.iter().map(|row| &row[i]).collect(),
        }
    }

    /// Each row as a feature record paired with its true label.
    pub fn labeled_records(&self) -> Result<Vec<(Record, &Value)>> {
        let label = self.require_label()?;
        Ok(self
            .rows
            .iter()
            .map(|row| {
                let record = self.columns[..label]
                    .iter()
                    .cloned()
                    .zip(row[..label].iter().cloned())
                    .collect();
                (record, &row[label])
            })
            .collect())
    }

    /// Every row as a record over all columns. Used for unlabeled prediction input.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }

    pub fn schema(&self) -> Result<Vec<FeatureSchema>> {
        Ok(self
            .features()?
            .into_iter()
            .map(|column| {
                let mut seen = HashSet::new();
                let values = column
                    .values
                    .into_iter()
                    .filter(|value| seen.insert(value.to_string()))
                    .cloned()
                    .collect();
                FeatureSchema {
                    name: column.name.to_string(),
                    values,
                }
            })
            .collect())
    }

    /// Shuffles the rows with a seeded RNG and splits them into (train, test).
    /// The training part gets `floor(len * (1 - test_ratio))` rows.
    pub fn split(&self, test_ratio: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        if !(0.0..1.0).contains(&test_ratio) {
            return Err(BayesError::InvalidInput(format!(
                "test ratio must be in [0, 1), got {test_ratio}"
            )));
        }

        let mut rows = self.rows.clone();
        let mut rng = StdRng::seed_from_u64(seed);
        rows.shuffle(&mut rng);

        let split_index = (rows.len() as f64 * (1.0 - test_ratio)).floor() as usize;
        let test = rows.split_off(split_index);

        Ok((
            Dataset {
                columns: self.columns.clone(),
                rows,
            },
            Dataset {
                columns: self.columns.clone(),
                rows: test,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> Dataset {
        Dataset::from_csv_reader(
            "weather,wind,play\nsunny,weak,yes\nrainy,strong,no\nsunny,strong,yes\n".as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn splits_features_from_target() {
        let data = weather();

        let features = data.features().unwrap();
        let names: Vec<_> = features.iter().map(|c| c.name).collect();
        assert_eq!(names, ["weather", "wind"]);
        assert_eq!(features[1].values[1], &Value::from("strong"));

        let target = data.target().unwrap();
        assert_eq!(target.name, "play");
        assert_eq!(
            target.values,
            [&Value::from("yes"), &Value::from("no"), &Value::from("yes")]
        );
    }

    #[test]
    fn single_column_has_no_label() {
        let data = Dataset::new(vec!["only".into()], vec![vec!["a".into()]]).unwrap();
        assert!(matches!(data.features(), Err(BayesError::InvalidInput(_))));
        assert!(matches!(data.target(), Err(BayesError::InvalidInput(_))));
    }

    #[test]
    fn rejects_ragged_rows_and_duplicate_columns() {
        let ragged = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec!["x".into(), "y".into()], vec!["x".into()]],
        );
        assert!(matches!(ragged, Err(BayesError::InvalidInput(_))));

        let duplicate = Dataset::new(vec!["a".into(), "a".into()], Vec::new());
        assert!(matches!(duplicate, Err(BayesError::InvalidInput(_))));
    }

    #[test]
    fn ragged_csv_is_invalid_input() {
        let ragged = Dataset::from_csv_reader("a,b\nx,y\nx\n".as_bytes());
        assert!(matches!(ragged, Err(BayesError::InvalidInput(msg)) if msg.contains("row 2")));

        let wide = Dataset::from_csv_reader("a,b\nx,y,z\n".as_bytes());
        assert!(matches!(wide, Err(BayesError::InvalidInput(_))));
    }

    #[test]
    fn numeric_json_strings_match_typed_input() {
        let data = Dataset::from_json_str(
            r#"[{"size": "3.0", "label": "a"}, {"size": 3, "label": "b"}]"#,
        )
        .unwrap();
        assert_eq!(data.rows()[0][0], Value::Number(3.0));
        assert_eq!(data.rows()[0][0].to_string(), Value::parse("3.0").to_string());
        assert_eq!(data.schema().unwrap()[0].values, [Value::Number(3.0)]);
    }

    #[test]
    fn csv_fields_are_trimmed_and_typed() {
        let data = Dataset::from_csv_reader("size, label\n 3 ,a\nbig,b\n".as_bytes()).unwrap();
        assert_eq!(data.columns(), ["size", "label"]);
        assert_eq!(data.rows()[0][0], Value::Number(3.0));
        assert_eq!(data.rows()[1][0], Value::from("big"));
        assert_eq!(data.rows()[0][0].to_string(), "3");
    }

    #[test]
    fn json_keeps_first_object_column_order() {
        let data = Dataset::from_json_str(
            r#"[{"outlook": "sunny", "windy": false, "play": "yes"},
                {"play": "no", "windy": true, "outlook": "rainy"}]"#,
        )
        .unwrap();

        assert_eq!(data.columns(), ["outlook", "windy", "play"]);
        assert_eq!(
            data.rows()[1],
            [Value::from("rainy"), Value::Bool(true), Value::from("no")]
        );
    }

    #[test]
    fn json_rejects_mismatched_records() {
        let missing = Dataset::from_json_str(r#"[{"a": "x", "b": "y"}, {"a": "x", "c": "y"}]"#);
        assert!(matches!(missing, Err(BayesError::InvalidInput(_))));

        let null = Dataset::from_json_str(r#"[{"a": null, "b": "y"}]"#);
        assert!(matches!(null, Err(BayesError::InvalidInput(_))));
    }

    #[test]
    fn empty_json_array_is_an_empty_dataset() {
        let data = Dataset::from_json_str("[]").unwrap();
        assert!(data.is_empty());
        assert!(data.columns().is_empty());
    }

    #[test]
    fn schema_lists_distinct_values_in_first_seen_order() {
        let schema = weather().schema().unwrap();
        assert_eq!(
            schema,
            [
                FeatureSchema {
                    name: "weather".into(),
                    values: vec!["sunny".into(), "rainy".into()],
                },
                FeatureSchema {
                    name: "wind".into(),
                    values: vec!["weak".into(), "strong".into()],
                },
            ]
        );
    }

    #[test]
    fn labeled_records_strip_the_label() {
        let data = weather();
        let records = data.labeled_records().unwrap();
        assert_eq!(records.len(), 3);

        let (record, label) = &records[1];
        assert_eq!(record.len(), 2);
        assert_eq!(record["weather"], Value::from("rainy"));
        assert!(!record.contains_key("play"));
        assert_eq!(*label, &Value::from("no"));
    }

    #[test]
    fn split_is_seeded_and_sized() {
        let rows = (0..8)
            .map(|i| vec![Value::Number(i as f64), Value::from("c")])
            .collect();
        let data = Dataset::new(vec!["id".into(), "class".into()], rows).unwrap();

        let (train, test) = data.split(0.25, 420).unwrap();
        assert_eq!(train.len(), 6);
        assert_eq!(test.len(), 2);
        assert_eq!(train.columns(), data.columns());

        let (again, _) = data.split(0.25, 420).unwrap();
        assert_eq!(train, again);

        let (all, none) = data.split(0.0, 1).unwrap();
        assert_eq!(all.len(), 8);
        assert!(none.is_empty());

        assert!(matches!(data.split(1.0, 1), Err(BayesError::InvalidInput(_))));
    }
}
