use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::DataError;

/// A single cell value as it travels through the remote service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Arrays and objects, e.g. a multicategory axis entry. Carried verbatim.
    Composite(Value),
}

static NULL: Scalar = Scalar::Null;

impl Scalar {
    /// Canonical textual form used for value-content comparison.
    ///
    /// Numbers print without a trailing `.0` when integral so that `10`, `10.0`
    /// and `"10"` all compare equal after a round trip through text.
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            Scalar::Null => Cow::Borrowed("null"),
            Scalar::Bool(true) => Cow::Borrowed("true"),
            Scalar::Bool(false) => Cow::Borrowed("false"),
            Scalar::Number(n) => Cow::Owned(canonical_number(n)),
            Scalar::String(s) => Cow::Borrowed(s.as_str()),
            Scalar::Composite(v) => Cow::Owned(composite_string(v)),
        }
    }

    /// Textual form written into a delimited-text field. Null becomes an empty field.
    pub fn field(&self) -> Cow<'_, str> {
        match self {
            Scalar::Null => Cow::Borrowed(""),
            other => other.canonical(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) => canonical_float(f),
        None => n.to_string(),
    }
}

/// Shortest round-trip form, switching to exponent notation outside
/// `1e-6 <= |f| < 1e21` with an explicit `+` on positive exponents.
fn canonical_float(f: f64) -> String {
    // covers negative zero
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return f.to_string();
    }
    let exp = format!("{:e}", f);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

/// Arrays join their elements with `,` (null elements empty); objects collapse
/// to a fixed placeholder.
fn composite_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => canonical_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(composite_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<f64> for Scalar {
    /// Non-finite floats have no JSON form and become null.
    fn from(f: f64) -> Self {
        Number::from_f64(f).map(Scalar::Number).unwrap_or(Scalar::Null)
    }
}

/// One row of a dataset, keyed by column name.
pub type Row = BTreeMap<String, Scalar>;

#[derive(Debug, Deserialize)]
struct RawDataset {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Row>,
}

/// The tabular data currently being edited: ordered columns plus ordered rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = DataError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Dataset::new(raw.columns, raw.rows)
    }
}

impl Dataset {
    /// Build a dataset, checking that column names are unique and that every
    /// row key names a column. Rows may omit keys; missing cells read as null.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self, DataError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.as_str()) {
                return Err(DataError::DuplicateColumn(col.clone()));
            }
        }

        for (idx, row) in rows.iter().enumerate() {
            if let Some(key) = row.keys().find(|k| !seen.contains(k.as_str())) {
                return Err(DataError::UnknownKey {
                    row: idx,
                    key: key.clone(),
                });
            }
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Value of `column` in `row`, null when the row omits it.
    pub fn cell<'a>(row: &'a Row, column: &str) -> &'a Scalar {
        row.get(column).unwrap_or(&NULL)
    }

    /// Iterate the values of one column in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Scalar> + '_> {
        if !self.has_column(name) {
            return None;
        }
        let name = name.to_string();
        Some(self.rows.iter().map(move |row| Dataset::cell(row, &name)))
    }

    /// Owned copy of one column's values in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<Scalar>> {
        self.column(name).map(|values| values.cloned().collect())
    }

    /// Keep only rows where some value contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Dataset {
        if term.is_empty() {
            return self.clone();
        }
        let needle = term.to_lowercase();
        let rows = self
            .rows
            .iter()
            .filter(|row| {
                self.columns.iter().any(|col| {
                    Dataset::cell(row, col)
                        .canonical()
                        .to_lowercase()
                        .contains(&needle)
                })
            })
            .cloned()
            .collect();

        Dataset {
            columns: self.columns.clone(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Scalar)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn sales() -> Dataset {
        Dataset::new(
            vec!["month".to_string(), "sales".to_string()],
            vec![
                row(&[("month", "Jan".into()), ("sales", 10_i64.into())]),
                row(&[("month", "Feb".into()), ("sales", 20_i64.into())]),
                row(&[("month", "Mar".into())]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_canonical_numbers() {
        assert_eq!(Scalar::from(10_i64).canonical(), "10");
        assert_eq!(Scalar::from(10.0).canonical(), "10");
        assert_eq!(Scalar::from(2.5).canonical(), "2.5");
        assert_eq!(Scalar::from(-0.0).canonical(), "0");
        assert_eq!(Scalar::from(f64::NAN), Scalar::Null);
    }

    #[test]
    fn test_canonical_exponent_form() {
        assert_eq!(Scalar::from(1e21).canonical(), "1e+21");
        assert_eq!(Scalar::from(1.5e300).canonical(), "1.5e+300");
        assert_eq!(Scalar::from(1e-7).canonical(), "1e-7");
        assert_eq!(Scalar::from(-2.5e-8).canonical(), "-2.5e-8");
        assert_eq!(Scalar::from(1e20).canonical(), "100000000000000000000");
        assert_eq!(Scalar::from(0.000001).canonical(), "0.000001");
    }

    #[test]
    fn test_composite_values() {
        let multi: Scalar = serde_json::from_str(r#"["A", 1, null, ["b", true]]"#).unwrap();
        assert!(matches!(multi, Scalar::Composite(_)));
        assert_eq!(multi.canonical(), "A,1,,b,true");

        let point: Scalar = serde_json::from_str(r#"{"v": 1}"#).unwrap();
        assert_eq!(point.canonical(), "[object Object]");
        assert_eq!(serde_json::to_string(&point).unwrap(), r#"{"v":1}"#);
    }

    #[test]
    fn test_canonical_other_types() {
        assert_eq!(Scalar::Null.canonical(), "null");
        assert_eq!(Scalar::Null.field(), "");
        assert_eq!(Scalar::from(true).canonical(), "true");
        assert_eq!(Scalar::from("x").field(), "x");
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let res = Dataset::new(vec!["a".to_string(), "a".to_string()], vec![]);
        assert!(matches!(res, Err(DataError::DuplicateColumn(c)) if c == "a"));
    }

    #[test]
    fn test_unknown_row_key_rejected() {
        let res = Dataset::new(
            vec!["a".to_string()],
            vec![row(&[("a", 1_i64.into())]), row(&[("b", 2_i64.into())])],
        );
        assert!(matches!(res, Err(DataError::UnknownKey { row: 1, .. })));
    }

    #[test]
    fn test_missing_cell_reads_null() {
        let data = sales();
        let values = data.column_values("sales").unwrap();
        assert_eq!(values, vec![Scalar::from(10_i64), Scalar::from(20_i64), Scalar::Null]);
        assert!(data.column_values("profit").is_none());
    }

    #[test]
    fn test_search_case_insensitive() {
        let data = sales();
        let found = data.search("jA");
        assert_eq!(found.row_count(), 1);
        assert_eq!(found.columns(), data.columns());

        assert_eq!(data.search("").row_count(), 3);
        assert_eq!(data.search("2").row_count(), 1);
        assert_eq!(data.search("zzz").row_count(), 0);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Dataset =
            serde_json::from_str(r#"{"columns":["a"],"rows":[{"a":1},{"a":null}]}"#).unwrap();
        assert_eq!(ok.row_count(), 2);

        let bad = serde_json::from_str::<Dataset>(r#"{"columns":["a","a"],"rows":[]}"#);
        assert!(bad.is_err());
    }
}
