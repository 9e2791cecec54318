use crate::chart::{Binding, Series};
use crate::data::Dataset;
use crate::resolve::ColumnPair;

/// Recompute a series' data channels from the current dataset.
///
/// The rebuilt arrays always have one entry per dataset row, whatever the
/// original series length was. The pair is re-attached as binding metadata;
/// every other series attribute is carried over untouched.
pub fn rebuild(series: &Series, columns: &ColumnPair, dataset: &Dataset) -> Series {
    let x = dataset
        .rows()
        .iter()
        .map(|row| Dataset::cell(row, &columns.x).clone())
        .collect();
    let y = dataset
        .rows()
        .iter()
        .map(|row| Dataset::cell(row, &columns.y).clone())
        .collect();

    let mut rebuilt = series.clone();
    rebuilt.x = Some(x);
    rebuilt.y = Some(y);
    rebuilt.attach_binding(&Binding::from(columns));
    rebuilt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Row, Scalar};
    use serde_json::json;

    fn make_data() -> Dataset {
        let columns = vec!["region".to_string(), "q1".to_string()];
        let rows = [("North", 5_i64), ("South", 7_i64), ("East", 9_i64)]
            .into_iter()
            .map(|(r, q)| {
                let mut row = Row::new();
                row.insert("region".to_string(), r.into());
                row.insert("q1".to_string(), q.into());
                row
            })
            .collect();
        Dataset::new(columns, rows).unwrap()
    }

    fn pair() -> ColumnPair {
        ColumnPair {
            x: "region".to_string(),
            y: "q1".to_string(),
        }
    }

    #[test]
    fn test_rebuild_uses_dataset_row_count() {
        let series = Series::new(vec!["North".into()], vec![1_i64.into()]);
        let rebuilt = rebuild(&series, &pair(), &make_data());

        let x = rebuilt.x.unwrap();
        let y = rebuilt.y.unwrap();
        assert_eq!(x.len(), 3);
        assert_eq!(y, vec![Scalar::from(5_i64), 7_i64.into(), 9_i64.into()]);
    }

    #[test]
    fn test_rebuild_attaches_binding() {
        let series = Series::new(vec![], vec![]);
        let rebuilt = rebuild(&series, &pair(), &make_data());
        assert_eq!(rebuilt.binding(), Binding::new("region", "q1"));
    }

    #[test]
    fn test_rebuild_preserves_attributes() {
        let series: Series = serde_json::from_value(json!({
            "x": [],
            "y": [],
            "type": "bar",
            "marker": {"color": "#336699"},
            "customdata": {"source": "llm"}
        }))
        .unwrap();
        let rebuilt = rebuild(&series, &pair(), &make_data());
        assert_eq!(rebuilt.attributes, series.attributes);
        assert_eq!(
            rebuilt.customdata,
            Some(json!({"source": "llm", "xColumn": "region", "yColumn": "q1"}))
        );
    }

    #[test]
    fn test_rebuild_empty_dataset() {
        let data = Dataset::new(vec!["region".to_string(), "q1".to_string()], vec![]).unwrap();
        let series = Series::new(vec!["North".into()], vec![1_i64.into()]);
        let rebuilt = rebuild(&series, &pair(), &data);
        assert_eq!(rebuilt.x, Some(vec![]));
        assert_eq!(rebuilt.y, Some(vec![]));
    }
}
