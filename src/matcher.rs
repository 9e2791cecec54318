use crate::data::{Dataset, Scalar};

/// Find the first column, in declared order, whose row values equal `values`.
///
/// Values are compared through their canonical string form, so a number that
/// came back from the service as text still matches. Ties are not reported:
/// the earliest declared column wins.
pub fn find_column<'a>(values: Option<&[Scalar]>, dataset: &'a Dataset) -> Option<&'a str> {
    let values = match values {
        Some(v) if !v.is_empty() => v,
        _ => return None,
    };

    if values.len() != dataset.row_count() {
        return None;
    }

    dataset
        .columns()
        .iter()
        .find(|col| {
            dataset
                .column(col)
                .is_some_and(|column| sequences_match(column, values.iter()))
        })
        .map(String::as_str)
}

/// Element-wise string-coerced equality over two sequences of equal length.
pub fn sequences_match<'a, 'b>(
    left: impl IntoIterator<Item = &'a Scalar>,
    right: impl IntoIterator<Item = &'b Scalar>,
) -> bool {
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(a), Some(b)) if a.canonical() == b.canonical() => continue,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Row;

    fn dataset(columns: &[&str], rows: Vec<Vec<Scalar>>) -> Dataset {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|values| {
                columns
                    .iter()
                    .cloned()
                    .zip(values)
                    .collect::<Row>()
            })
            .collect();
        Dataset::new(columns, rows).unwrap()
    }

    fn sales() -> Dataset {
        dataset(
            &["month", "sales", "units"],
            vec![
                vec!["Jan".into(), 10_i64.into(), 10_i64.into()],
                vec!["Feb".into(), 20_i64.into(), 20_i64.into()],
            ],
        )
    }

    #[test]
    fn test_finds_matching_column() {
        let data = sales();
        let x: Vec<Scalar> = vec!["Jan".into(), "Feb".into()];
        assert_eq!(find_column(Some(x.as_slice()), &data), Some("month"));
    }

    #[test]
    fn test_first_declared_column_wins() {
        let data = sales();
        let y: Vec<Scalar> = vec![10_i64.into(), 20_i64.into()];
        assert_eq!(find_column(Some(y.as_slice()), &data), Some("sales"));
    }

    #[test]
    fn test_tolerates_type_drift() {
        let data = sales();
        let y: Vec<Scalar> = vec!["10".into(), 20.0.into()];
        assert_eq!(find_column(Some(y.as_slice()), &data), Some("sales"));
    }

    #[test]
    fn test_exponent_strings_match_numbers() {
        let data = dataset(
            &["big", "small"],
            vec![vec![1e21.into(), 1e-7.into()]],
        );
        let big: Vec<Scalar> = vec!["1e+21".into()];
        let small: Vec<Scalar> = vec!["1e-7".into()];
        assert_eq!(find_column(Some(big.as_slice()), &data), Some("big"));
        assert_eq!(find_column(Some(small.as_slice()), &data), Some("small"));
    }

    #[test]
    fn test_null_matches_missing_cell() {
        let data = dataset(
            &["a"],
            vec![vec![1_i64.into()], vec![Scalar::Null]],
        );
        let values: Vec<Scalar> = vec![1_i64.into(), Scalar::Null];
        assert_eq!(find_column(Some(values.as_slice()), &data), Some("a"));
    }

    #[test]
    fn test_no_match() {
        let data = sales();
        let values: Vec<Scalar> = vec!["Jan".into(), "Mar".into()];
        assert_eq!(find_column(Some(values.as_slice()), &data), None);
    }

    #[test]
    fn test_length_mismatch() {
        let data = sales();
        let values: Vec<Scalar> = vec!["Jan".into()];
        assert_eq!(find_column(Some(values.as_slice()), &data), None);
    }

    #[test]
    fn test_empty_or_absent_values() {
        let data = sales();
        assert_eq!(find_column(Some(&[][..]), &data), None);
        assert_eq!(find_column(None, &data), None);
    }

    #[test]
    fn test_sequences_match_lengths() {
        let a: Vec<Scalar> = vec![1_i64.into()];
        let b: Vec<Scalar> = vec![1_i64.into(), 2_i64.into()];
        assert!(!sequences_match(&a, &b));
        assert!(sequences_match(&a, &a));
    }
}
