// Ingestion of service payloads into datasets and charts

use nom::{
    branch::alt,
    bytes::complete::{escaped, is_not, tag},
    character::complete::{anychar, char},
    combinator::{map, opt, recognize, value},
    sequence::delimited,
    IResult,
};
use serde::Deserialize;
use serde_json::Value;

use crate::chart::Chart;
use crate::data::Dataset;
use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Verbatim(&'a str),
    NonFinite,
}

/// Replace bare `NaN` / `Infinity` tokens (either sign) with `null`.
///
/// The service serializes missing numeric cells with these non-JSON tokens.
/// String literals are copied through unchanged.
pub fn sanitize_payload(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while !rest.is_empty() {
        match token(rest) {
            Ok((next, Token::Verbatim(s))) => {
                output.push_str(s);
                rest = next;
            }
            Ok((next, Token::NonFinite)) => {
                output.push_str("null");
                rest = next;
            }
            Err(_) => {
                output.push_str(rest);
                break;
            }
        }
    }

    output
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        map(string_literal, Token::Verbatim),
        value(
            Token::NonFinite,
            alt((tag("-Infinity"), tag("-NaN"), tag("Infinity"), tag("NaN"))),
        ),
        map(is_not("\"-IN"), Token::Verbatim),
        map(recognize(anychar), Token::Verbatim),
    ))(input)
}

fn string_literal(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('"'),
        opt(escaped(is_not("\"\\"), '\\', anychar)),
        char('"'),
    ))(input)
}

/// Parse a dataset out of a service response.
///
/// Accepts `{columns, rows}` directly or nested under `data` / `data.grid`.
pub fn dataset_from_payload(text: &str) -> Result<Dataset, DataError> {
    let root: Value = serde_json::from_str(&sanitize_payload(text))?;
    let section = locate(&root, &[&[], &["data"], &["data", "grid"]], |v| {
        v.get("columns").is_some_and(Value::is_array)
    })
    .ok_or(DataError::MissingSection("dataset"))?;

    Ok(Dataset::deserialize(section)?)
}

/// Parse a chart out of a service response.
///
/// Accepts `{data: [...], layout}` directly or nested under `chart_data` /
/// `data.chart_data`.
pub fn chart_from_payload(text: &str) -> Result<Chart, DataError> {
    let root: Value = serde_json::from_str(&sanitize_payload(text))?;
    let section = locate(
        &root,
        &[&[], &["chart_data"], &["data", "chart_data"]],
        |v| v.get("data").is_some_and(Value::is_array),
    )
    .ok_or(DataError::MissingSection("chart"))?;

    Ok(Chart::deserialize(section)?)
}

fn locate<'a>(
    root: &'a Value,
    paths: &[&[&str]],
    accept: impl Fn(&Value) -> bool,
) -> Option<&'a Value> {
    paths.iter().find_map(|path| {
        let node = path.iter().try_fold(root, |node, key| node.get(*key))?;
        accept(node).then_some(node)
    })
}
