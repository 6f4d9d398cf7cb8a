use log::debug;

use std::collections::HashMap;
use std::fs;

use form_engine::{ReplayProvider, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::form::*;

/// The JSON run configuration. Every entry is optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormConfig {
    pub title: Option<String>,
    #[serde(rename = "schemaFile")]
    pub schema_file: Option<String>,
    #[serde(rename = "schemaType")]
    pub schema_type: Option<String>,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
    pub columns: Option<String>,
    #[serde(rename = "answersFile")]
    pub answers_file: Option<String>,
    #[serde(rename = "strictAnswers")]
    pub strict_answers: Option<bool>,
    pub totals: Option<Vec<String>>,
    #[serde(rename = "chartToggleLabel")]
    pub chart_toggle_label: Option<String>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
}

/// Recorded answers: checkbox labels and widget keys to values.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswersFile {
    #[serde(default)]
    pub checkboxes: HashMap<String, bool>,
    #[serde(default)]
    pub values: HashMap<String, JSValue>,
}

pub fn read_config(path: &str) -> AssessResult<FormConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: FormConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_answers(path: &str, strict: bool) -> AssessResult<ReplayProvider> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let answers: AnswersFile = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_answers: {:?}", answers);
    answers_to_provider(&answers, strict)
}

pub fn answers_to_provider(answers: &AnswersFile, strict: bool) -> AssessResult<ReplayProvider> {
    let mut provider = ReplayProvider::new(strict);
    for (label, checked) in answers.checkboxes.iter() {
        provider = provider.checkbox(label, *checked);
    }
    for (key, js) in answers.values.iter() {
        provider = provider.value(key, read_js_value(key, js)?);
    }
    Ok(provider)
}

// Numbers keep the type they were written with: `3` is an integer, `3.0` a float.
fn read_js_value(key: &str, js: &JSValue) -> AssessResult<Value> {
    match js {
        JSValue::Number(n) if n.is_i64() => Ok(Value::Int(n.as_i64().unwrap_or_default())),
        JSValue::Number(n) => match n.as_f64() {
            Some(f) => Ok(Value::Float(f)),
            None => whatever!("Answer for {:?} is out of range: {}", key, n),
        },
        JSValue::String(s) => Ok(Value::Text(s.clone())),
        x => whatever!(
            "Answer for {:?} must be a number or a string, found {}",
            key,
            x
        ),
    }
}

pub fn read_summary(path: &str) -> AssessResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// The last column of an Excel sheet, `XFD`.
pub const MAX_COLUMN_INDEX: usize = 16383;

/// Converts an Excel column name (`A`, `U`, `AB`) to a zero-based index.
///
/// Names past `XFD` are rejected.
pub fn parse_column_name(name: &str) -> Option<usize> {
    let name = name.trim();
    if name.is_empty() || name.len() > 3 || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut res: usize = 0;
    for c in name.to_ascii_uppercase().chars() {
        res = res * 26 + (c as usize - 'A' as usize + 1);
    }
    Some(res - 1).filter(|idx| *idx <= MAX_COLUMN_INDEX)
}

/// Parses a column range such as `E:U` into zero-based inclusive bounds.
pub fn parse_column_range(spec: &str) -> AssessResult<(usize, usize)> {
    let bounds = spec
        .split_once(':')
        .and_then(|(a, b)| Some((parse_column_name(a)?, parse_column_name(b)?)));
    match bounds {
        Some((first, last)) if first <= last => Ok((first, last)),
        _ => InvalidColumnRangeSnafu { spec }.fail(),
    }
}
