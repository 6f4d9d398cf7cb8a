// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// A raw cell of the parameter sheet, before any coercion is applied.
///
/// The loaders map spreadsheet or CSV content to this type. The engine
/// decides later, per field, how each cell should be interpreted.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// True for missing cells and for cells that only contain whitespace.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The textual form used for identifiers and labels.
    ///
    /// Whole floats lose their decimal part, so that a group id read as `3.0`
    /// from a spreadsheet matches the id `3` read from a CSV file.
    pub fn as_ident(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(s.trim().to_string()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                Some(format!("{}", *f as i64))
            }
            CellValue::Float(f) => Some(f.to_string()),
            CellValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }

    /// Reads a boolean flag. Empty cells are false.
    pub fn as_flag(&self, field: &str, column: &str) -> Result<bool, FormErrors> {
        let invalid = || FormErrors::InvalidFlag {
            field: field.to_string(),
            column: column.to_string(),
            content: format!("{:?}", self),
        };
        match self {
            CellValue::Empty => Ok(false),
            CellValue::Bool(b) => Ok(*b),
            CellValue::Int(0) => Ok(false),
            CellValue::Int(1) => Ok(true),
            CellValue::Float(f) if *f == 0.0 => Ok(false),
            CellValue::Float(f) if *f == 1.0 => Ok(true),
            CellValue::Text(s) => match s.trim().to_lowercase().as_str() {
                "" | "false" | "no" | "n" | "0" => Ok(false),
                "true" | "yes" | "y" | "1" => Ok(true),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        }
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i as i64)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// The input controls a field can be rendered with.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum WidgetKind {
    Slider,
    NumberInput,
    Radio,
}

impl WidgetKind {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::Slider => "slider",
            WidgetKind::NumberInput => "number_input",
            WidgetKind::Radio => "radio",
        }
    }
}

impl FromStr for WidgetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "slider" => Ok(WidgetKind::Slider),
            "number_input" => Ok(WidgetKind::NumberInput),
            "radio" => Ok(WidgetKind::Radio),
            x => Err(x.to_string()),
        }
    }
}

/// The type the bounds, default and step of a field are converted to.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Coercion {
    Int,
    Float,
    Text,
}

/// A printf-style format string attached to a field (`%d`, `%.1f`, ...).
///
/// Unrecognized formats are accepted and coerce to floating point.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct FormatSpec(String);

impl FormatSpec {
    pub fn new(spec: &str) -> FormatSpec {
        FormatSpec(spec.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn coercion(&self) -> Coercion {
        match self.0.as_str() {
            "%d" => Coercion::Int,
            "%.1f" | "%.2f" => Coercion::Float,
            "%s" => Coercion::Text,
            _ => Coercion::Float,
        }
    }

    /// Renders a value the way the widget would display it.
    pub fn format_value(&self, value: &Value) -> String {
        match (self.0.as_str(), value) {
            (_, Value::Text(s)) => s.clone(),
            ("%d", Value::Int(i)) => i.to_string(),
            ("%d", Value::Float(f)) => format!("{}", f.trunc() as i64),
            ("%.1f", v) => format!("{:.1}", v.as_f64().unwrap_or_default()),
            ("%.2f", v) => format!("{:.2}", v.as_f64().unwrap_or_default()),
            (_, v) => v.to_string(),
        }
    }
}

impl Default for FormatSpec {
    fn default() -> Self {
        FormatSpec::new("%d")
    }
}

/// A value after coercion, or as returned by a widget provider.
#[derive(PartialEq, Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// The value of every inactive field.
    pub const ZERO: Value = Value::Int(0);

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Text(_))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps the trailing `.0` on whole floats.
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// One row of the parameter sheet.
#[derive(PartialEq, Debug, Clone)]
pub struct FieldSpec {
    pub id: String,
    /// Fields sharing a group id are switched off together by the checkbox of
    /// the first member. `None` never matches another group, not even `None`.
    pub group_id: Option<String>,
    pub has_checkbox: bool,
    pub checkbox_label: String,
    pub checkbox_default: bool,
    pub has_header: bool,
    pub header_label: String,
    pub widget_kind: WidgetKind,
    pub format_spec: FormatSpec,
    pub min: CellValue,
    pub max: CellValue,
    pub default: CellValue,
    pub step: CellValue,
    pub label: String,
    pub widget_key: String,
    pub attr: String,
    pub entity: String,
}

impl FieldSpec {
    /// A field without checkbox nor header, with an integer range of 0 to 10.
    ///
    /// The label and the widget key both default to the id.
    pub fn new(id: &str, group_id: Option<&str>, widget_kind: WidgetKind) -> FieldSpec {
        FieldSpec {
            id: id.to_string(),
            group_id: group_id.map(|s| s.to_string()),
            has_checkbox: false,
            checkbox_label: String::new(),
            checkbox_default: false,
            has_header: false,
            header_label: String::new(),
            widget_kind,
            format_spec: FormatSpec::default(),
            min: CellValue::Int(0),
            max: CellValue::Int(10),
            default: CellValue::Int(0),
            step: CellValue::Int(1),
            label: id.to_string(),
            widget_key: id.to_string(),
            attr: String::new(),
            entity: String::new(),
        }
    }

    pub fn with_checkbox(self, label: &str, default: bool) -> FieldSpec {
        FieldSpec {
            has_checkbox: true,
            checkbox_label: label.to_string(),
            checkbox_default: default,
            ..self
        }
    }

    pub fn with_header(self, label: &str) -> FieldSpec {
        FieldSpec {
            has_header: true,
            header_label: label.to_string(),
            ..self
        }
    }

    pub fn with_format(self, spec: &str) -> FieldSpec {
        FieldSpec {
            format_spec: FormatSpec::new(spec),
            ..self
        }
    }

    pub fn with_range(
        self,
        min: impl Into<CellValue>,
        max: impl Into<CellValue>,
        default: impl Into<CellValue>,
        step: impl Into<CellValue>,
    ) -> FieldSpec {
        FieldSpec {
            min: min.into(),
            max: max.into(),
            default: default.into(),
            step: step.into(),
            ..self
        }
    }

    pub fn with_label(self, label: &str) -> FieldSpec {
        FieldSpec {
            label: label.to_string(),
            ..self
        }
    }

    pub fn with_key(self, key: &str) -> FieldSpec {
        FieldSpec {
            widget_key: key.to_string(),
            ..self
        }
    }

    pub fn with_attr(self, attr: &str) -> FieldSpec {
        FieldSpec {
            attr: attr.to_string(),
            ..self
        }
    }

    pub fn with_entity(self, entity: &str) -> FieldSpec {
        FieldSpec {
            entity: entity.to_string(),
            ..self
        }
    }

    /// Whether this field continues the group of the previous row.
    pub fn same_group(&self, prev_group_id: &Option<String>) -> bool {
        matches!((&self.group_id, prev_group_id), (Some(a), Some(b)) if a == b)
    }
}

/// The cells of one schema row, named after the columns of the parameter sheet.
///
/// This is what the loaders hand over to the schema builder.
#[derive(PartialEq, Debug, Clone)]
pub struct RawRow {
    pub id: CellValue,
    pub group_id: CellValue,
    pub has_checkbox: CellValue,
    pub checkbox_label: CellValue,
    pub checkbox_default: CellValue,
    pub has_header: CellValue,
    pub header_label: CellValue,
    pub format_spec: CellValue,
    pub min: CellValue,
    pub max: CellValue,
    pub default: CellValue,
    pub step: CellValue,
    pub label: CellValue,
    pub widget_key: CellValue,
    pub widget_kind: CellValue,
    pub attr: CellValue,
    pub entity: CellValue,
}

impl Default for RawRow {
    fn default() -> Self {
        RawRow {
            id: CellValue::Empty,
            group_id: CellValue::Empty,
            has_checkbox: CellValue::Empty,
            checkbox_label: CellValue::Empty,
            checkbox_default: CellValue::Empty,
            has_header: CellValue::Empty,
            header_label: CellValue::Empty,
            format_spec: CellValue::Empty,
            min: CellValue::Empty,
            max: CellValue::Empty,
            default: CellValue::Empty,
            step: CellValue::Empty,
            label: CellValue::Empty,
            widget_key: CellValue::Empty,
            widget_kind: CellValue::Empty,
            attr: CellValue::Empty,
            entity: CellValue::Empty,
        }
    }
}

impl RawRow {
    pub fn is_blank(&self) -> bool {
        [
            &self.id,
            &self.group_id,
            &self.has_checkbox,
            &self.checkbox_label,
            &self.checkbox_default,
            &self.has_header,
            &self.header_label,
            &self.format_spec,
            &self.min,
            &self.max,
            &self.default,
            &self.step,
            &self.label,
            &self.widget_key,
            &self.widget_kind,
            &self.attr,
            &self.entity,
        ]
        .iter()
        .all(|c| c.is_empty())
    }
}

/// What a provider is asked to render for one active field.
///
/// The bounds, default and step have already been coerced with the field's
/// format.
#[derive(PartialEq, Debug, Clone)]
pub struct WidgetRequest {
    pub kind: WidgetKind,
    pub label: String,
    pub min: Value,
    pub max: Value,
    pub default: Value,
    pub step: Value,
    pub format: FormatSpec,
    pub key: String,
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct ResolvedField {
    pub id: String,
    pub attr: String,
    pub entity: String,
    pub active: bool,
    pub value: Value,
}

/// The outcome of one pass over a schema, in schema order.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ResolvedValues {
    pub fields: Vec<ResolvedField>,
}

impl ResolvedValues {
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.id == id).map(|f| &f.value)
    }

    pub fn is_active(&self, id: &str) -> Option<bool> {
        self.fields.iter().find(|f| f.id == id).map(|f| f.active)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One colour band of the stacked chart.
#[derive(PartialEq, Debug, Clone)]
pub struct ChartSeries {
    pub entity: String,
    /// One point per attr, aligned with `Chart::attrs`.
    pub points: Vec<Value>,
}

/// Resolved values stacked per attr (x axis) and entity (colour).
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Chart {
    pub attrs: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Errors that stop a form from being resolved.
#[derive(PartialEq, Debug, Clone)]
pub enum FormErrors {
    UnknownWidget {
        field: String,
        widget: String,
    },
    MissingValue {
        field: String,
        column: String,
    },
    InvalidValue {
        field: String,
        column: String,
        content: String,
    },
    InvalidFlag {
        field: String,
        column: String,
        content: String,
    },
    DuplicateId(String),
    DuplicateKey {
        field: String,
        key: String,
    },
    /// A scripted provider had no answer for this prompt.
    MissingAnswer(String),
    /// The provider itself failed (closed input, broken terminal, ...).
    Provider(String),
}

impl Error for FormErrors {}

impl Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormErrors::UnknownWidget { field, widget } => {
                write!(f, "field {}: unknown widget {:?}", field, widget)
            }
            FormErrors::MissingValue { field, column } => {
                write!(f, "field {}: missing value in column {}", field, column)
            }
            FormErrors::InvalidValue {
                field,
                column,
                content,
            } => write!(
                f,
                "field {}: cannot convert {} in column {}",
                field, content, column
            ),
            FormErrors::InvalidFlag {
                field,
                column,
                content,
            } => write!(
                f,
                "field {}: expected a boolean in column {}, found {}",
                field, column, content
            ),
            FormErrors::DuplicateId(id) => write!(f, "duplicate field id {}", id),
            FormErrors::DuplicateKey { field, key } => {
                write!(f, "field {}: widget key {} is already in use", field, key)
            }
            FormErrors::MissingAnswer(prompt) => write!(f, "no answer recorded for {}", prompt),
            FormErrors::Provider(msg) => write!(f, "widget provider failed: {}", msg),
        }
    }
}
