pub use crate::config::*;

use log::debug;
use std::collections::HashSet;

/// Column names of the parameter sheet.
pub mod columns {
    pub const ID: &str = "id";
    pub const GROUP_ID: &str = "input_group_id";
    pub const HAS_CHECKBOX: &str = "chkbox_before";
    pub const CHECKBOX_LABEL: &str = "chkbox_label";
    pub const CHECKBOX_DEFAULT: &str = "chkbox_value";
    pub const HAS_HEADER: &str = "header_before";
    pub const HEADER_LABEL: &str = "header_label";
    pub const FORMAT_SPEC: &str = "format_spec";
    pub const MIN: &str = "min_value";
    pub const MAX: &str = "max_value";
    pub const DEFAULT: &str = "default_value";
    pub const STEP: &str = "step";
    pub const LABEL: &str = "desc_label";
    pub const WIDGET_KEY: &str = "st_key";
    pub const WIDGET_KIND: &str = "st_widget";
    pub const ATTR: &str = "attr";
    pub const ENTITY: &str = "cls_or_instnc";

    /// Every column following the id column, in the order of the original sheet.
    pub const ALL: [&str; 16] = [
        GROUP_ID,
        HAS_CHECKBOX,
        CHECKBOX_LABEL,
        CHECKBOX_DEFAULT,
        HAS_HEADER,
        HEADER_LABEL,
        FORMAT_SPEC,
        MIN,
        MAX,
        DEFAULT,
        STEP,
        LABEL,
        WIDGET_KEY,
        WIDGET_KIND,
        ATTR,
        ENTITY,
    ];
}

/// An ordered, validated list of fields.
///
/// Field ids and widget keys are unique.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A builder for schemas, either from typed fields or from raw sheet rows.
///
/// ```
/// use form_engine::builder::SchemaBuilder;
/// use form_engine::{FieldSpec, WidgetKind};
/// # use form_engine::FormErrors;
///
/// let schema = SchemaBuilder::new()
///     .field(FieldSpec::new("1", Some("lion"), WidgetKind::Slider).with_checkbox("Lions?", true))?
///     .field(FieldSpec::new("2", Some("lion"), WidgetKind::NumberInput))?
///     .build();
/// assert_eq!(schema.len(), 2);
///
/// # Ok::<(), FormErrors>(())
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    pub(crate) _fields: Vec<FieldSpec>,
    pub(crate) _ids: HashSet<String>,
    pub(crate) _keys: HashSet<String>,
}

impl SchemaBuilder {
    pub fn new() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn field(mut self, field: FieldSpec) -> Result<SchemaBuilder, FormErrors> {
        self.add_field(field)?;
        Ok(self)
    }

    /// Appends a field after all the fields already added.
    pub fn add_field(&mut self, field: FieldSpec) -> Result<(), FormErrors> {
        if self._ids.contains(&field.id) {
            return Err(FormErrors::DuplicateId(field.id));
        }
        if self._keys.contains(&field.widget_key) {
            return Err(FormErrors::DuplicateKey {
                field: field.id,
                key: field.widget_key,
            });
        }
        self._ids.insert(field.id.clone());
        self._keys.insert(field.widget_key.clone());
        self._fields.push(field);
        Ok(())
    }

    /// Parses and appends one row of the parameter sheet.
    ///
    /// Blank rows are skipped.
    pub fn add_row(&mut self, row: &RawRow) -> Result<(), FormErrors> {
        if row.is_blank() {
            debug!("add_row: skipping blank row");
            return Ok(());
        }
        let field = parse_row(row)?;
        debug!("add_row: {:?}", field);
        self.add_field(field)
    }

    pub fn build(self) -> Schema {
        Schema {
            fields: self._fields,
        }
    }
}

/// Interprets the cells of a sheet row as a field.
///
/// Bounds, default and step stay raw: they are only coerced when the field is
/// active.
pub fn parse_row(row: &RawRow) -> Result<FieldSpec, FormErrors> {
    let id = row.id.as_ident().ok_or(FormErrors::MissingValue {
        field: "?".to_string(),
        column: columns::ID.to_string(),
    })?;
    let required = |cell: &CellValue, column: &str| {
        cell.as_ident().ok_or(FormErrors::MissingValue {
            field: id.clone(),
            column: column.to_string(),
        })
    };

    let has_checkbox = row.has_checkbox.as_flag(&id, columns::HAS_CHECKBOX)?;
    let checkbox_label = if has_checkbox {
        required(&row.checkbox_label, columns::CHECKBOX_LABEL)?
    } else {
        row.checkbox_label.as_ident().unwrap_or_default()
    };
    let has_header = row.has_header.as_flag(&id, columns::HAS_HEADER)?;
    let header_label = if has_header {
        required(&row.header_label, columns::HEADER_LABEL)?
    } else {
        row.header_label.as_ident().unwrap_or_default()
    };

    let widget_name = row.widget_kind.as_ident().unwrap_or_default();
    let widget_kind = widget_name
        .parse::<WidgetKind>()
        .map_err(|widget| FormErrors::UnknownWidget {
            field: id.clone(),
            widget,
        })?;

    Ok(FieldSpec {
        group_id: row.group_id.as_ident(),
        has_checkbox,
        checkbox_label,
        checkbox_default: row
            .checkbox_default
            .as_flag(&id, columns::CHECKBOX_DEFAULT)?,
        has_header,
        header_label,
        widget_kind,
        format_spec: FormatSpec::new(&row.format_spec.as_ident().unwrap_or_default()),
        min: row.min.clone(),
        max: row.max.clone(),
        default: row.default.clone(),
        step: row.step.clone(),
        label: required(&row.label, columns::LABEL)?,
        widget_key: required(&row.widget_key, columns::WIDGET_KEY)?,
        attr: row.attr.as_ident().unwrap_or_default(),
        entity: row.entity.as_ident().unwrap_or_default(),
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lion_row() -> RawRow {
        RawRow {
            id: CellValue::Float(1.0),
            group_id: CellValue::Text("lion".to_string()),
            has_checkbox: CellValue::Bool(true),
            checkbox_label: CellValue::Text("Any lions?".to_string()),
            checkbox_default: CellValue::Bool(false),
            has_header: CellValue::Text("TRUE".to_string()),
            header_label: CellValue::Text("Big cats".to_string()),
            format_spec: CellValue::Text("%d".to_string()),
            min: CellValue::Int(0),
            max: CellValue::Int(10),
            default: CellValue::Int(1),
            step: CellValue::Int(1),
            label: CellValue::Text("How many lions?".to_string()),
            widget_key: CellValue::Int(101),
            widget_kind: CellValue::Text("slider".to_string()),
            attr: CellValue::Text("scariness".to_string()),
            entity: CellValue::Text("lion".to_string()),
        }
    }

    #[test]
    fn parses_a_sheet_row() {
        let f = parse_row(&lion_row()).unwrap();
        assert_eq!(f.id, "1");
        assert_eq!(f.group_id, Some("lion".to_string()));
        assert!(f.has_checkbox);
        assert!(!f.checkbox_default);
        assert!(f.has_header);
        assert_eq!(f.header_label, "Big cats");
        assert_eq!(f.widget_kind, WidgetKind::Slider);
        assert_eq!(f.widget_key, "101");
        assert_eq!(f.attr, "scariness");
    }

    #[test]
    fn unknown_widget_is_fatal() {
        let row = RawRow {
            widget_kind: CellValue::Text("color_picker".to_string()),
            ..lion_row()
        };
        assert_eq!(
            parse_row(&row),
            Err(FormErrors::UnknownWidget {
                field: "1".to_string(),
                widget: "color_picker".to_string()
            })
        );
        let row = RawRow {
            widget_kind: CellValue::Empty,
            ..lion_row()
        };
        assert!(matches!(
            parse_row(&row),
            Err(FormErrors::UnknownWidget { .. })
        ));
    }

    #[test]
    fn checkbox_label_required_only_with_checkbox() {
        let row = RawRow {
            checkbox_label: CellValue::Empty,
            ..lion_row()
        };
        assert_eq!(
            parse_row(&row),
            Err(FormErrors::MissingValue {
                field: "1".to_string(),
                column: "chkbox_label".to_string()
            })
        );
        let row = RawRow {
            has_checkbox: CellValue::Empty,
            checkbox_label: CellValue::Empty,
            ..lion_row()
        };
        assert!(!parse_row(&row).unwrap().has_checkbox);
    }

    #[test]
    fn bad_flags_are_rejected() {
        let row = RawRow {
            has_checkbox: CellValue::Text("maybe".to_string()),
            ..lion_row()
        };
        assert!(matches!(
            parse_row(&row),
            Err(FormErrors::InvalidFlag { .. })
        ));
    }

    #[test]
    fn unknown_format_is_kept() {
        let row = RawRow {
            format_spec: CellValue::Text("%5.3e".to_string()),
            ..lion_row()
        };
        let f = parse_row(&row).unwrap();
        assert_eq!(f.format_spec.as_str(), "%5.3e");
        assert_eq!(f.format_spec.coercion(), Coercion::Float);
    }

    #[test]
    fn builder_rejects_duplicates() {
        let mut b = SchemaBuilder::new();
        b.add_row(&lion_row()).unwrap();
        b.add_row(&RawRow::default()).unwrap();
        assert_eq!(
            b.add_row(&lion_row()),
            Err(FormErrors::DuplicateId("1".to_string()))
        );
        let same_key = RawRow {
            id: CellValue::Int(2),
            ..lion_row()
        };
        assert_eq!(
            b.add_row(&same_key),
            Err(FormErrors::DuplicateKey {
                field: "2".to_string(),
                key: "101".to_string()
            })
        );
        assert_eq!(b.build().len(), 1);
    }
}
