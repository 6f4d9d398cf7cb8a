use log::debug;

use crate::config::*;

/// Upper bound on the number of choices enumerated for a radio widget.
pub const MAX_RADIO_OPTIONS: usize = 1000;

/// Converts a raw cell to the type selected by a field's format.
///
/// Integer coercion truncates floats towards zero, text coercion keeps the
/// trailing `.0` of whole floats. Empty cells are an error: the bounds,
/// default and step of a field are all required.
pub fn coerce(
    raw: &CellValue,
    coercion: Coercion,
    field: &str,
    column: &str,
) -> Result<Value, FormErrors> {
    let invalid = || FormErrors::InvalidValue {
        field: field.to_string(),
        column: column.to_string(),
        content: format!("{:?}", raw),
    };
    if let CellValue::Empty = raw {
        return Err(FormErrors::MissingValue {
            field: field.to_string(),
            column: column.to_string(),
        });
    }
    let res = match coercion {
        Coercion::Int => match raw {
            CellValue::Int(i) => Value::Int(*i),
            CellValue::Float(f) if f.is_finite() => Value::Int(f.trunc() as i64),
            CellValue::Bool(b) => Value::Int(*b as i64),
            CellValue::Text(s) => Value::Int(s.trim().parse::<i64>().map_err(|_| invalid())?),
            _ => return Err(invalid()),
        },
        Coercion::Float => match raw {
            CellValue::Int(i) => Value::Float(*i as f64),
            CellValue::Float(f) => Value::Float(*f),
            CellValue::Bool(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => Value::Float(s.trim().parse::<f64>().map_err(|_| invalid())?),
            CellValue::Empty => return Err(invalid()),
        },
        Coercion::Text => match raw {
            CellValue::Int(i) => Value::Text(i.to_string()),
            CellValue::Float(f) => Value::Text(format!("{:?}", f)),
            CellValue::Bool(b) => Value::Text(if *b { "True" } else { "False" }.to_string()),
            CellValue::Text(s) => Value::Text(s.clone()),
            CellValue::Empty => return Err(invalid()),
        },
    };
    Ok(res)
}

/// Builds the request for an active field, coercing its range with the
/// field's format.
pub fn widget_request(field: &FieldSpec) -> Result<WidgetRequest, FormErrors> {
    let c = field.format_spec.coercion();
    debug!(
        "widget_request: field {} format {:?} coercion {:?}",
        field.id,
        field.format_spec.as_str(),
        c
    );
    Ok(WidgetRequest {
        kind: field.widget_kind,
        label: field.label.clone(),
        min: coerce(&field.min, c, &field.id, "min_value")?,
        max: coerce(&field.max, c, &field.id, "max_value")?,
        default: coerce(&field.default, c, &field.id, "default_value")?,
        step: coerce(&field.step, c, &field.id, "step")?,
        format: field.format_spec.clone(),
        key: field.widget_key.clone(),
    })
}

impl WidgetRequest {
    /// The choices offered by a radio widget: `min..=max` by `step`.
    ///
    /// Falls back to the default alone for text ranges, a non-positive step or
    /// an empty range.
    pub fn options(&self) -> Vec<Value> {
        let options: Vec<Value> = match (&self.min, &self.max, &self.step) {
            (Value::Int(min), Value::Int(max), Value::Int(step)) if *step > 0 => (*min..=*max)
                .step_by(*step as usize)
                .take(MAX_RADIO_OPTIONS)
                .map(Value::Int)
                .collect(),
            (Value::Float(min), Value::Float(max), Value::Float(step))
                if *step > 0.0 && min.is_finite() && max.is_finite() =>
            {
                // Tolerate the rounding of repeated float steps at the upper bound.
                let eps = step * 1e-9;
                (0..MAX_RADIO_OPTIONS)
                    .map(|i| min + (i as f64) * step)
                    .take_while(|x| *x <= max + eps)
                    .map(Value::Float)
                    .collect()
            }
            _ => vec![],
        };
        if options.is_empty() {
            vec![self.default.clone()]
        } else {
            options
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(raw: impl Into<CellValue>, coercion: Coercion) -> Result<Value, FormErrors> {
        coerce(&raw.into(), coercion, "1", "min_value")
    }

    #[test]
    fn int_format_truncates() {
        assert_eq!(c(3.9, Coercion::Int), Ok(Value::Int(3)));
        assert_eq!(c(-3.9, Coercion::Int), Ok(Value::Int(-3)));
        assert_eq!(c(7, Coercion::Int), Ok(Value::Int(7)));
        assert_eq!(c(" 12 ", Coercion::Int), Ok(Value::Int(12)));
    }

    #[test]
    fn int_format_rejects_decimal_text() {
        assert_eq!(
            c("3.5", Coercion::Int),
            Err(FormErrors::InvalidValue {
                field: "1".to_string(),
                column: "min_value".to_string(),
                content: "Text(\"3.5\")".to_string(),
            })
        );
        assert!(c(f64::NAN, Coercion::Int).is_err());
    }

    #[test]
    fn float_and_text_formats() {
        assert_eq!(c(2, Coercion::Float), Ok(Value::Float(2.0)));
        assert_eq!(c("0.25", Coercion::Float), Ok(Value::Float(0.25)));
        assert_eq!(c(2, Coercion::Text), Ok(Value::Text("2".to_string())));
        assert_eq!(c(2.0, Coercion::Text), Ok(Value::Text("2.0".to_string())));
        assert_eq!(c(true, Coercion::Text), Ok(Value::Text("True".to_string())));
        assert_eq!(c("abc", Coercion::Text), Ok(Value::Text("abc".to_string())));
    }

    #[test]
    fn empty_cells_are_missing() {
        assert_eq!(
            coerce(&CellValue::Empty, Coercion::Float, "4", "step"),
            Err(FormErrors::MissingValue {
                field: "4".to_string(),
                column: "step".to_string()
            })
        );
    }

    #[test]
    fn format_selects_coercion() {
        assert_eq!(FormatSpec::new("%d").coercion(), Coercion::Int);
        assert_eq!(FormatSpec::new("%.1f").coercion(), Coercion::Float);
        assert_eq!(FormatSpec::new("%.2f").coercion(), Coercion::Float);
        assert_eq!(FormatSpec::new("%s").coercion(), Coercion::Text);
        assert_eq!(FormatSpec::new("%e").coercion(), Coercion::Float);
        assert_eq!(FormatSpec::new("").coercion(), Coercion::Float);
    }

    #[test]
    fn request_coerces_the_whole_range() {
        let field = FieldSpec::new("9", None, WidgetKind::Slider)
            .with_format("%d")
            .with_range(0.0, 10.7, "4", 1.0);
        let req = widget_request(&field).unwrap();
        assert_eq!(req.min, Value::Int(0));
        assert_eq!(req.max, Value::Int(10));
        assert_eq!(req.default, Value::Int(4));
        assert_eq!(req.step, Value::Int(1));

        let field = field.with_format("%.2f");
        let req = widget_request(&field).unwrap();
        assert_eq!(req.max, Value::Float(10.7));
        assert_eq!(req.default, Value::Float(4.0));
    }

    #[test]
    fn radio_options() {
        let field = FieldSpec::new("r", None, WidgetKind::Radio).with_range(1, 9, 3, 2);
        let req = widget_request(&field).unwrap();
        assert_eq!(
            req.options(),
            vec![
                Value::Int(1),
                Value::Int(3),
                Value::Int(5),
                Value::Int(7),
                Value::Int(9)
            ]
        );

        let field = field.with_format("%.1f").with_range(0.0, 0.3, 0.1, 0.1);
        let req = widget_request(&field).unwrap();
        assert_eq!(req.options().len(), 4);

        let field = field.with_format("%s").with_range("a", "z", "m", "1");
        let req = widget_request(&field).unwrap();
        assert_eq!(req.options(), vec![Value::Text("m".to_string())]);
    }

    #[test]
    fn reversed_range_offers_the_default() {
        let field = FieldSpec::new("r", None, WidgetKind::Radio).with_range(9, 1, 4, 1);
        let req = widget_request(&field).unwrap();
        assert_eq!(req.options(), vec![Value::Int(4)]);

        let field = field.with_format("%.1f").with_range(2.0, 1.0, 1.5, 0.5);
        let req = widget_request(&field).unwrap();
        assert_eq!(req.options(), vec![Value::Float(1.5)]);
    }

    #[test]
    fn values_are_rendered_with_their_format() {
        assert_eq!(FormatSpec::new("%.2f").format_value(&Value::Int(3)), "3.00");
        assert_eq!(FormatSpec::new("%.1f").format_value(&Value::Float(0.26)), "0.3");
        assert_eq!(FormatSpec::new("%d").format_value(&Value::Float(7.8)), "7");
        assert_eq!(FormatSpec::new("%s").format_value(&Value::Int(2)), "2");
    }
}
