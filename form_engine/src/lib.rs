pub mod builder;
mod coercion;
mod config;
pub mod manual;
pub mod providers;

use log::{debug, info, warn};

pub use crate::builder::Schema;
pub use crate::coercion::{coerce, widget_request, MAX_RADIO_OPTIONS};
pub use crate::config::*;
pub use crate::providers::{DefaultsProvider, ReplayProvider, WidgetProvider};

/// The attrs reported when no other list is requested.
pub const DEFAULT_ATTRS: [&str; 3] = ["lovability", "scariness", "ferocity"];

// **** Group activation ****

/// Running state of the walk over the schema: the group of the previous row
/// and whether that row ended up active.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
struct GroupGate {
    prev_group_id: Option<String>,
    prev_active: bool,
}

impl GroupGate {
    /// Closed when the previous row belongs to the same group and was inactive.
    ///
    /// Only the previous row is consulted: a group that reappears after a row
    /// of another group starts over.
    fn is_open(&self, field: &FieldSpec) -> bool {
        !(field.same_group(&self.prev_group_id) && !self.prev_active)
    }

    fn advance(self, field: &FieldSpec, active: bool) -> GroupGate {
        GroupGate {
            prev_group_id: field.group_id.clone(),
            prev_active: active,
        }
    }
}

/// Resolves every field of the schema, in order.
///
/// A field is active when its own checkbox (if any) is checked and the
/// previous row of the same group is active. Active fields get their value
/// from the provider, inactive fields resolve to zero. The checkbox of a row
/// is still presented when its group is already closed, but its answer is
/// then ignored.
///
/// ```
/// use form_engine::builder::SchemaBuilder;
/// use form_engine::*;
///
/// let schema = SchemaBuilder::new()
///     .field(FieldSpec::new("1", Some("A"), WidgetKind::Slider).with_checkbox("Lions?", false))?
///     .field(FieldSpec::new("2", Some("A"), WidgetKind::Slider))?
///     .build();
/// let resolved = resolve_fields(&schema, &mut DefaultsProvider)?;
/// assert_eq!(resolved.get("2"), Some(&Value::ZERO));
///
/// # Ok::<(), FormErrors>(())
/// ```
pub fn resolve_fields<P: WidgetProvider + ?Sized>(
    schema: &Schema,
    provider: &mut P,
) -> Result<ResolvedValues, FormErrors> {
    info!("resolve_fields: resolving {} fields", schema.len());
    let mut gate = GroupGate::default();
    let mut fields: Vec<ResolvedField> = Vec::with_capacity(schema.len());
    for field in schema.fields() {
        let group_open = gate.is_open(field);
        let own_checkbox = if field.has_checkbox {
            provider.get_checkbox(&field.checkbox_label, field.checkbox_default)?
        } else {
            true
        };
        let active = own_checkbox && group_open;
        debug!(
            "resolve_fields: field {} group {:?} gate open: {} checkbox: {} -> active: {}",
            field.id, field.group_id, group_open, own_checkbox, active
        );

        if active && field.has_header {
            provider.show_header(&field.header_label);
        }

        let value = if active {
            let request = widget_request(field)?;
            provider.get_value(&request)?
        } else {
            Value::ZERO
        };

        fields.push(ResolvedField {
            id: field.id.clone(),
            attr: field.attr.clone(),
            entity: field.entity.clone(),
            active,
            value,
        });
        gate = gate.advance(field, active);
    }
    Ok(ResolvedValues { fields })
}

// **** Aggregation ****

// Int + Int stays an integer, anything else involving a float is a float.
// An integer sum that overflows i64 also becomes a float.
fn add_values(acc: Value, v: &Value) -> Value {
    match (acc, v) {
        (Value::Int(a), Value::Int(b)) => a
            .checked_add(*b)
            .map(Value::Int)
            .unwrap_or_else(|| Value::Float(a as f64 + *b as f64)),
        (acc, v) => Value::Float(acc.as_f64().unwrap_or_default() + v.as_f64().unwrap_or_default()),
    }
}

fn sum_values<'a>(values: impl Iterator<Item = (&'a str, &'a Value)>) -> Value {
    let mut total = Value::ZERO;
    for (id, v) in values {
        if v.is_numeric() {
            total = add_values(total, v);
        } else {
            warn!("sum_values: skipping text value {:?} of field {}", v, id);
        }
    }
    total
}

/// The sum of the resolved values of all the fields tagged with `attr`.
///
/// Text values do not contribute.
pub fn total(values: &ResolvedValues, attr: &str) -> Value {
    sum_values(
        values
            .fields
            .iter()
            .filter(|f| f.attr == attr)
            .map(|f| (f.id.as_str(), &f.value)),
    )
}

/// Totals for the requested attrs, in the requested order.
pub fn totals(values: &ResolvedValues, attrs: &[String]) -> Vec<(String, Value)> {
    attrs
        .iter()
        .map(|attr| (attr.clone(), total(values, attr)))
        .collect()
}

/// The attrs in order of first appearance in the resolved values.
pub fn attrs(values: &ResolvedValues) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for f in values.fields.iter() {
        if !res.contains(&f.attr) {
            res.push(f.attr.clone());
        }
    }
    res
}

/// Totals for every attr present, in order of first appearance.
pub fn totals_by_attr(values: &ResolvedValues) -> Vec<(String, Value)> {
    totals(values, &attrs(values))
}

/// Stacks the resolved values per attr and entity.
///
/// Attrs and entities keep their order of first appearance. A missing
/// (attr, entity) pair is zero.
pub fn chart_series(values: &ResolvedValues) -> Chart {
    let all_attrs = attrs(values);
    let mut entities: Vec<String> = Vec::new();
    for f in values.fields.iter() {
        if !entities.contains(&f.entity) {
            entities.push(f.entity.clone());
        }
    }
    let series: Vec<ChartSeries> = entities
        .iter()
        .map(|entity| ChartSeries {
            entity: entity.clone(),
            points: all_attrs
                .iter()
                .map(|attr| {
                    sum_values(
                        values
                            .fields
                            .iter()
                            .filter(|f| f.attr == *attr && f.entity == *entity)
                            .map(|f| (f.id.as_str(), &f.value)),
                    )
                })
                .collect(),
        })
        .collect();
    debug!(
        "chart_series: {} attrs, {} series",
        all_attrs.len(),
        series.len()
    );
    Chart {
        attrs: all_attrs,
        series,
    }
}
