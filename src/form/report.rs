// The outputs of a run: the text report and the JSON summary.

use log::{debug, info, warn};
use std::fmt::Write as FmtWrite;
use std::fs;

use form_engine::builder::Schema;
use form_engine::*;
use serde_json::json;
use serde_json::Value as JSValue;
use snafu::prelude::*;
use text_diff::print_diff;

use crate::form::config_reader::read_summary;
use crate::form::*;

const CHART_WIDTH: f64 = 40.0;
const CHART_SYMBOLS: [char; 8] = ['#', '=', '*', '+', 'o', 'x', '%', '@'];

fn value_to_json(v: &Value) -> JSValue {
    match v {
        Value::Int(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::Text(s) => json!(s),
    }
}

fn underline(out: &mut String, title: &str, c: char) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", c.to_string().repeat(title.chars().count()));
}

/// Renders the whole report as printed at the end of a run.
pub fn render_report(
    title: &str,
    schema: &Schema,
    resolved: &ResolvedValues,
    totals: &[(String, Value)],
    chart: &Option<Chart>,
) -> String {
    let mut out = String::new();
    underline(&mut out, title, '=');
    out.push('\n');

    for f in resolved.fields.iter() {
        let (label, format) = match schema.get(&f.id) {
            Some(spec) => (spec.label.as_str(), spec.format_spec.clone()),
            None => (f.id.as_str(), FormatSpec::default()),
        };
        if f.active {
            let _ = writeln!(out, "  {}: {}", label, format.format_value(&f.value));
        } else {
            let _ = writeln!(out, "  {}: (skipped)", label);
        }
    }
    out.push('\n');

    underline(&mut out, "Zoo Rating", '-');
    let _ = writeln!(out, "Because attributes are obviously additive...");
    for (attr, v) in totals.iter() {
        let _ = writeln!(out, "Total {} is {}", attr, v);
    }
    out.push('\n');

    if let Some(c) = chart {
        underline(&mut out, "Every DS app needs a nonsense chart", '-');
        out.push_str(&render_chart(c));
    }
    out
}

/// Draws the chart as horizontal stacked bars, one per attr.
///
/// Text and negative points do not show up in the bars.
pub fn render_chart(chart: &Chart) -> String {
    let point = |v: &Value| v.as_f64().filter(|x| *x > 0.0).unwrap_or(0.0);
    let stacks: Vec<f64> = (0..chart.attrs.len())
        .map(|idx| {
            chart
                .series
                .iter()
                .map(|s| s.points.get(idx).map(point).unwrap_or(0.0))
                .sum::<f64>()
        })
        .collect();
    let highest = stacks.iter().cloned().fold(0.0, f64::max);
    let scale = if highest > 0.0 {
        CHART_WIDTH / highest
    } else {
        0.0
    };
    debug!("render_chart: highest stack: {} scale: {}", highest, scale);

    let label_width = chart.attrs.iter().map(|a| a.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (idx, attr) in chart.attrs.iter().enumerate() {
        let mut bar = String::new();
        for (sidx, s) in chart.series.iter().enumerate() {
            let width = (s.points.get(idx).map(point).unwrap_or(0.0) * scale).round() as usize;
            let symbol = CHART_SYMBOLS[sidx % CHART_SYMBOLS.len()];
            bar.extend(std::iter::repeat(symbol).take(width));
        }
        let _ = writeln!(
            out,
            "{:>width$} |{} {}",
            attr,
            bar,
            stacks[idx],
            width = label_width
        );
    }
    let legend: Vec<String> = chart
        .series
        .iter()
        .enumerate()
        .map(|(sidx, s)| format!("{} {}", CHART_SYMBOLS[sidx % CHART_SYMBOLS.len()], s.entity))
        .collect();
    let _ = writeln!(out, "{:>width$}  {}", "", legend.join("  "), width = label_width);
    out
}

pub fn build_summary_js(
    title: &str,
    resolved: &ResolvedValues,
    totals: &[(String, Value)],
    chart: &Option<Chart>,
) -> JSValue {
    let fields: Vec<JSValue> = resolved
        .fields
        .iter()
        .map(|f| {
            json!({
                "id": f.id,
                "attr": f.attr,
                "entity": f.entity,
                "active": f.active,
                "value": value_to_json(&f.value),
            })
        })
        .collect();
    let totals_js: Vec<JSValue> = totals
        .iter()
        .map(|(attr, v)| json!({"attr": attr, "total": value_to_json(v)}))
        .collect();
    let chart_js = match chart {
        None => JSValue::Null,
        Some(c) => {
            let series: Vec<JSValue> = c
                .series
                .iter()
                .map(|s| {
                    let values: Vec<JSValue> = s.points.iter().map(value_to_json).collect();
                    json!({"entity": s.entity, "values": values})
                })
                .collect();
            json!({"attrs": c.attrs, "series": series})
        }
    };
    json!({
        "title": title,
        "fields": fields,
        "totals": totals_js,
        "chart": chart_js,
    })
}

/// Writes the summary to a file, or to the standard output for `stdout`.
pub fn write_summary(js: &JSValue, out: &str) -> AssessResult<()> {
    let pretty_js = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {})?;
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        info!("Writing the summary to {}", out);
        fs::write(out, pretty_js).context(WritingOutputSnafu { path: out })?;
    }
    Ok(())
}

/// Compares the summary with a reference file, printing the differences.
pub fn check_reference(js: &JSValue, reference: &str) -> AssessResult<()> {
    let pretty_js = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {})?;
    let summary_ref = read_summary(reference)?;
    debug!("check_reference: reference: {:?}", summary_ref);
    let pretty_js_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_ref != pretty_js {
        warn!("Found differences with the reference summary {}", reference);
        print_diff(pretty_js_ref.as_str(), pretty_js.as_str(), "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    info!("The summary matches the reference {}", reference);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_engine::builder::SchemaBuilder;

    fn small_form() -> (Schema, ResolvedValues) {
        let schema = SchemaBuilder::new()
            .field(
                FieldSpec::new("1", Some("cat"), WidgetKind::Slider)
                    .with_label("How many cats?")
                    .with_attr("lovability")
                    .with_entity("cat"),
            )
            .unwrap()
            .field(
                FieldSpec::new("2", Some("dog"), WidgetKind::Slider)
                    .with_label("How loud?")
                    .with_format("%.1f")
                    .with_attr("scariness")
                    .with_entity("dog"),
            )
            .unwrap()
            .build();
        let mut provider = ReplayProvider::new(true).value("1", 3).value("2", 1.5);
        let resolved = resolve_fields(&schema, &mut provider).unwrap();
        (schema, resolved)
    }

    #[test]
    fn report_lists_answers_and_totals() {
        let (schema, resolved) = small_form();
        let totals = totals_by_attr(&resolved);
        let report = render_report("My zoo", &schema, &resolved, &totals, &None);
        assert!(report.starts_with("My zoo\n======\n"));
        assert!(report.contains("  How many cats?: 3\n"));
        assert!(report.contains("  How loud?: 1.5\n"));
        assert!(report.contains("Total lovability is 3\n"));
        assert!(report.contains("Total scariness is 1.5\n"));
        assert!(!report.contains("nonsense chart"));
    }

    #[test]
    fn chart_bars_are_scaled_to_the_highest_stack() {
        let chart = Chart {
            attrs: vec!["lovability".to_string(), "fur".to_string()],
            series: vec![
                ChartSeries {
                    entity: "cat".to_string(),
                    points: vec![Value::Int(2), Value::Float(1.0)],
                },
                ChartSeries {
                    entity: "dog".to_string(),
                    points: vec![Value::Int(2), Value::Text("x".to_string())],
                },
            ],
        };
        let text = render_chart(&chart);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            format!("lovability |{}{} 4", "#".repeat(20), "=".repeat(20))
        );
        assert_eq!(lines[1], format!("       fur |{} 1", "#".repeat(10)));
        assert_eq!(lines[2], "            # cat  = dog");
    }

    #[test]
    fn summary_keeps_value_types() {
        let (_, resolved) = small_form();
        let totals = totals_by_attr(&resolved);
        let chart = Some(chart_series(&resolved));
        let js = build_summary_js("My zoo", &resolved, &totals, &chart);
        assert_eq!(js["title"], json!("My zoo"));
        assert_eq!(js["fields"][0]["value"], json!(3));
        assert_eq!(js["fields"][1]["value"], json!(1.5));
        assert_eq!(js["totals"][1], json!({"attr": "scariness", "total": 1.5}));
        assert_eq!(js["chart"]["attrs"], json!(["lovability", "scariness"]));
        assert_eq!(js["chart"]["series"][1]["values"], json!([0, 1.5]));

        let js = build_summary_js("My zoo", &resolved, &totals, &None);
        assert_eq!(js["chart"], JSValue::Null);
    }

    #[test]
    fn reference_mismatch_fails() {
        let (_, resolved) = small_form();
        let js = build_summary_js("My zoo", &resolved, &[], &None);
        let path = std::env::temp_dir().join("zooform_report_reference.json");
        let path = path.display().to_string();
        write_summary(&js, &path).unwrap();
        assert!(check_reference(&js, &path).is_ok());

        let other = build_summary_js("Another zoo", &resolved, &[], &None);
        assert!(check_reference(&other, &path).is_err());
        let _ = fs::remove_file(&path);
    }
}
