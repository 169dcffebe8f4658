//! Server-rendered HTML for the dashboard page.

use serde_json::{Value, json};

use crate::prediction::cluster_labels::ClusterLabelTable;
use crate::prediction::features::{FEATURE_FIELDS, FeatureRecord, FieldSpec, Widget};
use crate::prediction::predict::{PCA_COLUMNS, PcaCoordinates, PredictionResult};

pub const CSV_FILE_NAME: &str = "pca_coords.csv";

/// What to show under the form.
pub enum Outcome<'a> {
    Prediction(&'a PredictionResult),
    Error(String),
}

const STYLE: &str = r#"
html, body { background-color: #0e0e0e; color: #f0f0f0; font-family: 'Segoe UI', sans-serif; margin: 0; }
.layout { display: flex; min-height: 100vh; }
aside { width: 280px; padding: 1.5em; background-color: #121212; border-right: 1px solid #2a2a2a; }
main { flex: 1; padding: 1.5em 3em; max-width: 900px; }
label { display: block; margin-top: 1em; }
input[type=number] { background-color: #1a1a1a; color: #fff; border: 1px solid #333; padding: 0.4em; width: 100%; box-sizing: border-box; }
.slider { display: flex; align-items: center; gap: 0.8em; }
.slider input { flex: 1; }
button { background-color: #333333; color: white; border: 1px solid #555555; padding: 0.6em 1.2em; font-weight: bold; border-radius: 4px; margin-top: 1.2em; cursor: pointer; }
button:hover { background-color: #444444; border-color: #888; }
.success { background-color: #173b24; border: 1px solid #2f7a47; padding: 0.8em; border-radius: 4px; margin-top: 1.5em; }
.error { background-color: #3b1717; border: 1px solid #7a2f2f; padding: 0.8em; border-radius: 4px; margin-top: 1.5em; }
table { border-collapse: collapse; background-color: #1a1a1a; margin: 0.5em 0; }
th, td { border: 1px solid #333; padding: 0.4em 1em; text-align: right; }
#pca-chart { width: 100%; margin-top: 1em; }
hr { border-color: #333; margin-top: 40px; }
small { color: #999; }
footer { text-align: center; font-size: 12px; }
"#;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Vega-Lite spec for the single-point scatter: circle mark, hover tooltip, scale-bound
/// interval selection for pan and zoom.
pub fn chart_spec(coordinates: &PcaCoordinates) -> Value {
    json!({
        "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
        "data": {"values": [{"index": 0, "PCA 1": coordinates.pca_1, "PCA 2": coordinates.pca_2}]},
        "mark": {"type": "circle", "size": 100},
        "encoding": {
            "x": {"field": "PCA 1", "type": "quantitative"},
            "y": {"field": "PCA 2", "type": "quantitative"},
            "tooltip": [
                {"field": "PCA 1", "type": "quantitative"},
                {"field": "PCA 2", "type": "quantitative"}
            ]
        },
        "params": [{"name": "grid", "select": "interval", "bind": "scales"}],
        "width": "container",
        "height": 300,
        "background": "#0e0e0e",
        "config": {"axis": {"labelColor": "#f0f0f0", "titleColor": "#f0f0f0", "gridColor": "#2a2a2a"}}
    })
}

fn render_sidebar(out: &mut String, labels: &ClusterLabelTable) {
    out.push_str("<aside><h2>About the App</h2>");
    out.push_str(
        "<p>Cluster traders into personality types using historical metrics. \
         Powered by KMeans on PCA-reduced data.</p>",
    );
    out.push_str("<p><strong>Trader Types:</strong></p><ul>");
    for entry in labels.entries() {
        out.push_str(&format!("<li>{}: {}</li>", entry.id, escape_html(entry.label)));
    }
    out.push_str("</ul></aside>");
}

fn render_field(out: &mut String, spec: &FieldSpec, value: f64) {
    match spec.widget {
        Widget::NumberInput => {
            out.push_str(&format!(
                r#"<label for="{name}">{label}</label><input type="number" id="{name}" name="{name}" value="{value}" step="any" required"#,
                name = spec.name,
                label = escape_html(spec.label),
            ));
            if let Some(min) = spec.min {
                out.push_str(&format!(r#" min="{min}""#));
            }
            if let Some(max) = spec.max {
                out.push_str(&format!(r#" max="{max}""#));
            }
            out.push('>');
            if !spec.hint.is_empty() {
                out.push_str(&format!("<small>{}</small>", escape_html(spec.hint)));
            }
        }
        Widget::Slider => {
            let min = spec.min.unwrap_or(0.0);
            let max = spec.max.unwrap_or(1.0);
            out.push_str(&format!(
                r#"<label for="{name}"><strong>{label}</strong> <output id="{name}_out">{value}</output></label><div class="slider"><span>{min:?}</span><input type="range" id="{name}" name="{name}" min="{min}" max="{max}" step="0.01" value="{value}" oninput="document.getElementById('{name}_out').value = this.value"><span>{max:?}</span></div>"#,
                name = spec.name,
                label = escape_html(spec.label),
            ));
        }
    }
}

fn render_form(out: &mut String, record: &FeatureRecord) {
    out.push_str(r#"<form method="post" action="/predict"><h3>Enter Trading Metrics</h3>"#);
    for (spec, value) in FEATURE_FIELDS.iter().zip(record.to_vec()) {
        render_field(out, spec, value);
    }
    out.push_str(r#"<button type="submit">Predict Cluster</button></form>"#);
}

fn render_prediction(out: &mut String, record: &FeatureRecord, result: &PredictionResult) {
    out.push_str(&format!(
        r#"<div class="success">Predicted Cluster: {} — {}</div>"#,
        result.cluster_id,
        escape_html(result.cluster_label)
    ));

    out.push_str("<p>PCA Coordinates:</p><table><thead><tr><th></th>");
    for column in PCA_COLUMNS {
        out.push_str(&format!("<th>{column}</th>"));
    }
    out.push_str("</tr></thead><tbody><tr><th>0</th>");
    for cell in result.coordinates.cells() {
        out.push_str(&format!("<td>{cell}</td>"));
    }
    out.push_str("</tr></tbody></table>");

    // keep "</" out of the inline script body
    let chart_json = chart_spec(&result.coordinates).to_string().replace("</", "<\\/");
    out.push_str(r#"<div id="pca-chart"></div>"#);
    out.push_str(r#"<script src="https://cdn.jsdelivr.net/npm/vega@5"></script>"#);
    out.push_str(r#"<script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>"#);
    out.push_str(r#"<script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>"#);
    out.push_str(&format!(
        r##"<script>vegaEmbed("#pca-chart", {chart_json}, {{"actions": false}});</script>"##
    ));

    out.push_str(&format!(r#"<form method="post" action="/{CSV_FILE_NAME}">"#));
    for (spec, value) in FEATURE_FIELDS.iter().zip(record.to_vec()) {
        out.push_str(&format!(
            r#"<input type="hidden" name="{}" value="{value}">"#,
            spec.name
        ));
    }
    out.push_str(r#"<button type="submit">Download PCA Coordinates</button></form>"#);
}

/// Full dashboard page with `record` in the form and, optionally, the outcome of the last submit.
pub fn render_dashboard(
    labels: &ClusterLabelTable,
    record: &FeatureRecord,
    outcome: Option<Outcome<'_>>,
) -> String {
    let mut out = String::with_capacity(8 * 1024);
    out.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    out.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>Trader Profiling Dashboard</title>",
    );
    out.push_str(&format!("<style>{STYLE}</style></head><body><div class=\"layout\">"));

    render_sidebar(&mut out, labels);

    out.push_str("<main><h1>Clustering</h1>");
    out.push_str("<p><small>Use trading behavior to predict trader personality type.</small></p>");
    render_form(&mut out, record);

    match outcome {
        Some(Outcome::Prediction(result)) => render_prediction(&mut out, record, result),
        Some(Outcome::Error(message)) => {
            out.push_str(&format!(r#"<div class="error">{}</div>"#, escape_html(&message)));
        }
        None => {}
    }

    out.push_str(
        "<hr><footer>Developed by MrHafeez | Trader Profiling ML App | 2025</footer></main></div></body></html>",
    );
    out
}
