//! Server-rendered dashboard pages.
//!
//! Pages share one layout (title bar, navigation, plotly.js loader) and are
//! assembled from plain strings. Every value that originates from an upload
//! or the demographic file goes through [`escape`].

use std::fmt::Write;

use crate::dataset::DemographicTable;
use crate::error::{DatasetError, ErrorCode, PipelineError};
use crate::pipeline::{AnalysisReport, DISCLAIMER};
use crate::report::plot;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
nav{width:14rem;padding:1rem;background:#f0f2f6;min-height:100vh}\
nav a{display:block;margin:.5rem 0}\
main{flex:1;padding:1rem 2rem}\
.banner{padding:.75rem;border-radius:.25rem;margin:.5rem 0}\
.error{background:#fde2e1;color:#8a1c1c}\
.warning{background:#fff4d6;color:#7a5a00}\
.success{background:#dff5e3;color:#1d6b32}\
.info{background:#e3eefc;color:#1b4a8a}\
.metric{font-size:2.5rem;font-weight:bold}\
.columns{display:flex;gap:2rem}\
.columns>div:first-child{flex:2}.columns>div:last-child{flex:1}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.25rem .5rem}\
progress{width:100%}";

/// Minimal HTML escaping for text and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <title>{title} - EEG Risk Dashboard</title>\
         <script src=\"{PLOTLY_JS}\"></script><style>{STYLE}</style></head>\
         <body><nav><strong>Dashboard Controls</strong>\
         <a href=\"/\">Analysis Portal</a>\
         <a href=\"/research\">Research Data</a>\
         <a href=\"/about\">About Project</a></nav>\
         <main><h1>EEG Risk Dashboard</h1><hr>{body}</main></body></html>",
        title = escape(title),
    )
}

fn upload_form() -> &'static str {
    "<form action=\"/analyze\" method=\"post\" enctype=\"multipart/form-data\">\
     <label>Upload EEG CSV File <input type=\"file\" name=\"file\" accept=\".csv\" required></label> \
     <button type=\"submit\">Analyze</button></form>"
}

/// Landing page with the upload form
pub fn dashboard_page() -> String {
    let body = format!("<h2>Patient EEG Analysis</h2>{}", upload_form());
    layout("Analysis Portal", &body)
}

/// Result page: plot on the left, score and banner on the right
pub fn analysis_page(report: &AnalysisReport) -> String {
    let mut body = String::from("<h2>Patient EEG Analysis</h2>");
    body.push_str(upload_form());

    if let Some(notice) = &report.notice {
        let _ = write!(body, "<div class=\"banner info\">{}</div>", escape(notice));
    }

    let _ = write!(
        body,
        "<div class=\"columns\"><div><h3>Cleaned EEG Signal</h3>{plot}</div>\
         <div><h3>Diagnosis Risk Score</h3>\
         <div>Risk</div><div class=\"metric\">{score}%</div>\
         <div class=\"banner {class}\">{banner}</div>\
         <progress max=\"100\" value=\"{score}\"></progress>\
         <p><small>{channels} channel(s), {samples} samples at {rate} Hz; \
         scored on {channel}.</small></p></div></div>\
         <p><small>{disclaimer}</small></p>",
        plot = plot::trace_inline_html(&report.channel, &report.trace),
        score = report.score,
        class = report.severity.css_class(),
        banner = escape(report.banner),
        channels = report.channel_count,
        samples = report.sample_count,
        rate = report.sample_rate_hz,
        channel = escape(&report.channel),
        disclaimer = escape(report.disclaimer),
    );

    layout("Analysis", &body)
}

/// Upload that could not be analysed
pub fn analysis_error_page(err: &PipelineError) -> String {
    let body = format!(
        "<h2>Patient EEG Analysis</h2>{}<div class=\"banner error\">Analysis failed (code {}): {}</div>",
        upload_form(),
        err.code(),
        escape(&err.message())
    );
    layout("Analysis", &body)
}

/// Demographic table, or the generic error banner
pub fn research_page(result: &Result<DemographicTable, DatasetError>) -> String {
    let mut body = String::from(
        "<h2>Research Dataset Pipeline</h2>\
         <p>Viewing current training metadata (demographic.csv)</p>",
    );

    match result {
        Ok(table) => {
            body.push_str("<table><thead><tr>");
            for header in &table.headers {
                let _ = write!(body, "<th>{}</th>", escape(header));
            }
            body.push_str("</tr></thead><tbody>");
            for row in &table.rows {
                body.push_str("<tr>");
                for cell in row {
                    let _ = write!(body, "<td>{}</td>", escape(cell));
                }
                body.push_str("</tr>");
            }
            body.push_str("</tbody></table>");
        }
        Err(err) => {
            let _ = write!(
                body,
                "<div class=\"banner error\">{}</div>",
                escape(&err.message())
            );
        }
    }

    layout("Research Data", &body)
}

pub fn about_page() -> String {
    let body = format!(
        "<h2>About Project</h2>\
         <p>Uploaded recordings are read as samples x channels at 250 Hz, band-pass \
         filtered to 1-40 Hz, and the first channel's Welch power spectrum is reduced \
         to a theta (4-8 Hz) over alpha (8-12 Hz) power ratio. The ratio times ten, \
         truncated and clamped to 10-95, is shown as a percentage.</p>\
         <div class=\"banner warning\">{}</div>",
        escape(DISCLAIMER)
    );
    layout("About", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::pipeline::analyze_bytes;
    use std::path::PathBuf;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<b>\"Fz\" & 'Cz'</b>"),
            "&lt;b&gt;&quot;Fz&quot; &amp; &#39;Cz&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_analysis_page_shows_score_and_banner() {
        let report = analyze_bytes(b"x\n1\n", &AppConfig::default()).unwrap();
        let html = analysis_page(&report);
        assert!(html.contains(&format!("{}%", report.score)));
        assert!(html.contains(report.banner));
        assert!(html.contains("banner info"));
        assert!(html.contains(plot::TRACE_DIV_ID));
    }

    #[test]
    fn test_research_page_escapes_cells() {
        let table = DemographicTable {
            headers: vec!["name".to_string()],
            rows: vec![vec!["<script>".to_string()]],
        };
        let html = research_page(&Ok(table));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<td><script>"));
    }

    #[test]
    fn test_research_page_error_banner() {
        let err = DatasetError::Unavailable {
            path: PathBuf::from("data/demographic.csv"),
            details: "gone".to_string(),
        };
        let html = research_page(&Err(err));
        assert!(html.contains("demographic.csv not found in data folder."));
        assert!(!html.contains("gone"));
    }
}
