// Trace plot rendering via plotly

use plotly::common::{Line, Mode, Title};
use plotly::layout::{Axis, Layout};
use plotly::{Plot, Scatter};

pub const TRACE_TITLE: &str = "Frontal Lobe Activity (Filtered)";
pub const TRACE_COLOR: &str = "#2ecc71";

/// DOM id of the inline plot div
pub const TRACE_DIV_ID: &str = "eeg-trace";

/// Build the filtered-trace plot for one channel
pub fn trace_plot(channel: &str, trace: &[f64]) -> Plot {
    let x: Vec<usize> = (0..trace.len()).collect();
    let scatter = Scatter::new(x, trace.to_vec())
        .name(channel)
        .mode(Mode::Lines)
        .line(Line::new().color(TRACE_COLOR));

    let layout = Layout::new()
        .title(Title::new(TRACE_TITLE))
        .x_axis(Axis::new().title(Title::new("Sample")))
        .y_axis(Axis::new().title(Title::new(channel)))
        .height(400);

    let mut plot = Plot::new();
    plot.add_trace(scatter);
    plot.set_layout(layout);
    plot
}

/// Plot as a `<div>` + script fragment; the page must load plotly.js
pub fn trace_inline_html(channel: &str, trace: &[f64]) -> String {
    trace_plot(channel, trace).to_inline_html(Some(TRACE_DIV_ID))
}

/// Plot as a self-contained HTML document
pub fn trace_standalone_html(channel: &str, trace: &[f64]) -> String {
    trace_plot(channel, trace).to_html()
}
