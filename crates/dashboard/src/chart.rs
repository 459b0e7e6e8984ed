use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Chart specification for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_type: ChartKind,
    pub title: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

/// Chart type for visualization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// Chart data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// A dataset in a chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// Chart rendering options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
    pub show_legend: bool,
}

/// Escape HTML special characters to prevent XSS.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

impl ChartSpec {
    /// Create a new chart specification.
    #[must_use]
    pub fn new(chart_type: ChartKind, title: impl Into<String>) -> Self {
        Self {
            chart_type,
            title: title.into(),
            data: ChartData {
                labels: Vec::new(),
                datasets: Vec::new(),
            },
            options: ChartOptions::default(),
        }
    }

    /// Convert to JSON string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The Chart.js type string for this chart.
    #[must_use]
    pub fn chart_js_type(&self) -> &'static str {
        match self.chart_type {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
        }
    }

    /// Generate a standalone HTML page with embedded Chart.js.
    #[must_use]
    pub fn to_html(&self) -> String {
        // Escape title for HTML context and JSON for script context
        let title = escape_html(&self.title);
        let json = serde_json::to_string(&self)
            .unwrap_or_default()
            .replace("</", "<\\/"); // Prevent script tag breakout

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
    <canvas id="chart"></canvas>
    <script>
        const spec = {json};
        const ctx = document.getElementById('chart').getContext('2d');
        new Chart(ctx, {{
            type: '{chart_type}',
            data: spec.data,
            options: {{
                responsive: true,
                plugins: {{
                    title: {{
                        display: true,
                        text: spec.title
                    }},
                    legend: {{
                        display: spec.options.show_legend
                    }}
                }}
            }}
        }});
    </script>
</body>
</html>"#,
            title = title,
            json = json,
            chart_type = self.chart_js_type(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_spec_new() {
        let chart = ChartSpec::new(ChartKind::Bar, "IEG por Escola");
        assert_eq!(chart.title, "IEG por Escola");
        assert!(matches!(chart.chart_type, ChartKind::Bar));
    }

    #[test]
    fn test_chart_to_json() {
        let chart = ChartSpec::new(ChartKind::Line, "Test");
        let json = chart.to_json().unwrap();
        assert!(json.contains("Test"));
        assert!(json.contains("line"));
    }

    #[test]
    fn test_chart_to_html_escapes_title() {
        let chart = ChartSpec::new(ChartKind::Bar, "<script>alert(1)</script>");
        let html = chart.to_html();
        assert!(html.contains("Chart.js"));
        // title element is HTML-escaped, JSON closing tags cannot break out
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("<\\/script>"));
    }
}
