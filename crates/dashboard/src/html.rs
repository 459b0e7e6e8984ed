use crate::chart::{escape_html, ChartSpec};
use crate::model::{MetricSummary, SchoolDelta};
use chrono::Local;

/// Render the dashboard as a standalone HTML page: headline metrics, the
/// per-school delta table and the grouped comparison chart (Chart.js).
#[must_use]
pub fn render_page(
    indicator: &str,
    summary: &MetricSummary,
    deltas: &[SchoolDelta],
    chart: &ChartSpec,
) -> String {
    let indicator = escape_html(indicator);
    let json = serde_json::to_string(chart)
        .unwrap_or_default()
        .replace("</", "<\\/"); // Prevent script tag breakout

    let mut delta_rows = String::new();
    for delta in deltas {
        delta_rows.push_str(&format!(
            "            <tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:+.2}</td></tr>\n",
            escape_html(&delta.school),
            delta.previous,
            delta.current,
            delta.delta,
        ));
    }

    let generated = Local::now().format("%Y-%m-%d %H:%M");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Comparativo de {indicator} Escolar</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
    <h1>Comparativo de Dados Escolares</h1>
    <ul>
        <li>Media {indicator} Anterior: {prev_mean:.2}</li>
        <li>Media {indicator} Atual: {cur_mean:.2} ({delta:+.2})</li>
        <li>Total de Escolas: {count}</li>
    </ul>
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
                    title: {{ display: true, text: spec.title }},
                    legend: {{ display: spec.options.show_legend }}
                }}
            }}
        }});
    </script>
    <h2>Dados Detalhados</h2>
    <table border="1">
        <thead>
            <tr><th>Escola</th><th>Anterior</th><th>Atual</th><th>Diferenca</th></tr>
        </thead>
        <tbody>
{delta_rows}        </tbody>
    </table>
    <p><small>Gerado em {generated}</small></p>
</body>
</html>"#,
        indicator = indicator,
        prev_mean = summary.previous_mean,
        cur_mean = summary.current_mean,
        delta = summary.delta,
        count = summary.school_count,
        json = json,
        chart_type = chart.chart_js_type(),
        delta_rows = delta_rows,
        generated = generated,
    )
}
