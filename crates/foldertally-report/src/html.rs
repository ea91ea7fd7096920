//! Standalone HTML rendering.
//!
//! The page pulls Tabulator and Chart.js from public CDNs; all report data is
//! embedded as JSON so the file can be served statically.

use std::fmt::Write;

use thiserror::Error;

use crate::model::{Change, ReportModel, Trend};

/// Errors rendering a report.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Report data could not be encoded for embedding.
    #[error("Could not encode report data: {0}")]
    Encode(#[from] serde_json::Error),

    /// Writing into the output buffer failed.
    #[error("Could not write report: {0}")]
    Format(#[from] std::fmt::Error),
}

const TITLE: &str = "Folder File Count Report";

const STYLE: &str = r##"
        * { box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #f5f5f5;
            color: #333;
        }
        .container {
            max-width: 1200px;
            margin: 0 auto;
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        h1 { margin: 0 0 10px 0; color: #0061fe; font-size: 24px; }
        .meta-info {
            color: #666;
            font-size: 14px;
            margin-bottom: 20px;
            padding-bottom: 20px;
            border-bottom: 1px solid #eee;
        }
        .chart-container {
            margin-bottom: 25px;
            padding: 20px;
            background: #f8f9fa;
            border-radius: 6px;
            height: 250px;
        }
        .chart-title { margin: 0 0 15px 0; font-size: 16px; font-weight: 600; }
        .stats { display: flex; gap: 20px; margin-bottom: 20px; flex-wrap: wrap; }
        .stat-box {
            background: #f8f9fa;
            padding: 15px 20px;
            border-radius: 6px;
            border-left: 4px solid #0061fe;
        }
        .stat-box.muted { border-left-color: #6c757d; }
        .stat-box .label { font-size: 12px; color: #666; text-transform: uppercase; }
        .stat-box .value { font-size: 24px; font-weight: bold; }
        .growth { color: #dc3545; }
        .shrinkage { color: #28a745; }
        .unchanged { color: #666; }
        .search-box input {
            padding: 10px 15px;
            font-size: 14px;
            border: 1px solid #ddd;
            border-radius: 4px;
            width: 300px;
            margin-bottom: 15px;
        }
        .tabulator { border: 1px solid #ddd; border-radius: 4px; }
        .tabulator-header { border-bottom: 2px solid #0061fe; }
        .footer {
            margin-top: 20px;
            padding-top: 20px;
            border-top: 1px solid #eee;
            font-size: 12px;
            color: #999;
            text-align: center;
        }
"##;

const TABLE_SCRIPT: &str = r##"
        function escapeHtml(text) {
            const div = document.createElement('div');
            div.textContent = text;
            return div.innerHTML.replace(/"/g, '&quot;').replace(/'/g, '&#39;');
        }
        const table = new Tabulator("#folder-table", {
            data: tableData,
            layout: "fitColumns",
            pagination: "local",
            paginationSize: 50,
            paginationSizeSelector: [25, 50, 100, 250, true],
            columns: [
                {
                    title: "Folder Path", field: "path", sorter: "string", widthGrow: 3,
                    formatter: function(cell) {
                        return '<span style="font-family: monospace;">' + escapeHtml(cell.getValue()) + '</span>';
                    }
                },
                {
                    title: "File Count", field: "file_count", sorter: "number",
                    hozAlign: "right", headerHozAlign: "right", width: 150,
                    formatter: function(cell) {
                        const value = cell.getValue();
                        if (value < 0) {
                            const error = cell.getRow().getData().error || "";
                            return '<span style="color: #dc3545;" title="' + escapeHtml(error) + '">Error</span>';
                        }
                        return value.toLocaleString();
                    }
                }
            ],
            initialSort: [{column: "path", dir: "asc"}]
        });
        document.getElementById("search-input").addEventListener("input", function(e) {
            table.setFilter("path", "like", e.target.value.toLowerCase());
        });
"##;

const CHART_SCRIPT: &str = r##"
        new Chart(document.getElementById('progressChart').getContext('2d'), {
            type: 'line',
            data: {
                labels: chartLabels,
                datasets: [{
                    label: 'Total Files',
                    data: chartValues,
                    borderColor: '#0061fe',
                    backgroundColor: 'rgba(0, 97, 254, 0.1)',
                    borderWidth: 2,
                    fill: true,
                    tension: 0.3,
                    pointRadius: 4
                }]
            },
            options: {
                responsive: true,
                maintainAspectRatio: false,
                plugins: {
                    legend: { display: false },
                    tooltip: {
                        callbacks: {
                            label: function(context) { return context.parsed.y.toLocaleString() + ' files'; }
                        }
                    }
                },
                scales: {
                    y: { beginAtZero: true, ticks: { callback: function(v) { return v.toLocaleString(); } } },
                    x: { grid: { display: false } }
                }
            }
        });
"##;

/// Render a report as a standalone HTML document.
pub fn render_html(model: &ReportModel) -> Result<String, RenderError> {
    let mut out = String::with_capacity(16 * 1024);

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "    <meta charset=\"UTF-8\">")?;
    writeln!(
        out,
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    )?;
    writeln!(out, "    <title>{TITLE}</title>")?;
    writeln!(
        out,
        "    <link href=\"https://unpkg.com/tabulator-tables@5.5.0/dist/css/tabulator.min.css\" rel=\"stylesheet\">"
    )?;
    writeln!(out, "    <style>{STYLE}    </style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "    <div class=\"container\">")?;
    writeln!(out, "        <h1>{TITLE}</h1>")?;
    writeln!(
        out,
        "        <div class=\"meta-info\"><strong>Generated:</strong> {}</div>",
        model.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    if model.has_history() {
        writeln!(out, "        <div class=\"chart-container\">")?;
        writeln!(
            out,
            "            <h2 class=\"chart-title\">{}-Day Progress</h2>",
            model.retention_days
        )?;
        writeln!(
            out,
            "            <canvas id=\"progressChart\" style=\"max-height: 180px;\"></canvas>"
        )?;
        writeln!(out, "        </div>")?;
    }

    writeln!(out, "        <div class=\"stats\">")?;
    write_stat(&mut out, "Total Folders", &group_thousands(model.totals.total_folders))?;
    write_stat(&mut out, "Total Files", &group_thousands(model.totals.total_files))?;
    if model.totals.failed_folders > 0 {
        write_stat(
            &mut out,
            "Unreadable Folders",
            &group_thousands(model.totals.failed_folders),
        )?;
    }
    if let Some(change) = model.change {
        write_change(&mut out, change)?;
    }
    writeln!(out, "        </div>")?;

    writeln!(
        out,
        "        <div class=\"search-box\"><input type=\"text\" id=\"search-input\" placeholder=\"Search folders...\"></div>"
    )?;
    writeln!(out, "        <div id=\"folder-table\"></div>")?;
    writeln!(
        out,
        "        <div class=\"footer\">Report generated automatically by foldertally</div>"
    )?;
    writeln!(out, "    </div>")?;

    writeln!(
        out,
        "    <script src=\"https://unpkg.com/tabulator-tables@5.5.0/dist/js/tabulator.min.js\"></script>"
    )?;
    if model.has_history() {
        let labels: Vec<String> = model.history.iter().map(|p| p.date.to_string()).collect();
        let values: Vec<u64> = model.history.iter().map(|p| p.total_files).collect();
        writeln!(
            out,
            "    <script src=\"https://cdn.jsdelivr.net/npm/chart.js\"></script>"
        )?;
        writeln!(out, "    <script>")?;
        writeln!(out, "        const chartLabels = {};", script_json(&labels)?)?;
        writeln!(out, "        const chartValues = {};", script_json(&values)?)?;
        write!(out, "{CHART_SCRIPT}")?;
        writeln!(out, "    </script>")?;
    }
    writeln!(out, "    <script>")?;
    writeln!(out, "        const tableData = {};", script_json(&model.rows)?)?;
    write!(out, "{TABLE_SCRIPT}")?;
    writeln!(out, "    </script>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;

    Ok(out)
}

fn write_stat(out: &mut String, label: &str, value: &str) -> Result<(), RenderError> {
    writeln!(
        out,
        "            <div class=\"stat-box\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
        escape_html(label),
        escape_html(value)
    )?;
    Ok(())
}

fn write_change(out: &mut String, change: Change) -> Result<(), RenderError> {
    let (arrow, text) = match change.trend {
        Trend::Growth => ("&#x2191;", format!("{} files", group_thousands(change.delta.unsigned_abs()))),
        Trend::Shrinkage => ("&#x2193;", format!("{} files", group_thousands(change.delta.unsigned_abs()))),
        Trend::Unchanged => ("&#x2192;", "No change".to_string()),
    };
    writeln!(
        out,
        "            <div class=\"stat-box muted\"><div class=\"label\">Change Since Previous</div><div class=\"value {}\">{arrow} {}</div></div>",
        change.trend,
        escape_html(&text)
    )?;
    Ok(())
}

/// Encode a value as JSON that is safe inside a `<script>` element.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Format a count with `,` thousands separators.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a & 'b'>"), "&lt;a &amp; &#39;b&#39;&gt;");
    }

    #[test]
    fn test_scripts_survive_as_raw_text() {
        assert!(TABLE_SCRIPT.contains(r##"new Tabulator("#folder-table""##));
        assert!(TABLE_SCRIPT.trim_end().ends_with("});"));
        assert!(CHART_SCRIPT.contains("new Chart("));
    }

    #[test]
    fn test_error_tooltip_escapes_quotes() {
        assert!(TABLE_SCRIPT.contains(r#"replace(/"/g, '&quot;')"#));
        assert!(TABLE_SCRIPT.contains(r#"title="' + escapeHtml(error) + '""#));
    }

    #[test]
    fn test_script_json_cannot_close_script() {
        let json = script_json(&["</script><script>alert(1)"]).unwrap();
        assert!(!json.contains("</script>"));
    }
}
