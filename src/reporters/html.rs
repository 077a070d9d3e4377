//! HTML reporter with embedded styles
//!
//! Generates a standalone HTML report that can be viewed in any browser.
//! Includes:
//! - Overall grade and score
//! - Layer score progress bars
//! - Synchronization coverage and untested files
//! - Errors and warnings as cards, plus recommendations

use crate::models::{Layer, Severity, TrinityValidationResult, ValidationError};

/// Render result as standalone HTML
pub fn generate_html_report(result: &TrinityValidationResult) -> String {
    let mut html = String::new();

    html.push_str(&render_head(result));
    html.push_str("<body>\n<div class=\"container\">\n");
    html.push_str(&render_header(result));

    html.push_str("<div class=\"content\">\n");
    html.push_str(&render_grade_section(result));
    html.push_str(&render_layer_scores(result));
    html.push_str(&render_metrics(result));
    html.push_str(&render_synchronization(result));
    html.push_str(&render_issues(result));
    html.push_str(&render_recommendations(result));
    html.push_str("</div>\n");

    html.push_str(&render_footer(result));
    html.push_str("</div>\n</body>\n</html>");
    html
}

fn render_head(result: &TrinityValidationResult) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Trinity Report - {} - Grade {}</title>
    <style>
{CSS}
    </style>
</head>
"#,
        html_escape(&result.metadata.project_name),
        html_escape(&result.metadata.grade)
    )
}

fn render_header(result: &TrinityValidationResult) -> String {
    let meta = &result.metadata;
    format!(
        r#"<div class="header">
    <h1>Trinity Validation Report</h1>
    <p class="timestamp">{} &middot; {} mode &middot; {}</p>
</div>
"#,
        html_escape(&meta.project_name),
        meta.mode,
        html_escape(&meta.timestamp)
    )
}

fn render_grade_section(result: &TrinityValidationResult) -> String {
    let meta = &result.metadata;
    let overall = result.overall();
    let (status_class, status) = if result.valid {
        ("status-pass", "Passed")
    } else {
        ("status-fail", "Failed")
    };
    let trend = meta
        .trend
        .map(|t| {
            format!(
                "<p class=\"trend\">{:+} since previous run ({})</p>",
                t.delta, t.previous
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="grade-section">
    <div class="grade-badge grade-{}">{}</div>
    <div class="score">Overall Score: {}/100 (minimum {})</div>
    <p class="status {}">{}</p>
    {}
</div>
"#,
        grade_class(&meta.grade),
        html_escape(&meta.grade),
        overall,
        meta.min_trinity_score,
        status_class,
        status,
        trend
    )
}

fn render_layer_scores(result: &TrinityValidationResult) -> String {
    let mut cards = String::new();
    for layer in Layer::ALL {
        let layer_result = result.layers.get(layer);
        if !layer_result.evaluated {
            cards.push_str(&format!(
                r#"        <div class="metric-card skipped">
            <h3>{}</h3>
            <div class="metric-value">&ndash;</div>
            <div class="metric-note">not evaluated in this mode</div>
        </div>
"#,
                layer.label()
            ));
            continue;
        }
        let score = layer_result.score;
        cards.push_str(&format!(
            r#"        <div class="metric-card">
            <h3>{}</h3>
            <div class="metric-value">{}</div>
            <div class="metric-bar">
                <div class="metric-bar-fill {}" style="width: {}%"></div>
            </div>
            <div class="metric-note">{} files &middot; {} errors &middot; {} warnings</div>
        </div>
"#,
            layer.label(),
            score,
            bar_class(score),
            score,
            layer_result.details.total_files,
            layer_result.details.error_count,
            layer_result.details.warning_count
        ));
    }

    format!(
        r#"<div class="section">
    <h2 class="section-title">Layer Scores</h2>
    <div class="metrics-grid">
{}    </div>
</div>
"#,
        cards
    )
}

fn render_metrics(result: &TrinityValidationResult) -> String {
    let meta = &result.metadata;
    format!(
        r#"<div class="section">
    <h2 class="section-title">Run</h2>
    <div class="stats-grid">
        <div class="stat-item">
            <div class="stat-value">{}</div>
            <div class="stat-label">Files</div>
        </div>
        <div class="stat-item">
            <div class="stat-value">{}</div>
            <div class="stat-label">Errors</div>
        </div>
        <div class="stat-item">
            <div class="stat-value">{}</div>
            <div class="stat-label">Warnings</div>
        </div>
        <div class="stat-item">
            <div class="stat-value">{}ms</div>
            <div class="stat-label">Duration</div>
        </div>
    </div>
</div>
"#,
        meta.total_files,
        result.errors.len(),
        result.warnings.len(),
        meta.duration_ms
    )
}

fn render_synchronization(result: &TrinityValidationResult) -> String {
    let sync = &result.synchronization;
    if !sync.evaluated {
        return String::new();
    }

    let missing = if sync.missing_tests.is_empty() {
        "<p>Every implementation file has a test.</p>".to_string()
    } else {
        let items: Vec<String> = sync
            .missing_tests
            .iter()
            .map(|f| format!("<div class=\"file-item\">{}</div>", html_escape(f)))
            .collect();
        format!(
            r#"<div class="affected-files-label">Untested files</div>
    <div class="file-list">{}</div>"#,
            items.join("\n")
        )
    };

    format!(
        r#"<div class="section">
    <h2 class="section-title">Synchronization</h2>
    <p>Test coverage {}% &middot; documentation coverage {}% &middot; {} orphaned tests</p>
    {}
</div>
"#,
        sync.coverage.test_coverage,
        sync.coverage.documentation_coverage,
        sync.orphaned_tests.len(),
        missing
    )
}

fn render_issues(result: &TrinityValidationResult) -> String {
    if result.errors.is_empty() && result.warnings.is_empty() {
        return r#"<div class="section">
    <h2 class="section-title">No Issues Found</h2>
    <p>Every check passed.</p>
</div>
"#
        .to_string();
    }

    let mut html = format!(
        r#"<div class="section">
    <h2 class="section-title">Issues ({} errors, {} warnings)</h2>
    <div class="issues-list">
"#,
        result.errors.len(),
        result.warnings.len()
    );
    for issue in result.errors.iter().chain(result.warnings.iter()) {
        html.push_str(&render_issue(issue));
    }
    html.push_str("    </div>\n</div>\n");
    html
}

fn render_issue(issue: &ValidationError) -> String {
    let (sev_class, sev_label) = match issue.severity {
        Severity::Error => ("severity-error", "Error"),
        Severity::Warning => ("severity-warning", "Warning"),
    };
    let location = issue
        .location()
        .map(|l| format!("<div class=\"file-item\">{}</div>", html_escape(&l)))
        .unwrap_or_default();

    format!(
        r#"<div class="issue-card">
        <div class="issue-header">
            <span class="severity-badge {}">{}</span>
            <div class="issue-title">{}</div>
            <span class="category-badge">{}</span>
        </div>
        {}
    </div>
"#,
        sev_class,
        sev_label,
        html_escape(&issue.message),
        issue.category,
        location
    )
}

fn render_recommendations(result: &TrinityValidationResult) -> String {
    if result.recommendations.is_empty() {
        return String::new();
    }
    let items: Vec<String> = result
        .recommendations
        .iter()
        .map(|r| format!("        <li>{}</li>", html_escape(r)))
        .collect();
    format!(
        r#"<div class="section">
    <h2 class="section-title">Recommendations</h2>
    <ul class="recommendations">
{}
    </ul>
</div>
"#,
        items.join("\n")
    )
}

fn render_footer(result: &TrinityValidationResult) -> String {
    format!(
        r#"<div class="footer">
    <p>Generated by Trinity {}</p>
</div>
"#,
        html_escape(&result.metadata.engine_version)
    )
}

/// CSS class for a grade: `A+` -> `A`, `B-` -> `B`
fn grade_class(grade: &str) -> &'static str {
    match grade.chars().next() {
        Some('A') => "A",
        Some('B') => "B",
        Some('C') => "C",
        Some('D') => "D",
        _ => "F",
    }
}

fn bar_class(score: u32) -> &'static str {
    if score >= 90 {
        "bar-good"
    } else if score >= 80 {
        "bar-moderate"
    } else {
        "bar-poor"
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const CSS: &str = r#"
:root {
    --primary-color: #0f766e;
    --background-color: #f8fafc;
    --text-color: #1e293b;
    --card-background: white;
    --border-color: #e2e8f0;
}

* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    line-height: 1.6;
    color: var(--text-color);
    background: var(--background-color);
    padding: 2rem;
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    background: var(--card-background);
    border-radius: 12px;
    box-shadow: 0 4px 6px -1px rgba(0,0,0,0.1);
    overflow: hidden;
}

.header {
    background: linear-gradient(135deg, #0f766e 0%, #0891b2 100%);
    color: white;
    padding: 2.5rem 2rem;
    text-align: center;
}

.header h1 { font-size: 2.25rem; margin-bottom: 0.5rem; }
.header .timestamp { opacity: 0.9; font-size: 0.95rem; }

.content { padding: 2rem; }

.grade-section {
    text-align: center;
    padding: 2rem;
    background: #f1f5f9;
    border-radius: 8px;
    margin-bottom: 2rem;
}

.grade-badge {
    display: inline-block;
    font-size: 3.5rem;
    font-weight: bold;
    width: 120px;
    height: 120px;
    line-height: 120px;
    border-radius: 50%;
    margin-bottom: 1rem;
    color: white;
}

.grade-A { background: #10b981; }
.grade-B { background: #22c55e; }
.grade-C { background: #eab308; }
.grade-D { background: #f97316; }
.grade-F { background: #ef4444; }

.score { font-size: 1.5rem; color: #64748b; margin-bottom: 0.5rem; }
.status { font-weight: 600; }
.status-pass { color: #059669; }
.status-fail { color: #dc2626; }
.trend { color: #64748b; font-style: italic; }

.section { margin-bottom: 2rem; }
.section-title {
    font-size: 1.5rem;
    margin-bottom: 1rem;
    padding-bottom: 0.5rem;
    border-bottom: 2px solid var(--border-color);
}

.metrics-grid, .stats-grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
    gap: 1rem;
}

.metric-card, .stat-item {
    border: 1px solid var(--border-color);
    border-radius: 8px;
    padding: 1.5rem;
}

.metric-card.skipped { opacity: 0.5; }
.metric-card h3 { font-size: 0.875rem; color: #64748b; text-transform: uppercase; }
.metric-value, .stat-value { font-size: 2rem; font-weight: bold; margin-bottom: 0.5rem; }
.metric-note { font-size: 0.8rem; color: #64748b; margin-top: 0.5rem; }
.stat-item { text-align: center; }
.stat-label { font-size: 0.875rem; color: #64748b; }

.metric-bar { height: 8px; background: #e2e8f0; border-radius: 4px; overflow: hidden; }
.metric-bar-fill { height: 100%; border-radius: 4px; }
.bar-good { background: #10b981; }
.bar-moderate { background: #f59e0b; }
.bar-poor { background: #ef4444; }

.issues-list { display: flex; flex-direction: column; gap: 0.75rem; }
.issue-card { border: 1px solid var(--border-color); border-radius: 8px; padding: 0.75rem 1rem; }
.issue-header { display: flex; align-items: center; gap: 1rem; flex-wrap: wrap; }
.issue-title { flex: 1; font-weight: 600; }

.severity-badge {
    padding: 0.25rem 0.75rem;
    border-radius: 6px;
    font-size: 0.875rem;
    font-weight: 600;
    color: white;
}
.severity-error { background: #dc2626; }
.severity-warning { background: #ca8a04; }

.category-badge {
    background: #ccfbf1;
    color: #0f766e;
    padding: 0.25rem 0.75rem;
    border-radius: 6px;
    font-size: 0.875rem;
}

.affected-files-label { font-weight: 600; color: #64748b; margin: 0.5rem 0; font-size: 0.875rem; }
.file-item {
    font-family: monospace;
    font-size: 0.875rem;
    color: #64748b;
    padding: 0.4rem;
    background: #f8fafc;
    border-radius: 4px;
    margin-top: 0.25rem;
}

.recommendations { padding-left: 1.5rem; }
.recommendations li { margin-bottom: 0.25rem; }

.footer { text-align: center; padding: 2rem; color: #64748b; border-top: 1px solid var(--border-color); }

@media (max-width: 768px) {
    body { padding: 1rem; }
    .header h1 { font-size: 1.6rem; }
    .grade-badge { width: 80px; height: 80px; line-height: 80px; font-size: 2.25rem; }
}

@media print {
    body { padding: 0; background: white; }
    .container { box-shadow: none; }
    .issue-card { page-break-inside: avoid; }
}
"#;
