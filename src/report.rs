//! CSV export and terminal rendering.
//!
//! Formatting only: every figure shown here was computed elsewhere.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use crate::capacity::{
    header_for_role, role_from_header, CapacityRow, CapacitySummarySheet, CapacityTable,
    InsightsSummary, SummaryValue, FIRST_NAME_COLUMN, INTERNATIONAL_COLUMN, LAST_NAME_COLUMN,
    ROLE_COLUMNS, SALES_COLUMN,
};
use crate::error::CapacityError;
use crate::matrix::RuleSet;
use crate::util::format_number;

// ============================================================================
// CSV
// ============================================================================

/// Column order: names, sales, declared role counts, international tally,
/// then any extra role columns in table order.
pub fn csv_header(table: &CapacityTable) -> Vec<String> {
    let mut header: Vec<String> = vec![
        FIRST_NAME_COLUMN.to_string(),
        LAST_NAME_COLUMN.to_string(),
        SALES_COLUMN.to_string(),
    ];
    header.extend(ROLE_COLUMNS.iter().map(|c| c.to_string()));
    header.push(INTERNATIONAL_COLUMN.to_string());
    header.extend(extra_roles(table).map(header_for_role));
    header
}

fn extra_roles(table: &CapacityTable) -> impl Iterator<Item = &str> {
    table
        .roles
        .iter()
        .map(String::as_str)
        .filter(|role| !ROLE_COLUMNS.contains(&header_for_role(role).as_str()))
}

fn csv_record(table: &CapacityTable, row: &CapacityRow) -> Vec<String> {
    let mut record = vec![
        row.first_name.clone(),
        row.last_name.clone(),
        format_number(row.sales),
    ];
    record.extend(
        ROLE_COLUMNS
            .iter()
            .map(|column| row.count(role_from_header(column)).to_string()),
    );
    record.push(row.international_projects.to_string());
    record.extend(extra_roles(table).map(|role| row.count(role).to_string()));
    record
}

/// Write the table as UTF-8 CSV, header first.
pub fn write_csv<W: Write>(table: &CapacityTable, writer: W) -> Result<(), CapacityError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(csv_header(table))?;
    for row in &table.rows {
        csv.write_record(csv_record(table, row))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the table to `path`, creating parent directories as needed.
pub fn export_csv(path: &Path, table: &CapacityTable) -> Result<(), CapacityError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(table, std::io::BufWriter::new(file))?;
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

/// `capacity_model_YYYY-MM-DD_HH-MM.csv` in local time.
pub fn default_export_filename() -> String {
    format!(
        "capacity_model_{}.csv",
        chrono::Local::now().format("%Y-%m-%d_%H-%M")
    )
}

// ============================================================================
// Terminal text
// ============================================================================

/// `$1,234.50`. Negative amounts keep the sign before the symbol.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// "intl_projects" → "Intl Projects", "sr. prod" → "Sr. Prod".
pub fn title_case(label: &str) -> String {
    label
        .replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn render_insights(summary: &InsightsSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n📊 Capacity Model Insights:");
    let _ = writeln!(out, "Total Sales Reps: {}", summary.total_reps);
    let _ = writeln!(out, "Total Sales: {}", format_currency(summary.total_sales));
    let _ = writeln!(
        out,
        "Average Sales per Rep: {}",
        format_currency(summary.avg_sales)
    );
    let top = &summary.top_performer;
    let _ = writeln!(
        out,
        "Top Performer: {} {} ({})",
        top.first_name,
        top.last_name,
        format_currency(top.sales)
    );

    let _ = writeln!(out, "\nProject Distribution:");
    for total in &summary.project_totals {
        let _ = writeln!(out, "  {}: {}", title_case(&total.label), total.total);
    }

    let _ = writeln!(out, "\nCapacity Distribution:");
    for share in &summary.capacity_distribution {
        let _ = writeln!(out, "  {}: {:.1}%", title_case(&share.role), share.percentage);
    }
    out
}

pub fn render_criteria(rules: &RuleSet) -> String {
    let mut out = String::from("\n📋 Matrix Criteria:\n");
    for rule in rules {
        let _ = writeln!(
            out,
            "  {}: keywords [{}], sales {} to {}",
            rule.role,
            rule.keywords.join(", "),
            format_currency(rule.min_sales),
            format_currency(rule.max_sales)
        );
    }
    out
}

/// First `n` rows as an aligned table.
pub fn render_preview(table: &CapacityTable, n: usize) -> String {
    let header = csv_header(table);
    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(n)
        .map(|row| csv_record(table, row))
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            body.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<String>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = line(&header);
    out.push('\n');
    for record in &body {
        out.push_str(&line(record));
        out.push('\n');
    }
    if table.len() > n {
        let _ = writeln!(out, "... {} more", table.len() - n);
    }
    out
}

pub fn render_summary_sheet(sheet: &CapacitySummarySheet) -> String {
    let mut out = String::from("\n📄 Sheet Summary:\n");
    for (key, value) in &sheet.entries {
        let shown = match value {
            SummaryValue::Integer(n) => n.to_string(),
            SummaryValue::Amount(v) => format_currency(*v),
            SummaryValue::Percentage(v) => format!("{:.1}%", v),
            SummaryValue::Text(s) => s.clone(),
        };
        let _ = writeln!(out, "  {}: {}", key, shown);
    }
    out
}
