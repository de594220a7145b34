use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::api::ExpenseApi;
use crate::cli::Context;
use crate::error::{Result, TallyError};
use crate::export::write_csv;
use crate::filter::ReportFilter;
use crate::fmt::{human_date, money};
use crate::models::{Expense, Insight};
use crate::reports::summarize;
use crate::tui::{terminal_width, wrap_text};

pub fn run(ctx: &Context, filter: ReportFilter, csv: Option<&str>, insights: bool) -> Result<()> {
    let session = ctx.session()?;
    let api = ctx.api()?;
    let all = api.list_expenses(&session.user_id)?;
    let rows = filter.apply(&all);

    println!("{}", format_report(&filter, &rows, ctx.currency()));

    if let Some(path) = csv {
        println!("{}", export_notice(&rows, Path::new(path))?);
    }
    if insights {
        let insight = request_insights(&api, &session.user_id, &all, &filter)?;
        println!("\n{}", format_insight(&insight, terminal_width()));
    }
    Ok(())
}

pub fn insights(ctx: &Context, filter: ReportFilter) -> Result<()> {
    let session = ctx.session()?;
    let api = ctx.api()?;
    let all = api.list_expenses(&session.user_id)?;
    let insight = request_insights(&api, &session.user_id, &all, &filter)?;
    println!("{}", format_insight(&insight, terminal_width()));
    Ok(())
}

pub fn format_report(filter: &ReportFilter, rows: &[Expense], currency: &str) -> String {
    let header = format!("Report: {}", filter.describe());
    if rows.is_empty() {
        let hint = if filter.is_active() {
            "No expenses match this filter."
        } else {
            "No expenses recorded yet."
        };
        return format!("{}\n{hint}", header.bold());
    }

    let s = summarize(rows);
    let highest = s
        .highest
        .as_ref()
        .map(|e| format!("{} ({})", money(currency, e.amount()), e.label()))
        .unwrap_or_else(|| "\u{2014}".to_string());

    let mut table = Table::new();
    table.set_header(vec!["Date", "Item", "Cost"]);
    for e in rows {
        table.add_row(vec![
            Cell::new(human_date(e.parsed_date())),
            Cell::new(e.label()),
            Cell::new(money(currency, e.amount())),
        ]);
    }

    format!(
        "{}\nEntries: {}  Total: {}  Average: {}  Highest: {}\n{table}",
        header.bold(),
        s.count,
        money(currency, s.total),
        money(currency, s.average),
        highest,
    )
}

/// Write the filtered rows to `path`. An empty selection writes nothing and
/// is reported as a notice rather than an error.
pub fn export_notice(rows: &[Expense], path: &Path) -> Result<String> {
    match write_csv(rows, path) {
        Ok(written) => Ok(format!("Wrote {} expenses to {}", rows.len(), written.display())),
        Err(TallyError::EmptyExport) => Ok(TallyError::EmptyExport.to_string().yellow().to_string()),
        Err(e) => Err(e),
    }
}

/// Ask the backend for commentary on the filtered view. Refused locally when
/// the user has nothing recorded at all.
pub fn request_insights<A: ExpenseApi + ?Sized>(
    api: &A,
    user_id: &str,
    all: &[Expense],
    filter: &ReportFilter,
) -> Result<Insight> {
    if all.is_empty() {
        return Err(TallyError::Validation(
            "Add expenses to request insights".into(),
        ));
    }
    let insight = api.insights(user_id, filter)?;
    log::debug!("insight provider: {:?}", insight.provider);
    Ok(insight)
}

pub fn format_insight(insight: &Insight, width: usize) -> String {
    let body = insight.insight.trim();
    let body = if body.is_empty() {
        "The server returned no insight for this selection."
    } else {
        body
    };
    let (wrapped, _) = wrap_text(body, width.saturating_sub(2).max(20));
    let mut out = format!("{}\n{wrapped}", "AI insights".bold());
    if let Some(provider) = insight.provider.as_deref().filter(|p| !p.trim().is_empty()) {
        out.push_str(&format!("\n{}", format!("via {provider}").dimmed()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::filter::parse_day;
    use crate::models::expense;
    use serde_json::json;

    fn sample() -> Vec<Expense> {
        vec![
            expense("1", "2024-01-05", "Coffee", json!(4)),
            expense("2", "2024-01-20", "Tea", json!("3")),
            expense("3", "2024-02-02", "coffee shop", json!(12)),
        ]
    }

    #[test]
    fn test_report_summarises_filtered_rows() {
        let filter = ReportFilter::new(None, None, Some("coffee".into()));
        let text = format_report(&filter, &filter.apply(&sample()), "$");
        assert!(text.contains("matching \"coffee\""));
        assert!(text.contains("Entries: 2"));
        assert!(text.contains("Total: $16.00"));
        assert!(text.contains("Average: $8.00"));
        assert!(text.contains("Highest: $12.00 (coffee shop)"));
        assert!(!text.contains("Tea"));
    }

    #[test]
    fn test_report_empty_states() {
        let filter = ReportFilter::new(Some(parse_day("2030-01-01").unwrap()), None, None);
        assert!(format_report(&filter, &[], "$").contains("No expenses match this filter."));
        assert!(format_report(&ReportFilter::default(), &[], "$").contains("No expenses recorded yet."));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.csv");
        let notice = export_notice(&sample(), &path).unwrap();
        assert!(notice.starts_with("Wrote 3 expenses"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Date,Item,Cost\n01/05/2024,\"Coffee\",4"));
    }

    #[test]
    fn test_export_of_nothing_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let notice = export_notice(&[], &path).unwrap();
        assert!(notice.contains("No expenses to export"));
        assert!(!path.exists());
    }

    #[test]
    fn test_insights_refused_without_expenses() {
        let api = FakeApi::with(Vec::new());
        let err = request_insights(&api, "7", &[], &ReportFilter::default()).unwrap_err();
        assert_eq!(err.to_string(), "Add expenses to request insights");
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_insights_send_filter() {
        let api = FakeApi {
            insight: Insight {
                insight: "Coffee is your biggest habit.".into(),
                provider: Some("gemini".into()),
            },
            ..FakeApi::with(sample())
        };
        let filter = ReportFilter::new(None, None, Some("coffee".into()));
        let insight = request_insights(&api, "7", &sample(), &filter).unwrap();
        assert_eq!(insight.insight, "Coffee is your biggest habit.");
        assert_eq!(
            api.calls(),
            vec![r#"insights 7 {"endDate":"","search":"coffee","startDate":""}"#]
        );
        let text = format_insight(&insight, 80);
        assert!(text.contains("Coffee is your biggest habit."));
        assert!(text.contains("via gemini"));
    }

    #[test]
    fn test_blank_insight_has_placeholder() {
        let text = format_insight(&Insight::default(), 80);
        assert!(text.contains("no insight"));
        assert!(!text.contains("via"));
    }
}
