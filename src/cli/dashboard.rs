use std::io::IsTerminal;

use colored::Colorize;
use comfy_table::{Cell, Table};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use crate::api::ExpenseApi;
use crate::cli::Context;
use crate::error::Result;
use crate::fmt::{bar, human_date, money, NO_DATE};
use crate::reports::{chart_max, Dashboard};
use crate::tui::{money_span, run_view, View, ViewAction, BAR_STYLE, BOLD, FOOTER_STYLE, HEADER_STYLE};

const TEXT_BAR_WIDTH: usize = 30;

pub fn run(ctx: &Context) -> Result<()> {
    let session = ctx.session()?;
    let api = ctx.api()?;
    let greeting = format!("Welcome back, {}", session.display_name());

    if std::io::stdout().is_terminal() {
        let expenses = api.list_expenses(&session.user_id)?;
        let mut view = DashboardView {
            greeting,
            currency: ctx.currency().to_string(),
            data: Dashboard::from_expenses(&expenses),
        };
        run_view(&mut view)
    } else {
        println!("{}", render_text(&api, &session.user_id, &greeting, ctx.currency())?);
        Ok(())
    }
}

/// Fetch and render as plain text, used when stdout is not a terminal.
pub fn render_text<A: ExpenseApi + ?Sized>(api: &A, user_id: &str, greeting: &str, currency: &str) -> Result<String> {
    let expenses = api.list_expenses(user_id)?;
    Ok(format_dashboard(greeting, &Dashboard::from_expenses(&expenses), currency))
}

// ---------------------------------------------------------------------------
// Plain text
// ---------------------------------------------------------------------------

pub fn format_dashboard(greeting: &str, data: &Dashboard, currency: &str) -> String {
    let s = &data.summary;
    let mut out = format!("{}\n", greeting.bold());

    let mut cards = Table::new();
    cards.set_header(vec!["Total spent", "Average per entry", "Highest expense", "Entries"]);
    let highest = match &s.highest {
        Some(e) => format!("{} ({})", money(currency, e.amount()), e.label()),
        None => NO_DATE.to_string(),
    };
    cards.add_row(vec![
        Cell::new(money(currency, s.total)),
        Cell::new(money(currency, s.average)),
        Cell::new(highest),
        Cell::new(s.count),
    ]);
    out.push_str(&cards.to_string());

    out.push_str("\n\nRecent expenses\n");
    if data.is_empty() {
        out.push_str("No expenses recorded yet.");
    } else {
        let mut recent = Table::new();
        recent.set_header(vec!["Date", "Item", "Cost"]);
        for e in &data.recent {
            recent.add_row(vec![
                Cell::new(human_date(e.parsed_date())),
                Cell::new(e.label()),
                Cell::new(money(currency, e.amount())),
            ]);
        }
        out.push_str(&recent.to_string());
    }

    out.push_str("\n\nMonthly spending\n");
    if data.monthly.is_empty() {
        out.push_str("No dated expenses to chart yet.");
    } else {
        let max = chart_max(&data.monthly);
        let lines: Vec<String> = data
            .monthly
            .iter()
            .map(|m| {
                format!(
                    "{:<8} {:<width$} {}",
                    m.label,
                    bar(m.total, max, TEXT_BAR_WIDTH),
                    money(currency, m.total),
                    width = TEXT_BAR_WIDTH
                )
            })
            .collect();
        out.push_str(&lines.join("\n"));
    }

    out.push_str("\n\nTop categories\n");
    if data.categories.is_empty() {
        out.push_str("No categories yet.");
    } else {
        let max = data.categories.first().map_or(1.0, |c| c.total).max(1.0);
        let name_width = data.categories.iter().map(|c| c.label.chars().count()).max().unwrap_or(5);
        let lines: Vec<String> = data
            .categories
            .iter()
            .map(|c| {
                format!(
                    "{:<name_width$} {:<width$} {}",
                    c.label,
                    bar(c.total, max, TEXT_BAR_WIDTH),
                    money(currency, c.total),
                    width = TEXT_BAR_WIDTH
                )
            })
            .collect();
        out.push_str(&lines.join("\n"));
    }
    out
}

// ---------------------------------------------------------------------------
// Interactive
// ---------------------------------------------------------------------------

struct DashboardView {
    greeting: String,
    currency: String,
    data: Dashboard,
}

impl View for DashboardView {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, sep1, stats_area, sep2, charts_area, sep3, recent_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(7),
                Constraint::Length(1),
            ])
            .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" {}", self.greeting)).style(HEADER_STYLE),
            header_area,
        );

        let sep_line = "\u{2501}".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget.clone(), sep2);
        frame.render_widget(sep_widget, sep3);

        self.draw_stats(frame, stats_area);

        let [chart_left, chart_right] = Layout::horizontal([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .areas(charts_area);
        self.draw_monthly(frame, chart_left);
        self.draw_categories(frame, chart_right);
        self.draw_recent(frame, recent_area);

        frame.render_widget(Paragraph::new(" q=quit").style(FOOTER_STYLE), hints_area);
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => ViewAction::Close,
            _ => ViewAction::Continue,
        }
    }
}

impl DashboardView {
    fn draw_stats(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let s = &self.data.summary;
        let highest = match &s.highest {
            Some(e) => vec![
                Span::raw(" Highest expense     "),
                money_span(&self.currency, e.amount()),
                Span::raw(format!("  {}", e.label())),
            ],
            None => vec![Span::raw(" Highest expense     \u{2014}")],
        };
        let lines = vec![
            Line::from(vec![
                Span::raw(" Total spent         "),
                money_span(&self.currency, s.total),
            ]),
            Line::from(vec![
                Span::raw(" Average per entry   "),
                money_span(&self.currency, s.average),
            ]),
            Line::from(highest),
            Line::from(format!(" Entries             {}", s.count)),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_monthly(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let block = Block::default()
            .title(" Monthly spending")
            .title_style(BOLD)
            .borders(Borders::NONE);

        if self.data.monthly.is_empty() {
            frame.render_widget(
                Paragraph::new(" No dated expenses to chart yet.").style(FOOTER_STYLE).block(block),
                area,
            );
            return;
        }

        let bars: Vec<Bar> = self
            .data
            .monthly
            .iter()
            .map(|m| {
                Bar::default()
                    .value(m.total.max(0.0).round() as u64)
                    .text_value(String::new())
                    .label(Line::from(m.label.clone()))
                    .style(BAR_STYLE)
            })
            .collect();

        let chart = BarChart::default()
            .block(block)
            .bar_width(8)
            .bar_gap(1)
            .max(chart_max(&self.data.monthly).round() as u64)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, area);
    }

    fn draw_categories(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let mut lines = vec![Line::from(Span::styled(" Top categories", BOLD))];
        if self.data.categories.is_empty() {
            lines.push(Line::from(Span::styled(" No categories yet.", FOOTER_STYLE)));
        } else {
            let name_width = self
                .data
                .categories
                .iter()
                .map(|c| c.label.chars().count())
                .max()
                .unwrap_or(10);
            let max = self.data.categories[0].total.max(1.0);
            let bar_width = (area.width as usize).saturating_sub(name_width + 18).clamp(1, 20);
            for c in &self.data.categories {
                lines.push(Line::from(vec![
                    Span::raw(format!(" {:<width$}  ", c.label, width = name_width)),
                    Span::styled(format!("{:<bar_width$} ", bar(c.total, max, bar_width)), BAR_STYLE),
                    money_span(&self.currency, c.total),
                ]));
            }
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_recent(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let mut lines = vec![Line::from(Span::styled(" Recent expenses", BOLD))];
        if self.data.recent.is_empty() {
            lines.push(Line::from(Span::styled(
                " Nothing yet. Add one with `tally add`.",
                FOOTER_STYLE,
            )));
        }
        for e in &self.data.recent {
            lines.push(Line::from(vec![
                Span::raw(format!(" {:<12}{:<30}", human_date(e.parsed_date()), e.label())),
                money_span(&self.currency, e.amount()),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }
}
