//! Top-level UI layout — header, price and RSI charts, metrics, table,
//! status bar.

pub mod metrics;
pub mod price_chart;
pub mod rsi_chart;
pub mod signal_table;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme::Theme;

use self::metrics::MetricsBar;
use self::price_chart::PriceChart;
use self::rsi_chart::RsiChart;
use self::signal_table::SignalTable;
use self::status_bar::StatusBar;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState, theme: &Theme) {
    let table_height = app.table_rows as u16 + 3;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(8),
            Constraint::Length(3),
            Constraint::Length(table_height),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(header(app, theme), chunks[0]);

    match &app.report {
        Some(report) => {
            let bands = report.params.signals;
            f.render_widget(PriceChart::new(&report.frame, theme), chunks[1]);
            f.render_widget(RsiChart::new(&report.frame, bands, theme), chunks[2]);
            f.render_widget(MetricsBar::new(report, theme), chunks[3]);
            f.render_widget(SignalTable::new(report.frame.tail(app.table_rows), bands, theme), chunks[4]);
        }
        None => render_empty(f, chunks[1].union(chunks[4]), app, theme),
    }

    f.render_widget(StatusBar::new(app.status_message.as_ref(), app.loading, theme), chunks[5]);
}

fn header<'a>(app: &'a AppState, theme: &Theme) -> Paragraph<'a> {
    let data = &app.config.data;
    let mut spans = vec![
        Span::styled(" Siglab ", Style::default().fg(theme.background).bg(theme.accent).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(data.symbol.as_str(), theme.title_style()),
        Span::styled(format!("  period {}", data.period), Style::default().fg(theme.text_primary)),
        Span::styled(format!("  source {}", data.source.label()), theme.muted_style()),
    ];
    if let Some(report) = &app.report {
        spans.push(Span::styled(
            format!("  {} → {} ({} bars)", report.start_date, report.end_date, report.bar_count()),
            Style::default().fg(theme.text_secondary),
        ));
    }
    Paragraph::new(Line::from(spans))
}

fn render_empty(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let msg = if app.loading {
        "Loading price history..."
    } else {
        "No data loaded. Press r to load, p to change the period."
    };
    let lines = vec![Line::from(""), Line::from(Span::styled(msg, theme.muted_style()))];
    let block = Block::default().borders(Borders::ALL).border_style(theme.border_style());
    f.render_widget(Paragraph::new(lines).block(block), area);
}
