//! Table of the most recent rows: indicators, signal, position, PnL.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use siglab_core::{BacktestRow, SignalParams};

use crate::theme::Theme;

const HEADERS: [&str; 8] = ["Date", "Close", "Short MA", "Long MA", "RSI", "Signal", "Pos", "Cum PnL"];

pub struct SignalTable<'a> {
    rows: &'a [BacktestRow],
    bands: SignalParams,
    theme: &'a Theme,
}

impl<'a> SignalTable<'a> {
    /// `rows` is shown oldest first.
    pub fn new(rows: &'a [BacktestRow], bands: SignalParams, theme: &'a Theme) -> Self {
        Self { rows, bands, theme }
    }

    fn row(&self, r: &BacktestRow) -> Row<'static> {
        let t = self.theme;
        let ind = &r.signal.indicators;
        let num = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        let rsi_cell = match ind.rsi {
            Some(v) => Cell::from(Span::styled(
                format!("{v:.1}"),
                Style::default().fg(t.rsi_color(v, self.bands.rsi_oversold, self.bands.rsi_overbought)),
            )),
            None => Cell::from(Span::styled("-", t.muted_style())),
        };

        Row::new(vec![
            Cell::from(ind.date.to_string()),
            Cell::from(format!("{:.2}", ind.close)),
            Cell::from(num(ind.short_ma)),
            Cell::from(num(ind.long_ma)),
            rsi_cell,
            Cell::from(Span::styled(
                r.signal.signal.label(),
                Style::default().fg(t.signal_color(r.signal.signal)),
            )),
            Cell::from(r.position.to_string()),
            Cell::from(Span::styled(
                format!("{:+.2}", r.cumulative_pnl),
                Style::default().fg(t.pnl_color(r.cumulative_pnl)),
            )),
        ])
    }
}

impl Widget for SignalTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let header = Row::new(HEADERS.map(Cell::from))
            .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = self.rows.iter().map(|r| self.row(r)).collect();
        let widths = [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Length(10),
        ];

        Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .style(Style::default().fg(self.theme.text_primary))
            .block(
                Block::default()
                    .title(format!(" Latest {} rows ", self.rows.len()))
                    .title_style(self.theme.title_style())
                    .borders(Borders::ALL)
                    .border_style(self.theme.border_style()),
            )
            .render(area, buf);
    }
}
