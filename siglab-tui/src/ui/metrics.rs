//! Metrics row — trades, win rate, total PnL, position, latest signal.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use siglab_runner::BacktestReport;

use crate::theme::Theme;

pub struct MetricsBar<'a> {
    report: &'a BacktestReport,
    theme: &'a Theme,
}

impl<'a> MetricsBar<'a> {
    pub fn new(report: &'a BacktestReport, theme: &'a Theme) -> Self {
        Self { report, theme }
    }

    fn spans(&self) -> Vec<Span<'static>> {
        let s = &self.report.summary;
        let t = self.theme;
        let label = |text: &'static str| Span::styled(text, t.muted_style());
        let signal = self.report.latest_signal();
        let position = self.report.frame.last().map_or(0, |r| r.position);

        let win_rate = if s.degenerate {
            Span::styled("n/a (no trades)", Style::default().fg(t.warning))
        } else {
            Span::styled(format!("{:.1}%", s.win_rate), Style::default().fg(t.win_rate_color(s.win_rate)))
        };

        vec![
            label(" Trades "),
            Span::styled(s.trade_count.to_string(), Style::default().fg(t.text_primary)),
            label("   Win rate "),
            win_rate,
            label("   Total PnL "),
            Span::styled(format!("{:+.2}", s.total_pnl), Style::default().fg(t.pnl_color(s.total_pnl))),
            label("   Position "),
            Span::styled(position.to_string(), Style::default().fg(t.text_primary)),
            label("   Latest "),
            Span::styled(
                signal.label(),
                Style::default().fg(t.signal_color(signal)).add_modifier(Modifier::BOLD),
            ),
        ]
    }
}

impl Widget for MetricsBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Backtest ")
            .title_style(self.theme.title_style())
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());
        Paragraph::new(Line::from(self.spans())).block(block).render(area, buf);
    }
}
