//! Price panel — close with short/long MA overlays and BUY/SELL markers.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};

use siglab_core::{BacktestFrame, Signal};

use crate::theme::Theme;

pub struct PriceChart<'a> {
    frame: &'a BacktestFrame,
    theme: &'a Theme,
}

impl<'a> PriceChart<'a> {
    pub fn new(frame: &'a BacktestFrame, theme: &'a Theme) -> Self {
        Self { frame, theme }
    }

    /// (x, close) for every bar carrying `signal`.
    fn markers(&self, signal: Signal) -> Vec<(f64, f64)> {
        self.frame
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.signal.signal == signal)
            .map(|(i, r)| (i as f64, r.close()))
            .collect()
    }

    fn series(&self, pick: impl Fn(&siglab_core::BacktestRow) -> Option<f64>) -> Vec<(f64, f64)> {
        self.frame
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(i, r)| pick(r).map(|v| (i as f64, v)))
            .collect()
    }
}

impl Widget for PriceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let close = self.series(|r| Some(r.close()));
        let short_ma = self.series(|r| r.signal.indicators.short_ma);
        let long_ma = self.series(|r| r.signal.indicators.long_ma);
        let buys = self.markers(Signal::Buy);
        let sells = self.markers(Signal::Sell);

        let (y_min, y_max) = close
            .iter()
            .chain(&short_ma)
            .chain(&long_ma)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, v)| (lo.min(v), hi.max(v)));
        let (y_lower, y_upper) = if close.is_empty() {
            (0.0, 1.0)
        } else {
            let range = y_max - y_min;
            let pad = if range > 0.0 { range * 0.05 } else { y_max.abs().max(1.0) * 0.05 };
            (y_min - pad, y_max + pad)
        };
        let x_max = self.frame.len().saturating_sub(1).max(1) as f64;

        let datasets = vec![
            Dataset::default()
                .name("Close")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(self.theme.accent))
                .data(&close),
            Dataset::default()
                .name("Short MA")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(self.theme.warning))
                .data(&short_ma),
            Dataset::default()
                .name("Long MA")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(self.theme.neutral))
                .data(&long_ma),
            Dataset::default()
                .name(format!("BUY ({})", buys.len()))
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(self.theme.positive).add_modifier(Modifier::BOLD))
                .data(&buys),
            Dataset::default()
                .name(format!("SELL ({})", sells.len()))
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(self.theme.negative).add_modifier(Modifier::BOLD))
                .data(&sells),
        ];

        let rows = self.frame.rows();
        let x_labels = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => vec![
                Span::raw(first.signal.indicators.date.to_string()),
                Span::raw(last.signal.indicators.date.to_string()),
            ],
            _ => vec![],
        };
        let y_labels = vec![
            Span::raw(format!("{y_lower:.1}")),
            Span::raw(format!("{:.1}", (y_lower + y_upper) / 2.0)),
            Span::raw(format!("{y_upper:.1}")),
        ];

        Chart::new(datasets)
            .block(
                Block::default()
                    .title(format!(" {} | Price ", self.frame.symbol))
                    .title_style(self.theme.title_style())
                    .borders(Borders::ALL)
                    .border_style(self.theme.border_style())
                    .style(Style::default().bg(self.theme.background)),
            )
            .x_axis(
                Axis::default()
                    .style(self.theme.muted_style())
                    .bounds([0.0, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .style(self.theme.muted_style())
                    .bounds([y_lower, y_upper])
                    .labels(y_labels),
            )
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
            .render(area, buf);
    }
}
