//! RSI panel — RSI line on a fixed 0-100 axis with oversold/overbought guides.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};

use siglab_core::{BacktestFrame, SignalParams};

use crate::theme::Theme;

pub struct RsiChart<'a> {
    frame: &'a BacktestFrame,
    bands: SignalParams,
    theme: &'a Theme,
}

impl<'a> RsiChart<'a> {
    pub fn new(frame: &'a BacktestFrame, bands: SignalParams, theme: &'a Theme) -> Self {
        Self { frame, bands, theme }
    }

    fn points(&self) -> Vec<(f64, f64)> {
        self.frame
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.signal.indicators.rsi.map(|v| (i as f64, v)))
            .collect()
    }
}

impl Widget for RsiChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rsi = self.points();
        let x_max = self.frame.len().saturating_sub(1).max(1) as f64;
        let oversold = [(0.0, self.bands.rsi_oversold), (x_max, self.bands.rsi_oversold)];
        let overbought = [(0.0, self.bands.rsi_overbought), (x_max, self.bands.rsi_overbought)];

        let title = match self.frame.last().and_then(|r| r.signal.indicators.rsi) {
            Some(v) => Span::styled(
                format!(" RSI {v:.1} "),
                Style::default().fg(self.theme.rsi_color(v, self.bands.rsi_oversold, self.bands.rsi_overbought)),
            ),
            None => Span::styled(" RSI n/a ", self.theme.muted_style()),
        };

        let datasets = vec![
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(self.theme.warning))
                .data(&overbought),
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(self.theme.muted))
                .data(&oversold),
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(self.theme.accent))
                .data(&rsi),
        ];

        Chart::new(datasets)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(self.theme.border_style())
                    .style(Style::default().bg(self.theme.background)),
            )
            .x_axis(Axis::default().style(self.theme.muted_style()).bounds([0.0, x_max]))
            .y_axis(
                Axis::default()
                    .style(self.theme.muted_style())
                    .bounds([0.0, 100.0])
                    .labels(vec![
                        Span::raw("0"),
                        Span::raw(format!("{:.0}", self.bands.rsi_oversold)),
                        Span::raw(format!("{:.0}", self.bands.rsi_overbought)),
                        Span::raw("100"),
                    ]),
            )
            .render(area, buf);
    }
}
