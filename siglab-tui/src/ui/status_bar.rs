//! Bottom status bar — key hints plus the last status or error message.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::app::StatusLevel;
use crate::theme::Theme;

pub struct StatusBar<'a> {
    message: Option<&'a (String, StatusLevel)>,
    loading: bool,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(message: Option<&'a (String, StatusLevel)>, loading: bool, theme: &'a Theme) -> Self {
        Self { message, loading, theme }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let t = self.theme;
        let mut spans = vec![Span::styled(" q:Quit r:Reload p:Period", t.muted_style())];
        if self.loading {
            spans.push(Span::styled(" [loading]", Style::default().fg(t.warning)));
        }
        spans.push(Span::raw(" | "));

        if let Some((msg, level)) = self.message {
            let color = match level {
                StatusLevel::Info => t.accent,
                StatusLevel::Warning => t.warning,
                StatusLevel::Error => t.negative,
            };
            spans.push(Span::styled(msg.as_str(), Style::default().fg(color)));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::buffer_text;

    #[test]
    fn error_text_is_shown() {
        let theme = Theme::default();
        let msg = ("Load failed: symbol not found".to_string(), StatusLevel::Error);
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new(Some(&msg), false, &theme).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("q:Quit"));
        assert!(text.contains("symbol not found"));
        assert_eq!(buf.cell((area.x + 1, 0)).map(|c| c.fg), Some(theme.muted));
    }
}
