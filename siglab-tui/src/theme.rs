//! Parrot/neon theme tokens for the Siglab dashboard.
//!
//! # Color Palette
//! - **Background**: deep charcoal
//! - **Accent**: electric cyan (price, focus)
//! - **Positive**: neon green (gains, BUY)
//! - **Negative**: hot pink (losses, SELL)
//! - **Warning**: neon orange (RSI bands, degenerate stats)
//! - **Neutral**: cool purple (long MA, HOLD)
//! - **Muted**: steel blue (axes, secondary text)

use ratatui::style::{Color, Modifier, Style};

use siglab_core::Signal;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Green at or above zero, pink below.
    pub fn pnl_color(&self, value: f64) -> Color {
        if value >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }

    /// Win rate is a percentage in [0, 100].
    pub fn win_rate_color(&self, win_rate: f64) -> Color {
        match win_rate {
            w if w >= 70.0 => self.positive,
            w if w >= 50.0 => self.accent,
            w if w >= 40.0 => self.neutral,
            _ => self.warning,
        }
    }

    pub fn signal_color(&self, signal: Signal) -> Color {
        match signal {
            Signal::Buy => self.positive,
            Signal::Sell => self.negative,
            Signal::Hold => self.text_secondary,
        }
    }

    /// Overbought is warm, oversold is cool, in between is plain text.
    pub fn rsi_color(&self, rsi: f64, oversold: f64, overbought: f64) -> Color {
        if rsi >= overbought {
            self.negative
        } else if rsi <= oversold {
            self.positive
        } else {
            self.text_primary
        }
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.muted)
    }
}
