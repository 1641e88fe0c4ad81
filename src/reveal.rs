//! Typewriter reveal of a SQL string.
//!
//! [`Reveal`] is the pure half of the animation: it tracks how much of the
//! text is visible and produces the markup for each tick. The controller
//! owns the timer that drives it.

use std::time::Duration;

use crate::config::TypingConfig;
use crate::highlight::highlight_markup;

/// Markup produced by one tick of a [`Reveal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Highlighted prefix; more ticks follow
    Partial(String),
    /// Highlighted full text; the reveal is over
    Complete(String),
}

/// Progress through one SQL string, counted in characters.
#[derive(Debug, Clone)]
pub struct Reveal {
    text: String,
    position: usize,
    total: usize,
}

impl Reveal {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let total = text.chars().count();
        Self {
            text,
            position: 0,
            total,
        }
    }

    /// Characters revealed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Length of the full text in characters.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn is_complete(&self) -> bool {
        self.position >= self.total
    }

    /// The revealed prefix.
    pub fn visible(&self) -> &str {
        let end = self
            .text
            .char_indices()
            .nth(self.position)
            .map_or(self.text.len(), |(i, _)| i);
        &self.text[..end]
    }

    /// Reveal one more character.
    ///
    /// The final frame re-highlights the whole text rather than the last
    /// prefix, so partial-match artifacts never survive the animation.
    pub fn tick(&mut self) -> Frame {
        self.position = (self.position + 1).min(self.total);
        if self.is_complete() {
            Frame::Complete(highlight_markup(&self.text))
        } else {
            Frame::Partial(highlight_markup(self.visible()))
        }
    }
}

/// Per-character delay: `len / length_divisor` milliseconds, clamped to the
/// configured bounds.
pub fn typing_interval(char_count: usize, config: &TypingConfig) -> Duration {
    let millis = (char_count as f64 / config.length_divisor)
        .clamp(config.min_interval_ms, config.max_interval_ms);
    Duration::from_micros((millis * 1000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_interval_is_clamped() {
        let config = TypingConfig::default();
        assert_eq!(typing_interval(0, &config), Duration::from_millis(15));
        assert_eq!(typing_interval(100, &config), Duration::from_millis(15));
        assert_eq!(typing_interval(500, &config), Duration::from_millis(25));
        assert_eq!(typing_interval(5000, &config), Duration::from_millis(40));
    }

    #[test]
    fn test_reveal_ticks_through_text() {
        let mut reveal = Reveal::new("SELECT 1");
        assert_eq!(reveal.len(), 8);

        assert_eq!(reveal.tick(), Frame::Partial("S".to_string()));
        for _ in 0..5 {
            reveal.tick();
        }
        assert_eq!(reveal.visible(), "SELECT");
        assert_eq!(
            reveal.tick(),
            Frame::Partial("<span class=\"sql-keyword\">SELECT</span> ".to_string())
        );
        assert_eq!(
            reveal.tick(),
            Frame::Complete(
                "<span class=\"sql-keyword\">SELECT</span> <span class=\"sql-number\">1</span>"
                    .to_string()
            )
        );
        assert!(reveal.is_complete());
    }

    #[test]
    fn test_empty_text_completes_on_first_tick() {
        let mut reveal = Reveal::new("");
        assert!(reveal.is_empty());
        assert_eq!(reveal.tick(), Frame::Complete(String::new()));
    }

    #[test]
    fn test_multibyte_characters_are_revealed_whole() {
        let mut reveal = Reveal::new("é'ü'");
        reveal.tick();
        assert_eq!(reveal.visible(), "é");
        reveal.tick();
        reveal.tick();
        assert_eq!(reveal.visible(), "é'ü");
    }

    #[test]
    fn test_ticks_past_end_stay_complete() {
        let mut reveal = Reveal::new("AS");
        reveal.tick();
        reveal.tick();
        assert!(matches!(reveal.tick(), Frame::Complete(_)));
        assert_eq!(reveal.position(), 2);
    }
}
