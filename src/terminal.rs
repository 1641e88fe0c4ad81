//! Terminal playback of the demo for the native binary.
//!
//! The player drives a real [`DemoController`] on an in-memory page and
//! redraws the terminal whenever the code display changes.

use std::io::{self, Write};
use std::time::Duration;

use qw_dom::{Document, Element, ManualScheduler, MemoryDocument};
use web_time::Instant;

use crate::constants::{MAX_COMPLEXITY, class, dom};
use crate::controller::DemoController;
use crate::highlight::{Fragment, Highlighted, TokenClass, highlight};

const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Gives up on a reveal that has not finished after this many frames.
const MAX_FRAMES_PER_ROUND: usize = 100_000;

/// ANSI escape that starts the colour of `class`.
pub fn ansi_color(class: TokenClass) -> &'static str {
    match class {
        TokenClass::String => "\x1b[32m",
        TokenClass::Keyword => "\x1b[34m",
        TokenClass::Function => "\x1b[33m",
        TokenClass::Number => "\x1b[35m",
    }
}

/// Render highlighted SQL with ANSI colours. Closing a nested span restores
/// the colour of the enclosing one.
pub fn to_ansi(highlighted: &Highlighted) -> String {
    let mut out = String::new();
    let mut colors = Vec::new();
    for fragment in highlighted.fragments() {
        write_ansi(fragment, &mut colors, &mut out);
    }
    out
}

fn write_ansi(fragment: &Fragment, colors: &mut Vec<&'static str>, out: &mut String) {
    match fragment {
        Fragment::Text(text) => out.push_str(text),
        Fragment::Span { class, children } => {
            let color = ansi_color(*class);
            colors.push(color);
            out.push_str(color);
            for child in children {
                write_ansi(child, colors, out);
            }
            colors.pop();
            out.push_str(colors.last().copied().unwrap_or(RESET));
        }
    }
}

type NativeDemo = DemoController<MemoryDocument, ManualScheduler>;

/// Plays the demo into a writer.
pub struct TerminalPlayer<W: Write> {
    out: W,
    frame: Duration,
    pause: Duration,
    realtime: bool,
}

impl<W: Write> TerminalPlayer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            frame: Duration::from_millis(16),
            pause: Duration::from_millis(1500),
            realtime: true,
        }
    }

    /// Virtual time advanced per redraw check.
    pub fn with_frame(mut self, frame: Duration) -> Self {
        self.frame = frame;
        self
    }

    /// Hold between examples.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// When false, virtual time runs without sleeping.
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Show `rounds` examples, starting with the one already on screen.
    pub fn play(&mut self, demo: &NativeDemo, rounds: usize) -> io::Result<()> {
        let started = Instant::now();
        let doc = demo.document();
        let scheduler = demo.scheduler();

        for round in 0..rounds {
            if round > 0 && !demo.advance() {
                log::warn!("Demo refused to advance in round {}", round);
                break;
            }

            let Some(code) = doc.element_by_id(dom::CODE_ID) else {
                log::warn!("No code display, nothing to play");
                break;
            };

            let mut shown = None;
            for _ in 0..MAX_FRAMES_PER_ROUND {
                let sql = code.text_content();
                if shown.as_ref() != Some(&sql) {
                    self.draw(demo, &sql, false)?;
                    shown = Some(sql);
                }
                if !demo.is_typing() {
                    break;
                }
                self.tick(scheduler, self.frame);
            }

            let success = doc.element_by_id(dom::SUCCESS_ID);
            let limit = demo.config().timing.success_delay(false) + self.frame;
            let mut waited = Duration::ZERO;
            while let Some(indicator) = &success {
                if indicator.has_class(class::SHOW) || waited > limit {
                    break;
                }
                self.tick(scheduler, self.frame);
                waited += self.frame;
            }

            self.draw(demo, &code.text_content(), true)?;
            self.tick(scheduler, self.pause);
        }

        log::info!("Played {} examples in {:.1?}", rounds, started.elapsed());
        Ok(())
    }

    fn tick(&self, scheduler: &ManualScheduler, by: Duration) {
        scheduler.advance(by);
        if self.realtime {
            std::thread::sleep(by);
        }
    }

    fn draw(&mut self, demo: &NativeDemo, sql: &str, finished: bool) -> io::Result<()> {
        let doc = demo.document();
        let question = doc
            .query_selector(dom::QUESTION_SELECTOR)
            .map(|q| q.text_content())
            .unwrap_or_default();
        let filled = doc
            .query_selector_all(dom::COMPLEXITY_DOT_SELECTOR)
            .iter()
            .filter(|dot| dot.has_class(class::FILLED))
            .count();
        let dots: String = (0..usize::from(MAX_COMPLEXITY))
            .map(|i| if i < filled { '●' } else { '○' })
            .collect();

        write!(self.out, "{}", CLEAR_SCREEN)?;
        writeln!(self.out, "QueryWeaver demo  [{}]", demo.current_index() + 1)?;
        writeln!(self.out)?;
        writeln!(self.out, "  Q: {}", question)?;
        writeln!(self.out, "  Complexity: {}", dots)?;
        writeln!(self.out)?;
        writeln!(self.out, "{}", to_ansi(&highlight(sql)))?;
        if finished {
            writeln!(self.out)?;
            writeln!(self.out, "  \x1b[32m✓ Query generated{}", RESET)?;
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::LogSink;
    use crate::catalog::EXAMPLES;
    use crate::config::DemoConfig;
    use crate::landing::demo_page;
    use crate::page::boot;
    use std::rc::Rc;

    #[test]
    fn test_ansi_nested_colors_restore() {
        let out = to_ansi(&highlight("COUNT(x)"));
        assert_eq!(out, "\x1b[34m\x1b[33mCOUNT\x1b[34m\x1b[0m(x)");
    }

    #[test]
    fn test_ansi_keeps_text() {
        let out = to_ansi(&highlight("a < 'b'"));
        assert_eq!(out, "a < \x1b[32m'b'\x1b[0m");
    }

    #[test]
    fn test_player_shows_every_example() {
        let demo = boot(
            demo_page(),
            ManualScheduler::new(),
            DemoConfig::default(),
            Rc::new(LogSink),
        );

        let mut player = TerminalPlayer::new(Vec::new())
            .with_realtime(false)
            .with_frame(Duration::from_millis(10))
            .with_pause(Duration::from_millis(100));
        player.play(&demo, EXAMPLES.len()).unwrap();

        let output = String::from_utf8(player.into_inner()).unwrap();
        for example in EXAMPLES.iter() {
            assert!(output.contains(example.question));
            assert!(output.contains(&to_ansi(&highlight(example.sql))));
        }
        assert_eq!(output.matches("Query generated").count(), EXAMPLES.len());
        assert_eq!(demo.current_index(), EXAMPLES.len() - 1);
        assert!(!demo.is_typing());
    }
}
