use std::convert::Infallible;
use std::io::{self, Write};

use smart_leds::RGB8;

use crate::RingDisplay;
use crate::ring::RingFrame;

/// LEDs drawn per terminal row.
const LEDS_PER_ROW: usize = 25;

/// Terminal-based ring display for development and testing.
///
/// Renders a [`RingFrame`] as rows of true-colour cells in LED order,
/// with a caret under the current-time LED.
#[derive(Debug, Default)]
pub struct TerminalDisplay;

impl TerminalDisplay {
    /// Create a new terminal display.
    pub fn new() -> Self {
        Self
    }
}

/// Error type for terminal display operations.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("failed to write to terminal: {0}")]
    Io(#[from] io::Error),
}

impl RingDisplay for TerminalDisplay {
    type Error = DisplayError;

    fn show(&mut self, frame: &RingFrame) -> Result<(), Self::Error> {
        render_frame(&mut io::stdout(), frame)
    }
}

/// Render a frame to any writer. Extracted for testability.
fn render_frame(w: &mut impl Write, frame: &RingFrame) -> Result<(), DisplayError> {
    let pixels = frame.pixels();
    for (row, chunk) in pixels.chunks(LEDS_PER_ROW).enumerate() {
        let first = row * LEDS_PER_ROW;
        write!(w, "{first:>4} ")?;
        for color in chunk {
            write!(w, "{}", format_cell(*color))?;
        }
        writeln!(w)?;

        let now = frame.now_index();
        if (first..first + chunk.len()).contains(&now) {
            writeln!(w, "     {}^ now", "  ".repeat(now - first))?;
        }
    }
    w.flush()?;
    Ok(())
}

/// A two-character cell with the LED colour as its background.
fn format_cell(color: RGB8) -> String {
    format!("\x1b[48;2;{};{};{}m  \x1b[0m", color.r, color.g, color.b)
}

/// Keeps every frame it is shown, for assertions in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    frames: Vec<RingFrame>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[RingFrame] {
        &self.frames
    }

    /// Most recently committed frame, i.e. what the ring currently shows.
    pub fn current(&self) -> Option<&RingFrame> {
        self.frames.last()
    }
}

impl RingDisplay for RecordingDisplay {
    type Error = Infallible;

    fn show(&mut self, frame: &RingFrame) -> Result<(), Self::Error> {
        self.frames.push(frame.clone());
        Ok(())
    }
}
