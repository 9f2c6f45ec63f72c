//! Colour and width handling for table output.

use std::fmt::Display;

use owo_colors::Style;

/// Below this many columns tables collapse to one line per row.
const NARROW_WIDTH: u16 = 80;

/// Whether stdout is a terminal too narrow for the full tables.
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < NARROW_WIDTH)
}

/// How a piece of output stands out from the rest.
#[derive(Debug, Clone, Copy)]
enum Tone {
    /// Placed groups, resolved seats.
    Success,
    /// Unmatched groups, overbooked seats.
    Warning,
    /// Disqualified groups and hints.
    Muted,
}

impl Tone {
    const fn style(self) -> Style {
        match self {
            Self::Success => Style::new().green(),
            Self::Warning => Style::new().yellow(),
            Self::Muted => Style::new().dimmed(),
        }
    }

    fn paint<T: Display + ?Sized>(self, text: &T) -> String {
        if supports_color::on_cached(supports_color::Stream::Stdout).is_some() {
            self.style().style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Extension trait painting anything printable, plain when stdout has no
/// colour support.
pub trait Colorize: Display {
    /// Green.
    fn success(&self) -> String {
        Tone::Success.paint(self)
    }

    /// Yellow.
    fn warning(&self) -> String {
        Tone::Warning.paint(self)
    }

    /// Dimmed.
    fn dim(&self) -> String {
        Tone::Muted.paint(self)
    }
}

impl<T: Display + ?Sized> Colorize for T {}
