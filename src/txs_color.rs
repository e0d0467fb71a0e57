// Glyphs and colors for board squares
// Colors are matched to the Windows Terminal (Campbell) look on every terminal

use crate::txs_square::{Square, SquareKind};
use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Terminal color depth, detected once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    TrueColor,
    Ansi256,
    Basic,
}

impl Depth {
    pub fn detect() -> Depth {
        let support = ColorSupport::stdout();
        if support.has_16m {
            Depth::TrueColor
        } else if support.has_256 {
            Depth::Ansi256
        } else {
            Depth::Basic
        }
    }

    /// Map a standard ANSI color to the sampled RGB value or a stable 256 index
    /// Custom RGB or Indexed colors are returned as-is
    pub fn adapt(self, color: Color) -> Color {
        // Format: ((R, G, B), ANSI_256_Index)
        let mapping = match color {
            Color::Black => ((12, 12, 12), 232),
            Color::Red => ((197, 15, 31), 160),
            Color::Green => ((19, 161, 14), 28),
            Color::Yellow => ((193, 156, 0), 178),
            Color::Blue => ((0, 55, 218), 20),
            Color::Magenta => ((136, 23, 152), 90),
            Color::Cyan => ((58, 150, 221), 38),
            Color::Gray => ((204, 204, 204), 250),
            Color::DarkGray => ((118, 118, 118), 243),
            Color::LightRed => ((231, 72, 86), 203),
            Color::LightGreen => ((22, 198, 12), 46),
            Color::LightYellow => ((249, 241, 165), 229),
            Color::LightBlue => ((59, 120, 255), 63),
            Color::LightMagenta => ((180, 0, 158), 163),
            Color::LightCyan => ((97, 214, 214), 116),
            Color::White => ((242, 242, 242), 255),
            _ => return color,
        };

        let ((r, g, b), index256) = mapping;
        match self {
            Depth::TrueColor => Color::Rgb(r, g, b),
            Depth::Ansi256 => Color::Indexed(index256),
            Depth::Basic => color,
        }
    }
}

/// Glyph set and colors used to draw the board
#[derive(Debug, Clone)]
pub struct Palette {
    pub closed: (&'static str, Color),
    pub flag: (&'static str, Color),
    pub mine: (&'static str, Color),
    pub numbers: [Color; 8], // colors for 1..8
    pub board_bg: Color,
    pub highlight_bg: Color, // last chosen square
    pub label_fg: Color,     // column letters and row numbers
    pub error_fg: Color,
    pub warn_fg: Color,
}

impl Palette {
    pub fn new(ascii: bool, depth: Depth) -> Palette {
        let c = |color: Color| depth.adapt(color);
        Palette {
            closed: (if ascii { "?" } else { "■" }, c(Color::Gray)),
            flag: (if ascii { "F" } else { "⚑" }, c(Color::Red)),
            mine: (if ascii { "*" } else { "☼" }, c(Color::Black)),
            numbers: [
                c(Color::LightBlue),
                c(Color::Green),
                c(Color::LightRed),
                c(Color::Blue),
                c(Color::Red),
                c(Color::Cyan),
                c(Color::Black),
                c(Color::Gray),
            ],
            board_bg: c(Color::DarkGray),
            highlight_bg: c(Color::LightBlue),
            label_fg: c(Color::Yellow),
            error_fg: c(Color::Red),
            warn_fg: c(Color::Yellow),
        }
    }

    /// Text and foreground color for one square
    pub fn glyph(&self, sq: &Square) -> (String, Color) {
        if !sq.is_opened() {
            let (s, fg) = if sq.is_flagged() { self.flag } else { self.closed };
            return (s.to_string(), fg);
        }
        match sq.kind() {
            SquareKind::Mine => (self.mine.0.to_string(), self.mine.1),
            SquareKind::Number(n) => (n.to_string(), self.numbers[(n as usize).saturating_sub(1) % 8]),
            SquareKind::Blank => (" ".to_string(), self.board_bg),
        }
    }
}
