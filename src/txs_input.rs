// Prompt input parsing
// Turns typed lines into menu choices, square coordinates, modes and settings

use crate::txs_game::GameSettings;
use thiserror::Error;

/// One letter per column, so the console can address at most a..z
pub const CONSOLE_MAX_WIDTH: usize = 26;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("empty input")]
    Empty,

    #[error("unknown menu option {0:?}")]
    UnknownOption(String),

    #[error("{0:?} is not 0 or a square like a1, b12")]
    BadSquare(String),

    #[error("{0:?} is not o or x")]
    BadMode(String),

    #[error("{0:?} is not a number")]
    NotANumber(String),

    #[error("board width must be at most {max} columns in console mode")]
    TooWide { max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,     // 0
    NewGame,  // 1, default settings
    Settings, // 2, ask for height/width/mines first
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareChoice {
    Back,                         // 0: leave to main menu
    At { row: isize, col: isize }, // <letter><row>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Open,       // o
    ToggleFlag, // x
}

/// Which setting a prompt asks for, in prompt order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    Height,
    Width,
    Mines,
}

impl SettingField {
    pub fn next(self) -> Option<SettingField> {
        match self {
            SettingField::Height => Some(SettingField::Width),
            SettingField::Width => Some(SettingField::Mines),
            SettingField::Mines => None,
        }
    }
}

fn non_empty(input: &str) -> Result<&str, InputError> {
    let s = input.trim();
    if s.is_empty() {
        Err(InputError::Empty)
    } else {
        Ok(s)
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn parse_menu(input: &str) -> Result<MenuChoice, InputError> {
    let s = non_empty(input)?;
    if !all_digits(s) {
        return Err(InputError::NotANumber(s.to_string()));
    }
    match s.trim_start_matches('0') {
        "" => Ok(MenuChoice::Exit),
        "1" => Ok(MenuChoice::NewGame),
        "2" => Ok(MenuChoice::Settings),
        _ => Err(InputError::UnknownOption(s.to_string())),
    }
}

/// Parse "0" or a square such as "c12" (column c, row 12)
pub fn parse_square(input: &str) -> Result<SquareChoice, InputError> {
    let s = non_empty(input)?.to_ascii_lowercase();
    if s == "0" {
        return Ok(SquareChoice::Back);
    }

    let mut chars = s.chars();
    let col = match chars.next() {
        Some(c) if c.is_ascii_lowercase() => column_index(c),
        _ => return Err(InputError::BadSquare(s.clone())),
    };
    let digits = chars.as_str();
    if !all_digits(digits) {
        return Err(InputError::BadSquare(s.clone()));
    }
    // digits only, so the parse can only fail on overflow
    let row = digits
        .parse::<isize>()
        .map_err(|_| InputError::BadSquare(s.clone()))?;

    Ok(SquareChoice::At { row, col })
}

pub fn parse_mode(input: &str) -> Result<Mode, InputError> {
    let s = non_empty(input)?.to_ascii_lowercase();
    match s.as_str() {
        "o" => Ok(Mode::Open),
        "x" => Ok(Mode::ToggleFlag),
        _ => Err(InputError::BadMode(s)),
    }
}

/// Parse one settings value (digits only)
pub fn parse_setting(input: &str) -> Result<usize, InputError> {
    let s = non_empty(input)?;
    if !all_digits(s) {
        return Err(InputError::NotANumber(s.to_string()));
    }
    s.parse::<usize>()
        .map_err(|_| InputError::NotANumber(s.to_string()))
}

/// Reject boards the console cannot address
pub fn check_console_width(settings: &GameSettings) -> Result<(), InputError> {
    if settings.width > CONSOLE_MAX_WIDTH {
        return Err(InputError::TooWide {
            max: CONSOLE_MAX_WIDTH,
        });
    }
    Ok(())
}

/// 'a' => 0, 'b' => 1, ...
pub fn column_index(c: char) -> isize {
    c as isize - 'a' as isize
}

/// 0 => 'a', 1 => 'b', ...; None past 'z'
pub fn column_letter(i: usize) -> Option<char> {
    if i < CONSOLE_MAX_WIDTH {
        Some((b'a' + i as u8) as char)
    } else {
        None
    }
}
