// Single cell of the minefield
// Holds what the cell contains and whether the player opened or flagged it

use thiserror::Error;

/// Rejected square transitions
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareError {
    #[error("Square has been opened")]
    AlreadyOpened,

    #[error("Square has been flagged, remove the flag before opening it")]
    Flagged,

    #[error("Square's value must be from 1 to 8, got {0}")]
    WrongValue(u8),
}

/// What a cell holds once the grid is generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareKind {
    Mine,
    Number(u8), // 1..=8 adjacent mines
    Blank,      // no adjacent mines
}

impl SquareKind {
    /// Build the label for a non-mine cell from its adjacent mine count
    pub fn from_adjacent(n: u8) -> Result<Self, SquareError> {
        match n {
            0 => Ok(SquareKind::Blank),
            1..=8 => Ok(SquareKind::Number(n)),
            _ => Err(SquareError::WrongValue(n)),
        }
    }

    pub fn is_mine(self) -> bool {
        matches!(self, SquareKind::Mine)
    }

    pub fn is_blank(self) -> bool {
        matches!(self, SquareKind::Blank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    kind: SquareKind,
    opened: bool,
    flagged: bool,
}

impl Square {
    pub fn new(kind: SquareKind) -> Self {
        Square {
            kind,
            opened: false,
            flagged: false,
        }
    }

    pub fn kind(&self) -> SquareKind {
        self.kind
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Open the square
    /// Fails if it is already open or currently flagged
    pub fn open(&mut self) -> Result<(), SquareError> {
        if self.opened {
            return Err(SquareError::AlreadyOpened);
        }
        if self.flagged {
            return Err(SquareError::Flagged);
        }
        self.opened = true;
        Ok(())
    }

    /// Flip the flag on a closed square
    pub fn toggle_flag(&mut self) -> Result<(), SquareError> {
        if self.opened {
            return Err(SquareError::AlreadyOpened);
        }
        self.flagged = !self.flagged;
        Ok(())
    }

    // Used to show the whole field after a loss; a flagged square stays closed.
    pub(crate) fn expose(&mut self) {
        if !self.flagged {
            self.opened = true;
        }
    }
}
