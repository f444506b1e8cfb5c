use std::fmt;
use std::str::FromStr;

use reversi_core::{ReversiError, Result};

use crate::board::MAX_SIZE;

/// An Othello action: place a disc on a cell, or pass.
///
/// As a flat index (see [`Action::index`]) a placement is its cell
/// (`row * N + col`) and a pass is the sentinel `N²`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Action {
    Place(u8),
    Pass,
}

impl Action {
    /// The cell of a placement, or None for a pass
    #[inline]
    pub fn cell(self) -> Option<usize> {
        match self {
            Action::Place(cell) => Some(cell as usize),
            Action::Pass => None,
        }
    }

    #[inline]
    pub fn is_pass(self) -> bool {
        self == Action::Pass
    }

    /// Flat index on an N x N board; the pass sentinel is `N²`.
    #[inline]
    pub fn index(self, size: usize) -> usize {
        match self {
            Action::Place(cell) => cell as usize,
            Action::Pass => size * size,
        }
    }

    /// Inverse of [`Action::index`]. Returns None past the pass sentinel
    /// and for sizes no board supports.
    pub fn from_index(index: usize, size: usize) -> Option<Self> {
        if size > MAX_SIZE {
            return None;
        }
        let cells = size * size;
        if index < cells {
            Some(Action::Place(index as u8))
        } else if index == cells {
            Some(Action::Pass)
        } else {
            None
        }
    }

    /// Algebraic coordinate on an N x N board: column letter, then 1-based row.
    ///
    /// Cell 19 on 8x8 is `d3`.
    pub fn to_coord(self, size: usize) -> String {
        match self {
            Action::Place(cell) => {
                let cell = cell as usize;
                let col = (b'a' + (cell % size) as u8) as char;
                format!("{}{}", col, cell / size + 1)
            }
            Action::Pass => "pass".to_string(),
        }
    }

    /// Parse `pass` or an algebraic coordinate such as `d3`.
    ///
    /// # Errors
    /// Returns `ReversiError::InvalidAction` for text that is neither, or for
    /// a coordinate off an N x N board.
    pub fn parse(text: &str, size: usize) -> Result<Self> {
        let text = text.trim().to_ascii_lowercase();
        if text == "pass" {
            return Ok(Action::Pass);
        }

        let invalid = || ReversiError::InvalidAction(format!("'{}' on a {}x{} board", text, size, size));
        let mut chars = text.chars();
        let col = chars.next().ok_or_else(invalid)?;
        if !col.is_ascii_lowercase() {
            return Err(invalid());
        }
        let col = (col as u8 - b'a') as usize;
        let row: usize = chars.as_str().parse().map_err(|_| invalid())?;
        if col >= size || row == 0 || row > size {
            return Err(invalid());
        }
        Ok(Action::Place(((row - 1) * size + col) as u8))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Place(cell) => write!(f, "cell {}", cell),
            Action::Pass => write!(f, "pass"),
        }
    }
}

/// Parses the bare flat-index form: a cell number or `pass`.
impl FromStr for Action {
    type Err = ReversiError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pass") {
            return Ok(Action::Pass);
        }
        s.parse::<u8>()
            .map(Action::Place)
            .map_err(|_| ReversiError::InvalidAction(s.to_string()))
    }
}
