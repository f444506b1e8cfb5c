use std::fmt;

/// One of the two sides. Black moves first from the standard start.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Player {
    Black = 0,
    White = 1,
}

impl Player {
    /// Both players, Black first
    pub const ALL: [Player; 2] = [Player::Black, Player::White];

    /// Returns the other player
    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Returns the index (0 for Black, 1 for White)
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Diagram symbol for this player's discs
    #[inline]
    pub const fn symbol(self) -> char {
        match self {
            Player::Black => 'B',
            Player::White => 'W',
        }
    }

    /// Parses a diagram symbol (`B`/`X`/`*` for Black, `W`/`O` for White)
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            'B' | 'b' | 'X' | 'x' | '*' => Some(Player::Black),
            'W' | 'w' | 'O' | 'o' => Some(Player::White),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "Black"),
            Player::White => write!(f, "White"),
        }
    }
}
