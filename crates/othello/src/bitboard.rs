use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// A 128-bit set of cells on an N x N board (N <= 10).
/// Bit `i` is cell `i` in row-major order (`row * N + col`).
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Bitboard(pub u128);

impl Bitboard {
    /// Empty bitboard (no cells set)
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Creates a bitboard from a raw u128
    #[inline]
    pub const fn new(bits: u128) -> Self {
        Bitboard(bits)
    }

    /// Bitboard with only `cell` set
    #[inline]
    pub const fn from_cell(cell: usize) -> Self {
        Bitboard(1u128 << cell)
    }

    /// Returns true if no cells are set
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if any cells are set
    #[inline]
    pub const fn is_not_empty(self) -> bool {
        self.0 != 0
    }

    /// Returns true if the given cell is set
    #[inline]
    pub const fn contains(self, cell: usize) -> bool {
        cell < 128 && (self.0 >> cell) & 1 == 1
    }

    /// Sets the given cell
    #[inline]
    pub fn set(&mut self, cell: usize) {
        self.0 |= 1u128 << cell;
    }

    /// Clears the given cell
    #[inline]
    pub fn clear(&mut self, cell: usize) {
        self.0 &= !(1u128 << cell);
    }

    /// Returns the number of set cells
    #[inline]
    pub const fn popcount(self) -> u32 {
        self.0.count_ones()
    }

    /// Pops and returns the lowest set cell, clearing it
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let cell = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(cell)
    }

    /// Returns an iterator over all set cells, lowest first
    #[inline]
    pub fn iter(self) -> BitboardIter {
        BitboardIter(self)
    }
}

/// Edge masks for one board size.
///
/// Shifting a bitboard by one column wraps discs from one edge of a row onto
/// the opposite edge of the neighbouring row; these masks cut that wrap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Layout {
    size: u8,
    board: Bitboard,
    not_first_col: Bitboard,
    not_last_col: Bitboard,
}

/// The eight ray directions as (row delta, column delta).
pub const DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Layout {
    /// Masks for an N x N board. `size` must be at most 11.
    pub const fn new(size: u8) -> Self {
        let n = size as usize;
        let cells = n * n;
        let board = if cells == 128 {
            u128::MAX
        } else {
            (1u128 << cells) - 1
        };

        let mut first_col = 0u128;
        let mut last_col = 0u128;
        let mut row = 0;
        while row < n {
            first_col |= 1u128 << (row * n);
            last_col |= 1u128 << (row * n + n - 1);
            row += 1;
        }

        Self {
            size,
            board: Bitboard(board),
            not_first_col: Bitboard(board & !first_col),
            not_last_col: Bitboard(board & !last_col),
        }
    }

    /// Board dimension N
    #[inline]
    pub const fn size(&self) -> usize {
        self.size as usize
    }

    /// All N² cells
    #[inline]
    pub const fn board(&self) -> Bitboard {
        self.board
    }

    /// Shift every cell one step in `direction`, dropping cells that leave the board.
    #[inline]
    pub fn shift(&self, bb: Bitboard, (dr, dc): (i8, i8)) -> Bitboard {
        let n = self.size as i32;
        let offset = dr as i32 * n + dc as i32;
        let shifted = if offset >= 0 {
            bb.0 << offset
        } else {
            bb.0 >> (-offset)
        };
        // Moving east lands wrapped cells in the first column, moving west in the last.
        let mask = match dc {
            1 => self.not_first_col,
            -1 => self.not_last_col,
            _ => self.board,
        };
        Bitboard(shifted & mask.0)
    }
}

/// Iterator over the set cells in a bitboard
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_lsb()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.0.popcount() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl IntoIterator for Bitboard {
    type Item = usize;
    type IntoIter = BitboardIter;

    fn into_iter(self) -> Self::IntoIter {
        BitboardIter(self)
    }
}

impl FromIterator<usize> for Bitboard {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut bb = Bitboard::EMPTY;
        for cell in iter {
            bb.set(cell);
        }
        bb
    }
}

impl BitAnd for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitand(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 & rhs.0)
    }
}

impl BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Bitboard) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitor(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 | rhs.0)
    }
}

impl BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Bitboard) {
        self.0 |= rhs.0;
    }
}

impl BitXor for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn bitxor(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for Bitboard {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Bitboard) {
        self.0 ^= rhs.0;
    }
}

impl Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitboard({:?})", self.iter().collect::<Vec<_>>())
    }
}
