use std::fmt;

use reversi_core::{ReversiError, Result};

use crate::bitboard::{Bitboard, Layout, DIRECTIONS};
use crate::{Action, Player};

/// Smallest supported board dimension
pub const MIN_SIZE: usize = 4;

/// Largest supported board dimension (N² must fit a 128-bit bitboard)
pub const MAX_SIZE: usize = 10;

/// Final result of a finished game
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameResult {
    Win(Player),
    Tie,
}

impl GameResult {
    /// The winning player, or None for a tie
    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::Win(player) => Some(player),
            GameResult::Tie => None,
        }
    }
}

/// An Othello position on an N x N board.
///
/// Boards are values: `apply_move` returns a new board and never mutates.
/// Occupancy is two disjoint bitboards, one per player.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    layout: Layout,
    discs: [Bitboard; 2],
    to_move: Player,
}

pub(crate) fn check_size(size: usize) -> Result<()> {
    if size % 2 != 0 || !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        return Err(ReversiError::InvalidBoardSize(size));
    }
    Ok(())
}

impl Board {
    /// The standard start: four discs in the centre, Black to move.
    ///
    /// ```text
    ///   a b c d e f g h
    /// 4 . . . W B . . .
    /// 5 . . . B W . . .
    /// ```
    ///
    /// # Errors
    /// Returns `ReversiError::InvalidBoardSize` unless `size` is even and in 4..=10.
    pub fn new(size: usize) -> Result<Self> {
        check_size(size)?;
        Ok(Self::starting(size as u8))
    }

    /// The standard 8x8 start.
    pub fn standard() -> Self {
        Self::starting(8)
    }

    pub(crate) fn starting(size: u8) -> Self {
        let n = size as usize;
        let mid = n / 2;
        let mut board = Self {
            layout: Layout::new(size),
            discs: [Bitboard::EMPTY; 2],
            to_move: Player::Black,
        };
        board.put((mid - 1) * n + mid - 1, Player::White);
        board.put((mid - 1) * n + mid, Player::Black);
        board.put(mid * n + mid - 1, Player::Black);
        board.put(mid * n + mid, Player::White);
        board
    }

    /// A board with no discs.
    ///
    /// # Errors
    /// Returns `ReversiError::InvalidBoardSize` for an unsupported size.
    pub fn empty(size: usize, to_move: Player) -> Result<Self> {
        check_size(size)?;
        Ok(Self {
            layout: Layout::new(size as u8),
            discs: [Bitboard::EMPTY; 2],
            to_move,
        })
    }

    /// A board holding exactly the given discs.
    ///
    /// A cell listed twice ends up with the last player given for it.
    ///
    /// # Errors
    /// Returns an error for an unsupported size or a cell off the board.
    pub fn with_discs(
        size: usize,
        discs: impl IntoIterator<Item = (usize, Player)>,
        to_move: Player,
    ) -> Result<Self> {
        let mut board = Self::empty(size, to_move)?;
        for (cell, player) in discs {
            if cell >= board.cell_count() {
                return Err(ReversiError::InvalidDiagram(format!(
                    "cell {} is off a {}x{} board",
                    cell, size, size
                )));
            }
            board.put(cell, player);
        }
        Ok(board)
    }

    /// Parse an ASCII diagram, one row per line, first line is row 1.
    ///
    /// `.` or `-` is empty, `B`/`X`/`*` Black, `W`/`O` White. Whitespace
    /// inside a row and blank lines are ignored.
    ///
    /// # Errors
    /// Returns `ReversiError::InvalidDiagram` for ragged rows or unknown
    /// symbols, and `InvalidBoardSize` for an unsupported row count.
    pub fn from_diagram(text: &str, to_move: Player) -> Result<Self> {
        let rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|row| !row.is_empty())
            .collect();

        let size = rows.len();
        check_size(size)?;

        let mut discs = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(ReversiError::InvalidDiagram(format!(
                    "row {} has {} cells, expected {}",
                    r + 1,
                    row.len(),
                    size
                )));
            }
            for (c, &symbol) in row.iter().enumerate() {
                match symbol {
                    '.' | '-' => {}
                    _ => {
                        let player = Player::from_symbol(symbol).ok_or_else(|| {
                            ReversiError::InvalidDiagram(format!(
                                "unknown symbol '{}' at row {}, column {}",
                                symbol,
                                r + 1,
                                c + 1
                            ))
                        })?;
                        discs.push((r * size + c, player));
                    }
                }
            }
        }

        Self::with_discs(size, discs, to_move)
    }

    /// Render the plain diagram accepted by [`Board::from_diagram`].
    pub fn diagram(&self) -> String {
        let n = self.size();
        let mut out = String::with_capacity(n * (n + 1));
        for row in 0..n {
            for col in 0..n {
                out.push(self.get(row * n + col).map_or('.', Player::symbol));
            }
            out.push('\n');
        }
        out
    }

    fn put(&mut self, cell: usize, player: Player) {
        self.discs[player.opponent().index()].clear(cell);
        self.discs[player.index()].set(cell);
    }

    /// Board dimension N
    #[inline]
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Number of cells, N²
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.size() * self.size()
    }

    /// Flat index of the pass action, N²
    #[inline]
    pub fn pass_index(&self) -> usize {
        self.cell_count()
    }

    /// The player who acts next
    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Occupant of `cell`, or None if empty (or off the board)
    #[inline]
    pub fn get(&self, cell: usize) -> Option<Player> {
        if self.discs[Player::Black.index()].contains(cell) {
            Some(Player::Black)
        } else if self.discs[Player::White.index()].contains(cell) {
            Some(Player::White)
        } else {
            None
        }
    }

    /// All occupied cells with their owner, in ascending cell order
    pub fn occupied(&self) -> impl Iterator<Item = (usize, Player)> + '_ {
        (self.discs[0] | self.discs[1])
            .iter()
            .filter_map(move |cell| self.get(cell).map(|player| (cell, player)))
    }

    /// Cells owned by `player`
    #[inline]
    pub fn discs(&self, player: Player) -> Bitboard {
        self.discs[player.index()]
    }

    /// Number of discs owned by `player`
    #[inline]
    pub fn count(&self, player: Player) -> u32 {
        self.discs[player.index()].popcount()
    }

    /// Cells with no disc
    #[inline]
    pub fn empty_cells(&self) -> Bitboard {
        self.layout.board() & !(self.discs[0] | self.discs[1])
    }

    #[inline]
    pub fn empty_count(&self) -> u32 {
        self.empty_cells().popcount()
    }

    /// Cells where `player` could place a disc that flips at least one opponent disc.
    pub fn placements(&self, player: Player) -> Bitboard {
        let own = self.discs[player.index()];
        let opp = self.discs[player.opponent().index()];
        let empty = self.empty_cells();
        // An enclosed run is at most N - 2 discs long.
        let extra_steps = self.size().saturating_sub(3);

        let mut moves = Bitboard::EMPTY;
        for dir in DIRECTIONS {
            let mut run = self.layout.shift(own, dir) & opp;
            for _ in 0..extra_steps {
                run |= self.layout.shift(run, dir) & opp;
            }
            moves |= self.layout.shift(run, dir) & empty;
        }
        moves
    }

    /// True if `player` has at least one placement
    #[inline]
    pub fn has_placement(&self, player: Player) -> bool {
        self.placements(player).is_not_empty()
    }

    /// Legal actions for the side to move, ascending by cell.
    ///
    /// Never empty: with no placement available the only action is a forced pass.
    pub fn legal_moves(&self) -> Vec<Action> {
        let placements = self.placements(self.to_move);
        if placements.is_empty() {
            return vec![Action::Pass];
        }
        placements.iter().map(|cell| Action::Place(cell as u8)).collect()
    }

    /// True if `action` is a member of [`Board::legal_moves`]
    pub fn is_legal(&self, action: Action) -> bool {
        let placements = self.placements(self.to_move);
        match action.cell() {
            Some(cell) => placements.contains(cell),
            None => placements.is_empty(),
        }
    }

    /// Opponent discs the side to move would flip by playing on `cell`.
    pub fn flips(&self, cell: usize) -> Bitboard {
        if cell >= self.cell_count() || !self.empty_cells().contains(cell) {
            return Bitboard::EMPTY;
        }
        let own = self.discs[self.to_move.index()];
        let opp = self.discs[self.to_move.opponent().index()];
        let origin = Bitboard::from_cell(cell);

        let mut flips = Bitboard::EMPTY;
        for dir in DIRECTIONS {
            let mut run = Bitboard::EMPTY;
            let mut probe = self.layout.shift(origin, dir);
            while (probe & opp).is_not_empty() {
                run |= probe;
                probe = self.layout.shift(probe, dir);
            }
            if (probe & own).is_not_empty() {
                flips |= run;
            }
        }
        flips
    }

    /// Play `action` for the side to move, returning the next position.
    ///
    /// A pass only hands the turn over. A placement flips every enclosed
    /// opponent run in all eight directions.
    ///
    /// # Errors
    /// Returns `ReversiError::IllegalMove` if `action` is not in `legal_moves()`.
    pub fn apply_move(&self, action: Action) -> Result<Board> {
        let mut next = *self;
        next.to_move = self.to_move.opponent();

        match action.cell() {
            None => {
                if !self.is_legal(Action::Pass) {
                    return Err(self.illegal(action));
                }
            }
            Some(cell) => {
                let flips = self.flips(cell);
                if flips.is_empty() {
                    return Err(self.illegal(action));
                }
                let mover = self.to_move.index();
                let other = self.to_move.opponent().index();
                next.discs[mover] |= flips | Bitboard::from_cell(cell);
                next.discs[other] &= !flips;
            }
        }

        Ok(next)
    }

    fn illegal(&self, action: Action) -> ReversiError {
        ReversiError::IllegalMove(format!(
            "{} is not legal for {} on this {}x{} board",
            action.to_coord(self.size()),
            self.to_move,
            self.size(),
            self.size()
        ))
    }

    /// True once neither player can place a disc.
    ///
    /// A side without placements only passes; the game ends when the side
    /// to move and the side after its forced pass are both stuck. A full
    /// board is the common case of this.
    pub fn is_terminal(&self) -> bool {
        !self.has_placement(self.to_move) && !self.has_placement(self.to_move.opponent())
    }

    /// Result of a finished game, or None while play continues.
    ///
    /// The player with strictly more discs wins; equal counts tie.
    pub fn outcome(&self) -> Option<GameResult> {
        if !self.is_terminal() {
            return None;
        }
        let black = self.count(Player::Black);
        let white = self.count(Player::White);
        Some(match black.cmp(&white) {
            std::cmp::Ordering::Greater => GameResult::Win(Player::Black),
            std::cmp::Ordering::Less => GameResult::Win(Player::White),
            std::cmp::Ordering::Equal => GameResult::Tie,
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.size();
        write!(f, "  ")?;
        for col in 0..n {
            write!(f, " {}", (b'a' + col as u8) as char)?;
        }
        writeln!(f)?;
        for row in 0..n {
            write!(f, "{:>2}", row + 1)?;
            for col in 0..n {
                let symbol = self.get(row * n + col).map_or('.', Player::symbol);
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "{} to move (B {} - W {})",
            self.to_move,
            self.count(Player::Black),
            self.count(Player::White)
        )
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        fmt::Display::fmt(self, f)
    }
}
