//! Core domain types for chess: colors, pieces, squares and the board.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Side in the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    /// White moves first and starts on ranks 6-7.
    White,
    /// Black starts on ranks 0-1.
    Black,
}

impl Color {
    /// Returns the opposing color.
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// Kind of chess piece.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PieceKind {
    /// Pawn.
    Pawn,
    /// Knight.
    Knight,
    /// Bishop.
    Bishop,
    /// Rook.
    Rook,
    /// Queen.
    Queen,
    /// King.
    King,
}

/// A colored piece standing on a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// What kind of piece this is.
    pub kind: PieceKind,
    /// Which side owns it.
    pub color: Color,
}

impl Piece {
    /// Creates a new piece.
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

/// A square on the board, addressed as `(rank, file)`.
///
/// Rank 0 is black's back rank in the initial position. Both indices are
/// always in `0..8`; the only way to build a square is through
/// [`Square::new`], which rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// Board dimension along either axis.
    pub const SIZE: u8 = 8;

    /// Creates a square, or `None` if either index is off the board.
    pub fn new(rank: u8, file: u8) -> Option<Self> {
        (rank < Self::SIZE && file < Self::SIZE).then_some(Self { rank, file })
    }

    /// Rank index (row), 0-7.
    pub fn rank(self) -> u8 {
        self.rank
    }

    /// File index (column), 0-7.
    pub fn file(self) -> u8 {
        self.file
    }

    /// Returns the square reached by stepping `(d_rank, d_file)`, if it is on the board.
    pub fn offset(self, d_rank: i8, d_file: i8) -> Option<Self> {
        let rank = u8::try_from(i16::from(self.rank) + i16::from(d_rank)).ok()?;
        let file = u8::try_from(i16::from(self.file) + i16::from(d_file)).ok()?;
        Self::new(rank, file)
    }

    /// Signed `(rank, file)` distance from `self` to `other`.
    pub fn delta(self, other: Square) -> (i8, i8) {
        (
            other.rank as i8 - self.rank as i8,
            other.file as i8 - self.file as i8,
        )
    }

    /// Iterates over all 64 squares, rank by rank.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::SIZE).flat_map(|rank| (0..Self::SIZE).map(move |file| Square { rank, file }))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.rank, self.file)
    }
}

/// 8x8 chess board indexed `[rank][file]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    /// Creates a board with no pieces on it.
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    /// Creates a board in the standard starting position.
    #[instrument]
    pub fn standard() -> Self {
        use PieceKind::*;
        const BACK_RANK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut board = Self::empty();
        for (file, kind) in BACK_RANK.into_iter().enumerate() {
            board.squares[0][file] = Some(Piece::new(kind, Color::Black));
            board.squares[1][file] = Some(Piece::new(Pawn, Color::Black));
            board.squares[6][file] = Some(Piece::new(Pawn, Color::White));
            board.squares[7][file] = Some(Piece::new(kind, Color::White));
        }
        board
    }

    /// Returns the piece on `square`, if any.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.rank as usize][square.file as usize]
    }

    /// Puts `piece` on `square`, replacing whatever was there.
    pub fn place(&mut self, square: Square, piece: Piece) {
        self.squares[square.rank as usize][square.file as usize] = Some(piece);
    }

    /// Removes any piece from `square`, returning it.
    pub fn clear(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.rank as usize][square.file as usize].take()
    }

    /// Checks if `square` holds no piece.
    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Checks if `square` holds a piece belonging to `color`.
    pub fn is_own_piece(&self, square: Square, color: Color) -> bool {
        self.piece_at(square).is_some_and(|p| p.color == color)
    }

    /// Checks if `square` holds any piece of `color`.
    ///
    /// Reads the same as [`Board::is_own_piece`]; callers use this name
    /// when asking about the opponent's pieces.
    pub fn is_occupied_by_color(&self, square: Square, color: Color) -> bool {
        self.is_own_piece(square, color)
    }

    /// Rows of the board, rank 0 first.
    pub fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.squares
    }

    /// Iterates over every occupied square and its piece.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
