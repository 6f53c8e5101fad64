pub mod board;
pub mod game;
pub mod net;

/// Identifies a player within a lobby. Ids are assigned starting at 1;
/// 0 means "no player" (an empty cell, or no winner).
pub type PlayerId = u8;

/// The id value used for empty cells and "no winner".
pub const NO_PLAYER: PlayerId = 0;
