use crate::board::{Board, BoardError};
use crate::{PlayerId, NO_PLAYER};

/// Fewest players a round can run with.
pub const MIN_PLAYERS: u8 = 2;

/// Player who opens the round unless configured otherwise.
pub const DEFAULT_FIRST_PLAYER: PlayerId = 1;

/// Consecutive same-owner disks needed to win.
const WIN_LENGTH: u32 = 4;

/// Outcome of a single turn attempt. Rule violations are values, not
/// errors: they are relayed back to the offending player and nothing
/// else happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TurnResult {
    Success = 0,
    WrongPlayer = 1,
    ColumnFull = 2,
    InvalidColumn = 3,
    GameFinished = 4,
}

impl TurnResult {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Success),
            1 => Some(Self::WrongPlayer),
            2 => Some(Self::ColumnFull),
            3 => Some(Self::InvalidColumn),
            4 => Some(Self::GameFinished),
            _ => None,
        }
    }
}

/// Turn/rules state machine for one round. Owns the board, validates
/// and applies turns, and runs win detection seeded at the last move.
///
/// The engine has no locking of its own; the owning lobby only touches
/// it inside its critical section.
#[derive(Debug)]
pub struct Game {
    num_players: u8,
    current_player: PlayerId,
    num_turns: u32,
    last_move: (u8, u8),
    winner: Option<PlayerId>,
    finished: bool,
    board: Board,
}

/// The four win axes as signed steps: vertical, horizontal, and the
/// two diagonals. Each is scanned outward in both directions from the
/// last move.
const AXES: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

impl Game {
    /// Start a round. `num_players` is clamped up to the minimum and
    /// `first_player` falls back to player 1 when out of range, the
    /// same leniency the lobby relies on for configured rules.
    pub fn new(
        num_players: u8,
        first_player: PlayerId,
        num_columns: u8,
        num_rows: u8,
    ) -> Result<Self, BoardError> {
        let num_players = num_players.max(MIN_PLAYERS);
        let current_player = if first_player >= DEFAULT_FIRST_PLAYER && first_player <= num_players
        {
            first_player
        } else {
            DEFAULT_FIRST_PLAYER
        };
        Ok(Self {
            num_players,
            current_player,
            num_turns: 0,
            last_move: (0, 0),
            winner: None,
            finished: false,
            board: Board::new(num_columns, num_rows)?,
        })
    }

    pub fn num_players(&self) -> u8 {
        self.num_players
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn num_turns(&self) -> u32 {
        self.num_turns
    }

    /// (column, row) of the most recent successful drop.
    pub fn last_move(&self) -> (u8, u8) {
        self.last_move
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// True once a winner is found or the board fills with none.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Validate and apply one turn. Checks run in order: round still
    /// active, correct player, column in range, column not full. On
    /// success the move is recorded, the turn passes to the next
    /// player, and win/draw detection runs from the new disk.
    pub fn take_turn(&mut self, player: PlayerId, column: u8) -> TurnResult {
        if self.finished {
            return TurnResult::GameFinished;
        }
        if player != self.current_player {
            return TurnResult::WrongPlayer;
        }
        match self.board.drop_piece(column, player) {
            Err(_) => return TurnResult::InvalidColumn,
            Ok(false) => return TurnResult::ColumnFull,
            Ok(true) => {},
        }

        // drop_piece succeeded, so the height read cannot fail
        let row = self.board.column_height(column).unwrap_or(1) - 1;
        self.last_move = (column, row);
        self.num_turns += 1;
        self.current_player = self.next_player();

        if let Some(winner) = self.find_winner_from_last_move() {
            tracing::debug!(winner, turns = self.num_turns, "round won");
            self.winner = Some(winner);
            self.finished = true;
        } else if self.board.is_full() {
            tracing::debug!(turns = self.num_turns, "board full, round drawn");
            self.finished = true;
        }

        TurnResult::Success
    }

    fn next_player(&self) -> PlayerId {
        if self.current_player >= self.num_players {
            DEFAULT_FIRST_PLAYER
        } else {
            self.current_player + 1
        }
    }

    /// Scan the four axes through the last move. Each axis accumulates
    /// one count seeded at 1 for the new disk, extended by two
    /// half-scans (one per direction) that stop at a board edge or an
    /// owner mismatch. Signed coordinates keep "one before column 0"
    /// distinct from any valid index.
    fn find_winner_from_last_move(&self) -> Option<PlayerId> {
        let (col, row) = self.last_move;
        let owner = self.owner_at(col as i32, row as i32);
        if owner == NO_PLAYER {
            return None;
        }

        for (dx, dy) in AXES {
            let mut count = 1;
            for (step_x, step_y) in [(dx, dy), (-dx, -dy)] {
                let mut x = col as i32 + step_x;
                let mut y = row as i32 + step_y;
                while self.owner_at(x, y) == owner {
                    count += 1;
                    if count == WIN_LENGTH {
                        return Some(owner);
                    }
                    x += step_x;
                    y += step_y;
                }
            }
        }
        None
    }

    /// Owner at signed coordinates; anything off the board reads as
    /// empty, which terminates a half-scan.
    fn owner_at(&self, col: i32, row: i32) -> PlayerId {
        if col < 0
            || row < 0
            || col >= i32::from(self.board.num_columns())
            || row >= i32::from(self.board.num_rows())
        {
            return NO_PLAYER;
        }
        self.board
            .disk_owner_at(col as u8, row as u8)
            .unwrap_or(NO_PLAYER)
    }
}
