use crate::{PlayerId, NO_PLAYER};

/// Smallest board the rules support. The column/row ratio below keeps
/// every diagonal through a winning cell fully scannable.
pub const MIN_COLUMNS: u8 = 7;
pub const MIN_ROWS: u8 = 6;

/// A fault from the board itself: invalid construction or an index
/// outside the grid. These are caller contract breaches, not player
/// mistakes, and are propagated rather than mapped to turn results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    InvalidDimensions { columns: u8, rows: u8 },
    ColumnOutOfRange { column: u8, num_columns: u8 },
    RowOutOfRange { row: u8, num_rows: u8 },
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDimensions { columns, rows } => {
                write!(
                    f,
                    "invalid board dimensions {columns}x{rows} \
                     (minimum {MIN_COLUMNS}x{MIN_ROWS}, columns must exceed rows)"
                )
            },
            Self::ColumnOutOfRange { column, num_columns } => {
                write!(f, "column {column} out of range (board has {num_columns})")
            },
            Self::RowOutOfRange { row, num_rows } => {
                write!(f, "row {row} out of range (board has {num_rows})")
            },
        }
    }
}

impl std::error::Error for BoardError {}

/// Fixed-size grid of column stacks. Cells below a column's fill height
/// hold player ids; cells at or above it are `NO_PLAYER`.
#[derive(Debug, Clone)]
pub struct Board {
    num_columns: u8,
    num_rows: u8,
    columns: Vec<Vec<PlayerId>>,
    heights: Vec<u8>,
}

impl Board {
    /// Build an empty board. Dimensions must satisfy the minimums and
    /// `num_columns - num_rows >= 1`.
    pub fn new(num_columns: u8, num_rows: u8) -> Result<Self, BoardError> {
        if num_columns < MIN_COLUMNS
            || num_rows < MIN_ROWS
            || num_columns <= num_rows
        {
            return Err(BoardError::InvalidDimensions {
                columns: num_columns,
                rows: num_rows,
            });
        }
        Ok(Self {
            num_columns,
            num_rows,
            columns: vec![vec![NO_PLAYER; num_rows as usize]; num_columns as usize],
            heights: vec![0; num_columns as usize],
        })
    }

    pub fn num_columns(&self) -> u8 {
        self.num_columns
    }

    pub fn num_rows(&self) -> u8 {
        self.num_rows
    }

    /// Drop a disk into `column`. Returns `Ok(false)` without mutating
    /// anything if the column is already full.
    pub fn drop_piece(&mut self, column: u8, player: PlayerId) -> Result<bool, BoardError> {
        self.check_column(column)?;
        let c = column as usize;
        if self.heights[c] == self.num_rows {
            return Ok(false);
        }
        self.columns[c][self.heights[c] as usize] = player;
        self.heights[c] += 1;
        Ok(true)
    }

    /// Owner of the cell at (column, row); `NO_PLAYER` for empty cells.
    pub fn disk_owner_at(&self, column: u8, row: u8) -> Result<PlayerId, BoardError> {
        self.check_column(column)?;
        self.check_row(row)?;
        Ok(self.columns[column as usize][row as usize])
    }

    /// Read-only view of one column, bottom to top.
    pub fn column(&self, column: u8) -> Result<&[PlayerId], BoardError> {
        self.check_column(column)?;
        Ok(&self.columns[column as usize])
    }

    /// Snapshot of one row across all columns, left to right.
    pub fn row(&self, row: u8) -> Result<Vec<PlayerId>, BoardError> {
        self.check_row(row)?;
        Ok(self
            .columns
            .iter()
            .map(|col| col[row as usize])
            .collect())
    }

    /// Number of disks currently stacked in `column`.
    pub fn column_height(&self, column: u8) -> Result<u8, BoardError> {
        self.check_column(column)?;
        Ok(self.heights[column as usize])
    }

    pub fn is_column_full(&self, column: u8) -> Result<bool, BoardError> {
        self.check_column(column)?;
        Ok(self.heights[column as usize] == self.num_rows)
    }

    pub fn is_full(&self) -> bool {
        self.heights.iter().all(|&h| h == self.num_rows)
    }

    fn check_column(&self, column: u8) -> Result<(), BoardError> {
        if column >= self.num_columns {
            return Err(BoardError::ColumnOutOfRange {
                column,
                num_columns: self.num_columns,
            });
        }
        Ok(())
    }

    fn check_row(&self, row: u8) -> Result<(), BoardError> {
        if row >= self.num_rows {
            return Err(BoardError::RowOutOfRange {
                row,
                num_rows: self.num_rows,
            });
        }
        Ok(())
    }
}
