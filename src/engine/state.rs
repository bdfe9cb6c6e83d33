use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sink::CellSink;

// Internal alias for a cell value (0 = empty, otherwise a power of two >= 2)
pub(crate) type Tile = u32;

/// A direction to move/merge tiles.
///
/// `y` grows downwards, so `Up` pushes tiles towards row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step `(dx, dy)` applied to `(x, y)` coordinates.
    #[inline]
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("cell ({x}, {y}) is outside the {width}x{height} board")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("{value} is not a valid tile (expected 0 or a power of two >= 2)")]
    InvalidTile { value: Tile },
    #[error("merging two {value} tiles overflows the tile range")]
    TileOverflow { value: Tile },
    #[error("board dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: usize, height: usize },
    #[error("rows have unequal lengths")]
    RaggedRows,
    #[error("no empty cell left to spawn a tile into")]
    SpawnStarvation,
}

#[inline]
pub(crate) fn is_valid_tile(value: Tile) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}

/// Grid of tile values plus the display sink that mirrors every write.
///
/// Cells are addressed as `(x, y)` with `x` in `[0, width)` and `y` in
/// `[0, height)`. Storage is row-major.
#[derive(Clone)]
pub struct Board<S> {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
    sink: S,
}

impl<S: CellSink> Board<S> {
    /// Create an empty board and attach one display element per cell.
    ///
    /// ```
    /// use console_2048::engine::Board;
    /// use console_2048::sink::Recorder;
    /// let board = Board::new(4, 4, Recorder::default()).unwrap();
    /// assert_eq!(board.count_empty(), 16);
    /// assert_eq!(board.sink().attached().len(), 16);
    /// ```
    pub fn new(width: usize, height: usize, sink: S) -> Result<Self, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyDimensions { width, height });
        }
        let mut board = Board {
            width,
            height,
            cells: vec![0; width * height],
            sink,
        };
        board.initialize();
        Ok(board)
    }

    /// Build a board from row slices (`rows[y][x]`). Non-zero cells are
    /// written through [`Board::set`], so the sink sees them.
    ///
    /// ```
    /// use console_2048::engine::Board;
    /// use console_2048::sink::NullSink;
    /// let board = Board::from_rows(&[[2, 0], [0, 4]], NullSink).unwrap();
    /// assert_eq!(board.get(1, 1).unwrap(), 4);
    /// ```
    pub fn from_rows<R: AsRef<[Tile]>>(rows: &[R], sink: S) -> Result<Self, BoardError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if rows.iter().any(|r| r.as_ref().len() != width) {
            return Err(BoardError::RaggedRows);
        }
        let mut board = Board::new(width, height, sink)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, &value) in row.as_ref().iter().enumerate() {
                if value != 0 {
                    board.set(x, y, value)?;
                }
            }
        }
        Ok(board)
    }

    /// Reset every cell to empty and attach one display element per cell,
    /// row by row. Not reported through `cell_changed`.
    pub fn initialize(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.cells[y * self.width + x] = 0;
                self.sink.attach(x, y);
            }
        }
    }

    /// Current value at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Result<Tile, BoardError> {
        let idx = self.index(x, y)?;
        Ok(self.cells[idx])
    }

    /// Overwrite `(x, y)` and notify the sink once. Invalid writes leave both
    /// the cell and the sink untouched.
    pub fn set(&mut self, x: usize, y: usize, value: Tile) -> Result<(), BoardError> {
        let idx = self.index(x, y)?;
        if !is_valid_tile(value) {
            return Err(BoardError::InvalidTile { value });
        }
        self.cells[idx] = value;
        self.sink.cell_changed(x, y, value);
        Ok(())
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Result<usize, BoardError> {
        if x >= self.width || y >= self.height {
            return Err(BoardError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }
}

impl<S> Board<S> {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at `(x, y)`, `None` when off the board.
    #[inline]
    pub(crate) fn value_at(&self, x: usize, y: usize) -> Option<Tile> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// The neighbour of `(x, y)` one step along `(dx, dy)`, if on the board.
    #[inline]
    pub(crate) fn neighbour(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<(usize, usize)> {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < self.width && ny < self.height).then_some((nx, ny))
    }

    /// Snapshot as `rows[y][x]`.
    pub fn rows(&self) -> Vec<Vec<Tile>> {
        self.cells.chunks(self.width).map(<[Tile]>::to_vec).collect()
    }

    /// Iterate `(x, y, value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, &v)| (idx % width, idx / width, v))
    }

    /// Coordinates of every empty cell, row-major.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells()
            .filter(|&(_, _, v)| v == 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// Return the highest tile value on the board (0 when empty).
    #[inline]
    pub fn highest_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all tile values. Slides and merges preserve it.
    #[inline]
    pub fn tile_sum(&self) -> u64 {
        self.cells.iter().map(|&v| u64::from(v)).sum()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S> fmt::Debug for Board<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rows", &self.rows())
            .finish()
    }
}

impl<S> fmt::Display for Board<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(self.width * 8 - 1);
        for (y, row) in self.cells.chunks(self.width).enumerate() {
            if y > 0 {
                writeln!(f, "{rule}")?;
            }
            let line: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

fn format_val(val: Tile) -> String {
    match val {
        0 => " ".repeat(7),
        v => format!("{v:^7}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{CellUpdate, NullSink, Recorder};

    #[test]
    fn new_board_is_empty_and_attaches_every_cell_once() {
        let board = Board::new(4, 3, Recorder::default()).unwrap();
        assert_eq!(board.count_empty(), 12);
        let attached = board.sink().attached();
        assert_eq!(attached.len(), 12);
        let mut sorted = attached.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 12);
        assert!(board.sink().updates().is_empty());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            Board::new(0, 4, NullSink).unwrap_err(),
            BoardError::EmptyDimensions { width: 0, height: 4 }
        );
    }

    #[test]
    fn set_notifies_sink_once_per_write() {
        let mut board = Board::new(4, 4, Recorder::default()).unwrap();
        board.set(2, 1, 8).unwrap();
        board.set(2, 1, 0).unwrap();
        assert_eq!(
            board.sink().updates(),
            &[
                CellUpdate { x: 2, y: 1, value: 8 },
                CellUpdate { x: 2, y: 1, value: 0 },
            ]
        );
        assert_eq!(board.get(2, 1).unwrap(), 0);
    }

    #[test]
    fn out_of_bounds_fails_fast() {
        let mut board = Board::new(4, 4, Recorder::default()).unwrap();
        assert!(matches!(board.get(4, 0), Err(BoardError::OutOfBounds { x: 4, .. })));
        assert!(matches!(board.set(0, 7, 2), Err(BoardError::OutOfBounds { y: 7, .. })));
        assert!(board.sink().updates().is_empty());
    }

    #[test]
    fn invalid_tiles_are_rejected() {
        let mut board = Board::new(2, 2, Recorder::default()).unwrap();
        assert_eq!(board.set(0, 0, 6), Err(BoardError::InvalidTile { value: 6 }));
        assert_eq!(board.set(0, 0, 1), Err(BoardError::InvalidTile { value: 1 }));
        assert_eq!(board.get(0, 0).unwrap(), 0);
        assert!(board.sink().updates().is_empty());
    }

    #[test]
    fn from_rows_round_trips_and_rejects_ragged_input() {
        let board = Board::from_rows(&[vec![2, 4, 0], vec![0, 0, 8]], NullSink).unwrap();
        assert_eq!((board.width(), board.height()), (3, 2));
        assert_eq!(board.rows(), vec![vec![2, 4, 0], vec![0, 0, 8]]);
        assert_eq!(board.highest_tile(), 8);
        assert_eq!(board.tile_sum(), 14);

        let ragged = Board::from_rows(&[vec![2, 4], vec![2]], NullSink);
        assert_eq!(ragged.unwrap_err(), BoardError::RaggedRows);
    }

    #[test]
    fn initialize_clears_values_without_notifying() {
        let mut board = Board::from_rows(&[[2, 2], [4, 4]], Recorder::default()).unwrap();
        board.sink_mut().clear();
        board.initialize();
        assert_eq!(board.count_empty(), 4);
        assert!(board.sink().updates().is_empty());
        assert_eq!(board.sink().attached().len(), 4);
    }

    #[test]
    fn neighbour_stays_on_the_board() {
        let board = Board::new(4, 4, NullSink).unwrap();
        assert_eq!(board.neighbour(0, 0, -1, 0), None);
        assert_eq!(board.neighbour(3, 2, 1, 0), None);
        assert_eq!(board.neighbour(1, 3, 0, 1), None);
        assert_eq!(board.neighbour(1, 1, 0, -1), Some((1, 0)));
    }

    #[test]
    fn display_renders_one_line_per_row() {
        let board = Board::from_rows(&[[2, 0], [0, 1024]], NullSink).unwrap();
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains('2'));
        assert!(lines[2].contains("1024"));
    }
}
