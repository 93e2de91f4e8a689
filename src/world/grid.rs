//! Square cell grid shared by generation, movement and the ray caster.

use std::collections::VecDeque;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Empty,
}

/// 4-neighbour offsets `(dx, dy)` in scan order: down, right, up, left.
pub const NEIGHBOURS: [(i64, i64); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// `size × size` cells addressed as `(x, y)` = (column, row).
///
/// Every query is bounds-checked; anything outside the grid reads as
/// [`Cell::Wall`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// All-wall grid.
    pub fn filled(size: usize) -> Self {
        Self {
            size,
            cells: vec![vec![Cell::Wall; size]; size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn entry(&self) -> (usize, usize) {
        (1, 1)
    }

    pub fn exit(&self) -> (usize, usize) {
        (self.size - 2, self.size - 2)
    }

    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(Cell::Wall)
    }

    /// Signed lookup for callers that step off the grid (rays, neighbours).
    pub fn is_wall(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 {
            return true;
        }
        self.cell(x as usize, y as usize) == Cell::Wall
    }

    pub fn is_empty(&self, x: usize, y: usize) -> bool {
        self.cell(x, y) == Cell::Empty
    }

    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 >= self.size || y + 1 >= self.size
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, c)| **c == Cell::Empty)
                .map(move |(x, _)| (x, y))
        })
    }

    /// BFS over Empty cells from `(sx, sy)`; `reached[y][x]` per cell.
    pub fn reachable_from(&self, sx: usize, sy: usize) -> Vec<Vec<bool>> {
        let mut reached = vec![vec![false; self.size]; self.size];
        if !self.is_empty(sx, sy) {
            return reached;
        }
        let mut queue = VecDeque::new();
        reached[sy][sx] = true;
        queue.push_back((sx, sy));

        while let Some((cx, cy)) = queue.pop_front() {
            for &(dx, dy) in &NEIGHBOURS {
                let nx = cx as i64 + dx;
                let ny = cy as i64 + dy;
                if self.is_wall(nx, ny) {
                    continue;
                }
                let (ux, uy) = (nx as usize, ny as usize);
                if !reached[uy][ux] {
                    reached[uy][ux] = true;
                    queue.push_back((ux, uy));
                }
            }
        }
        reached
    }

    /// Whether every Empty cell is reachable from the entry.
    pub fn is_connected(&self) -> bool {
        let (ex, ey) = self.entry();
        let reached = self.reachable_from(ex, ey);
        self.empty_cells().all(|(x, y)| reached[y][x])
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row
                .iter()
                .map(|c| match c {
                    Cell::Wall => '#',
                    Cell::Empty => '.',
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
