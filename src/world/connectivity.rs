//! Reachability repair run once right after generation.

use super::grid::{Cell, Grid, NEIGHBOURS};

/// Open interior walls until every Empty cell is reachable from the entry.
///
/// Each pass takes the first unreached Empty cell (row-major) that touches
/// an interior wall and opens that wall, checking neighbours down, right,
/// up, left. Border walls are never opened. Returns the number of walls
/// opened.
pub fn repair(grid: &mut Grid) -> usize {
    let (sx, sy) = grid.entry();
    let mut opened = 0;

    loop {
        let reached = grid.reachable_from(sx, sy);
        let target = grid
            .empty_cells()
            .filter(|&(x, y)| !reached[y][x])
            .find_map(|(x, y)| interior_wall_neighbour(grid, x, y));

        // Unreached cells always border an interior wall, so `None` here
        // means the grid is connected.
        let Some((wx, wy)) = target else { break };
        grid.set(wx, wy, Cell::Empty);
        opened += 1;
    }

    tracing::debug!(opened, "connectivity repaired");
    opened
}

fn interior_wall_neighbour(grid: &Grid, x: usize, y: usize) -> Option<(usize, usize)> {
    NEIGHBOURS.iter().find_map(|&(dx, dy)| {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let (ux, uy) = (nx as usize, ny as usize);
        (grid.cell(ux, uy) == Cell::Wall && !grid.is_border(ux, uy)).then_some((ux, uy))
    })
}

// ── Tests ──────────────────────────────────────────────────────
