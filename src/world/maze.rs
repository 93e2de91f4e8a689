//! Maze generation by recursive spatial partitioning.
//!
//! The interior rectangle is split along random lines until pieces get
//! narrower than [`ROOM_THRESHOLD`]; those pieces are carved out as rooms.
//! Each split line stays solid apart from a single passage cell.

use rand::Rng;

use super::grid::{Cell, Grid};

pub const MIN_SIZE: usize = 5;

/// Rectangles narrower or shorter than this become rooms.
pub const ROOM_THRESHOLD: usize = 5;

/// Clamp to [`MIN_SIZE`] and round even sizes up to the next odd one.
pub fn normalize_size(size: usize) -> usize {
    let size = size.max(MIN_SIZE);
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

#[derive(Clone, Copy, Debug)]
struct Rect {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
}

pub fn generate(size: usize, rng: &mut impl Rng) -> Grid {
    let size = normalize_size(size);
    let mut grid = Grid::filled(size);
    let mut stack = vec![Rect {
        x: 1,
        y: 1,
        w: size - 2,
        h: size - 2,
    }];
    let mut rooms = 0usize;
    let mut splits = 0usize;

    while let Some(r) = stack.pop() {
        if r.w < ROOM_THRESHOLD || r.h < ROOM_THRESHOLD {
            for y in r.y..r.y + r.h {
                for x in r.x..r.x + r.w {
                    grid.set(x, y, Cell::Empty);
                }
            }
            rooms += 1;
            continue;
        }

        splits += 1;
        if rng.gen_bool(0.5) {
            // Horizontal line at row r.y + offset.
            let offset = rng.gen_range(1..r.h - 1);
            let line = r.y + offset;
            let passage = r.x + rng.gen_range(0..r.w);
            grid.set(passage, line, Cell::Empty);
            stack.push(Rect { h: offset, ..r });
            stack.push(Rect {
                y: line + 1,
                h: r.h - offset - 1,
                ..r
            });
        } else {
            let offset = rng.gen_range(1..r.w - 1);
            let line = r.x + offset;
            let passage = r.y + rng.gen_range(0..r.h);
            grid.set(line, passage, Cell::Empty);
            stack.push(Rect { w: offset, ..r });
            stack.push(Rect {
                x: line + 1,
                w: r.w - offset - 1,
                ..r
            });
        }
    }

    let (ex, ey) = grid.entry();
    grid.set(ex, ey, Cell::Empty);
    let (xx, xy) = grid.exit();
    grid.set(xx, xy, Cell::Empty);

    tracing::debug!(size, rooms, splits, "maze partitioned");
    grid
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn sizes_are_normalized() {
        assert_eq!(normalize_size(0), 5);
        assert_eq!(normalize_size(4), 5);
        assert_eq!(normalize_size(10), 11);
        assert_eq!(normalize_size(13), 13);
        let grid = generate(8, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(grid.size(), 9);
    }

    #[test]
    fn entry_and_exit_are_open() {
        for seed in [0u64, 7, 42, 1234] {
            let grid = generate(15, &mut ChaCha8Rng::seed_from_u64(seed));
            assert!(grid.is_empty(1, 1));
            assert!(grid.is_empty(13, 13));
        }
    }

    #[test]
    fn same_seed_same_grid() {
        let a = generate(17, &mut ChaCha8Rng::seed_from_u64(99));
        let b = generate(17, &mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn interior_is_partly_open() {
        let grid = generate(11, &mut ChaCha8Rng::seed_from_u64(42));
        let open = grid.empty_cells().count();
        assert!(open > 11, "only {} open cells", open);
        assert!(open < 9 * 9);
    }

    #[test]
    fn minimum_grid_is_one_room() {
        let grid = generate(5, &mut ChaCha8Rng::seed_from_u64(3));
        // Interior 3×3 is below the room threshold.
        assert_eq!(grid.empty_cells().count(), 9);
    }
}
