//! Level generation: maze grid, connectivity repair and content placement.

pub mod connectivity;
pub mod grid;
pub mod maze;
pub mod placement;
pub mod pose;

use std::collections::{HashMap, VecDeque};

use rand::Rng;

use crate::combat::Enemy;
use crate::config::{GameConfig, Item};

pub use grid::{Cell, Grid};
pub use placement::is_boss_level;
pub use pose::{Facing, Pose};

/// An enemy on the map. Defeated spots are deactivated, never removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemySpot {
    pub x: usize,
    pub y: usize,
    pub enemy: Enemy,
    pub active: bool,
}

/// An item on the map, deactivated once picked up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemSpot {
    pub x: usize,
    pub y: usize,
    pub item: Item,
    pub active: bool,
}

// ── Level ─────────────────────────────────────────────────────

/// Grid side length for a level number.
pub fn level_size(level: u32) -> usize {
    match level {
        _ if is_boss_level(level) => 15,
        1..=2 => 11,
        3..=5 => 13,
        6..=9 => 15,
        _ => 17,
    }
}

#[derive(Clone, Debug)]
pub struct Level {
    pub number: u32,
    pub grid: Grid,
    pub enemies: Vec<EnemySpot>,
    pub items: Vec<ItemSpot>,
}

impl Level {
    /// Generate, repair and populate level `number`.
    pub fn generate(
        number: u32,
        config: &GameConfig,
        boss_occurrences: &mut HashMap<String, u32>,
        rng: &mut impl Rng,
    ) -> Self {
        let mut grid = maze::generate(level_size(number), rng);
        let opened = connectivity::repair(&mut grid);
        let placed = placement::place_content(&grid, number, config, boss_occurrences, rng);
        tracing::debug!(level = number, size = grid.size(), opened, "level built");
        Self {
            number,
            grid,
            enemies: placed.enemies,
            items: placed.items,
        }
    }

    /// Indices of active enemy spots on `(x, y)`.
    pub fn active_enemies_at(&self, x: usize, y: usize) -> Vec<usize> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active && s.x == x && s.y == y)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn active_item_at(&self, x: usize, y: usize) -> Option<usize> {
        self.items
            .iter()
            .position(|s| s.active && s.x == x && s.y == y)
    }

    /// Shortest 4-way route from `from` to `to` over Empty cells, stepping
    /// around active enemies other than one standing on `to`. The start
    /// cell is not included.
    pub fn route(
        &self,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Option<Vec<(usize, usize)>> {
        let size = self.grid.size();
        let mut parent: Vec<Vec<Option<(usize, usize)>>> = vec![vec![None; size]; size];
        let mut seen = vec![vec![false; size]; size];
        let mut queue = VecDeque::new();
        *seen.get_mut(from.1)?.get_mut(from.0)? = true;
        queue.push_back(from);

        while let Some((cx, cy)) = queue.pop_front() {
            if (cx, cy) == to {
                let mut path = vec![to];
                let mut at = to;
                while let Some(prev) = parent[at.1][at.0] {
                    if prev == from {
                        break;
                    }
                    path.push(prev);
                    at = prev;
                }
                path.reverse();
                return Some(path).filter(|_| from != to);
            }
            for &(dx, dy) in &grid::NEIGHBOURS {
                let (nx, ny) = (cx as i64 + dx, cy as i64 + dy);
                if self.grid.is_wall(nx, ny) {
                    continue;
                }
                let (ux, uy) = (nx as usize, ny as usize);
                if seen[uy][ux] {
                    continue;
                }
                if (ux, uy) != to && !self.active_enemies_at(ux, uy).is_empty() {
                    continue;
                }
                seen[uy][ux] = true;
                parent[uy][ux] = Some((cx, cy));
                queue.push_back((ux, uy));
            }
        }
        None
    }

    /// The living boss that seals the exit, if any.
    pub fn active_boss(&self) -> Option<&EnemySpot> {
        self.enemies.iter().find(|s| s.active && s.enemy.is_boss)
    }

    pub fn exit_blocked(&self) -> bool {
        self.active_boss().is_some()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    proptest! {
        #[test]
        fn prop_borders_are_walls(size in 0usize..25, seed in any::<u64>()) {
            let grid = maze::generate(size, &mut ChaCha8Rng::seed_from_u64(seed));
            let n = grid.size();
            prop_assert!(n >= 5 && n % 2 == 1);
            for i in 0..n {
                prop_assert_eq!(grid.cell(i, 0), Cell::Wall);
                prop_assert_eq!(grid.cell(i, n - 1), Cell::Wall);
                prop_assert_eq!(grid.cell(0, i), Cell::Wall);
                prop_assert_eq!(grid.cell(n - 1, i), Cell::Wall);
            }
        }

        #[test]
        fn prop_repaired_grid_is_connected(size in 5usize..25, seed in any::<u64>()) {
            let mut grid = maze::generate(size, &mut ChaCha8Rng::seed_from_u64(seed));
            connectivity::repair(&mut grid);
            prop_assert!(grid.is_connected());
            let n = grid.size();
            for i in 0..n {
                prop_assert!(grid.is_border(i, 0) && !grid.is_empty(i, 0));
                prop_assert!(!grid.is_empty(0, i) && !grid.is_empty(n - 1, i));
            }
        }

        #[test]
        fn prop_same_seed_same_level(level in 1u32..25, seed in any::<u64>()) {
            let config = GameConfig::default();
            let build = || {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                Level::generate(level, &config, &mut HashMap::new(), &mut rng)
            };
            let (a, b) = (build(), build());
            prop_assert_eq!(a.grid, b.grid);
            prop_assert_eq!(a.enemies, b.enemies);
            prop_assert_eq!(a.items, b.items);
        }
    }
}
