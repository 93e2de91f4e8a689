//! Enemy and item placement on a repaired grid.
//!
//! Free cells are found by bounded rejection sampling; a spot that can't be
//! placed within [`MAX_ATTEMPTS`] draws is skipped with a warning. Boss
//! levels swap the normal enemy roster for a single boss parked near the
//! exit.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use super::grid::Grid;
use super::{EnemySpot, ItemSpot};
use crate::combat::Enemy;
use crate::config::{fallback_monster, BossDef, GameConfig};
use crate::error::CrawlError;

pub const MAX_ATTEMPTS: usize = 1000;
/// Largest Chebyshev ring searched around the exit for a boss cell.
pub const BOSS_SEARCH_RADIUS: i64 = 6;

pub fn is_boss_level(level: u32) -> bool {
    level > 0 && level % 10 == 0
}

pub fn enemy_count(level: u32) -> usize {
    (3 + level as usize / 3).min(8)
}

pub fn item_count(level: u32) -> usize {
    (2 + level as usize / 4).min(5)
}

pub fn boss_item_count(level: u32) -> usize {
    (1 + level as usize / 10).min(3)
}

/// Cells already taken by a spot, plus entry and exit.
struct Occupancy {
    taken: HashSet<(usize, usize)>,
}

impl Occupancy {
    fn new(grid: &Grid) -> Self {
        Self {
            taken: HashSet::from([grid.entry(), grid.exit()]),
        }
    }

    fn is_free(&self, grid: &Grid, x: usize, y: usize) -> bool {
        grid.is_empty(x, y) && !self.taken.contains(&(x, y))
    }

    fn claim(&mut self, x: usize, y: usize) {
        self.taken.insert((x, y));
    }
}

fn sample_free_cell(
    grid: &Grid,
    occupancy: &Occupancy,
    what: &str,
    rng: &mut impl Rng,
) -> Result<(usize, usize), CrawlError> {
    let size = grid.size();
    for _ in 0..MAX_ATTEMPTS {
        let x = rng.gen_range(1..size - 1);
        let y = rng.gen_range(1..size - 1);
        if occupancy.is_free(grid, x, y) {
            return Ok((x, y));
        }
    }
    Err(CrawlError::NoPlacement(what.to_string()))
}

/// Preferred cell two columns before the exit, then rings around it.
fn boss_cell(grid: &Grid, occupancy: &Occupancy) -> Option<(usize, usize)> {
    let (ex, ey) = grid.exit();
    let (ex, ey) = (ex as i64, ey as i64);
    let free =
        |x: i64, y: i64| x >= 0 && y >= 0 && occupancy.is_free(grid, x as usize, y as usize);

    if free(ex - 2, ey) {
        return Some(((ex - 2) as usize, ey as usize));
    }
    for r in 1..=BOSS_SEARCH_RADIUS {
        for y in ey - r..=ey + r {
            for x in ex - r..=ex + r {
                if (x - ex).abs().max((y - ey).abs()) == r && free(x, y) {
                    return Some((x as usize, y as usize));
                }
            }
        }
    }
    None
}

fn eligible_bosses<'a>(
    config: &'a GameConfig,
    level: u32,
    occurrences: &HashMap<String, u32>,
) -> Vec<&'a BossDef> {
    config
        .bosses
        .iter()
        .filter(|b| b.spawn_level <= level)
        .filter(|b| occurrences.get(&b.kind).copied().unwrap_or(0) < b.max_occurrences)
        .collect()
}

/// Placed content for one level.
#[derive(Clone, Debug, Default)]
pub struct Placement {
    pub enemies: Vec<EnemySpot>,
    pub items: Vec<ItemSpot>,
    /// Spots that found no free cell.
    pub skipped: usize,
}

/// Populate `grid` for `level`. A placed boss bumps its count in
/// `occurrences`.
pub fn place_content(
    grid: &Grid,
    level: u32,
    config: &GameConfig,
    occurrences: &mut HashMap<String, u32>,
    rng: &mut impl Rng,
) -> Placement {
    let mut occupancy = Occupancy::new(grid);
    let mut placement = Placement::default();

    let boss = if is_boss_level(level) {
        place_boss(grid, level, config, occurrences, &mut occupancy, rng)
    } else {
        None
    };

    let items = match boss {
        Some(Ok(spot)) => {
            placement.enemies.push(spot);
            boss_item_count(level)
        }
        // A boss level without room for its boss still skips the normal roster.
        Some(Err(err)) => {
            tracing::warn!(level, %err, "boss skipped");
            placement.skipped += 1;
            boss_item_count(level)
        }
        None => {
            place_normal_enemies(grid, level, config, &mut occupancy, &mut placement, rng);
            item_count(level)
        }
    };

    for _ in 0..items {
        let Some(item) = config.items.choose(rng) else {
            break;
        };
        match sample_free_cell(grid, &occupancy, &item.name, rng) {
            Ok((x, y)) => {
                occupancy.claim(x, y);
                placement.items.push(ItemSpot {
                    x,
                    y,
                    item: item.clone(),
                    active: true,
                });
            }
            Err(err) => {
                tracing::warn!(level, %err, "item skipped");
                placement.skipped += 1;
            }
        }
    }

    tracing::debug!(
        level,
        enemies = placement.enemies.len(),
        items = placement.items.len(),
        skipped = placement.skipped,
        "content placed"
    );
    placement
}

/// `None` when no boss definition is eligible for `level`; `Some(Err)` when
/// one is but nothing near the exit is free.
fn place_boss(
    grid: &Grid,
    level: u32,
    config: &GameConfig,
    occurrences: &mut HashMap<String, u32>,
    occupancy: &mut Occupancy,
    rng: &mut impl Rng,
) -> Option<Result<EnemySpot, CrawlError>> {
    let candidates = eligible_bosses(config, level, occurrences);
    let Some(&boss) = candidates.choose(rng) else {
        tracing::info!(level, "no eligible boss, generating a normal level");
        return None;
    };
    let Some((x, y)) = boss_cell(grid, occupancy) else {
        return Some(Err(CrawlError::NoPlacement(boss.name.clone())));
    };

    occupancy.claim(x, y);
    *occurrences.entry(boss.kind.clone()).or_insert(0) += 1;

    let mut enemy = Enemy::from_def(&config.monster(&boss.kind));
    enemy.name = boss.name.clone();
    enemy.is_boss = true;
    Some(Ok(EnemySpot {
        x,
        y,
        enemy,
        active: true,
    }))
}

fn place_normal_enemies(
    grid: &Grid,
    level: u32,
    config: &GameConfig,
    occupancy: &mut Occupancy,
    placement: &mut Placement,
    rng: &mut impl Rng,
) {
    let pool = config.normal_monsters();
    let fallback = fallback_monster();
    for _ in 0..enemy_count(level) {
        let def = pool.choose(rng).copied().unwrap_or(&fallback);
        match sample_free_cell(grid, occupancy, &def.name, rng) {
            Ok((x, y)) => {
                occupancy.claim(x, y);
                placement.enemies.push(EnemySpot {
                    x,
                    y,
                    enemy: Enemy::from_def(def),
                    active: true,
                });
            }
            Err(err) => {
                tracing::warn!(level, %err, "enemy skipped");
                placement.skipped += 1;
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::grid::Cell;
    use crate::world::{connectivity, maze};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_grid(size: usize) -> Grid {
        let mut grid = Grid::filled(size);
        for y in 1..size - 1 {
            for x in 1..size - 1 {
                grid.set(x, y, Cell::Empty);
            }
        }
        grid
    }

    #[test]
    fn counts_scale_and_cap() {
        assert_eq!(enemy_count(1), 3);
        assert_eq!(enemy_count(9), 6);
        assert_eq!(enemy_count(40), 8);
        assert_eq!(item_count(1), 2);
        assert_eq!(item_count(12), 5);
        assert_eq!(item_count(99), 5);
        assert_eq!(boss_item_count(10), 2);
        assert_eq!(boss_item_count(50), 3);
        assert!(is_boss_level(10));
        assert!(!is_boss_level(0));
        assert!(!is_boss_level(11));
    }

    #[test]
    fn level_one_on_eleven_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut grid = maze::generate(11, &mut rng);
        connectivity::repair(&mut grid);
        let placed = place_content(
            &grid,
            1,
            &GameConfig::default(),
            &mut HashMap::new(),
            &mut rng,
        );
        assert_eq!(placed.enemies.len(), 3);
        assert_eq!(placed.items.len(), 2);
        assert!(placed.enemies.iter().all(|s| !s.enemy.is_boss));

        let mut cells = HashSet::new();
        for (x, y) in placed
            .enemies
            .iter()
            .map(|s| (s.x, s.y))
            .chain(placed.items.iter().map(|s| (s.x, s.y)))
        {
            assert!(grid.is_empty(x, y));
            assert_ne!((x, y), grid.entry());
            assert_ne!((x, y), grid.exit());
            assert!(cells.insert((x, y)), "two spots share {:?}", (x, y));
        }
    }

    #[test]
    fn boss_prefers_two_before_exit() {
        let grid = open_grid(15);
        let mut occurrences = HashMap::new();
        let placed = place_content(
            &grid,
            10,
            &GameConfig::default(),
            &mut occurrences,
            &mut ChaCha8Rng::seed_from_u64(5),
        );
        assert_eq!(placed.enemies.len(), 1);
        let boss = &placed.enemies[0];
        assert!(boss.enemy.is_boss);
        assert_eq!((boss.x, boss.y), (11, 13));
        assert_eq!(placed.items.len(), 2);
        assert_eq!(occurrences.get("dragon"), Some(&1));
    }

    #[test]
    fn boss_falls_back_to_ring_search() {
        let mut grid = open_grid(15);
        grid.set(11, 13, Cell::Wall);
        let placed = place_content(
            &grid,
            10,
            &GameConfig::default(),
            &mut HashMap::new(),
            &mut ChaCha8Rng::seed_from_u64(5),
        );
        // Ring 1, row-major: (12,12) is the first free cell.
        let boss = &placed.enemies[0];
        assert_eq!((boss.x, boss.y), (12, 12));
    }

    #[test]
    fn boss_without_room_is_skipped_not_replaced() {
        // Open only in columns 1..=7 plus the exit: ring 6 around (15,15)
        // reaches column 9 at most.
        let mut grid = Grid::filled(17);
        for y in 1..16 {
            for x in 1..=7 {
                grid.set(x, y, Cell::Empty);
            }
        }
        grid.set(15, 15, Cell::Empty);
        let mut occurrences = HashMap::new();
        let placed = place_content(
            &grid,
            10,
            &GameConfig::default(),
            &mut occurrences,
            &mut ChaCha8Rng::seed_from_u64(5),
        );
        assert!(placed.enemies.is_empty());
        assert_eq!(placed.items.len(), boss_item_count(10));
        assert_eq!(placed.skipped, 1);
        assert!(occurrences.is_empty());
    }

    #[test]
    fn exhausted_bosses_fall_back_to_normal_level() {
        let grid = open_grid(15);
        let mut occurrences = HashMap::from([("dragon".to_string(), 2)]);
        let placed = place_content(
            &grid,
            10,
            &GameConfig::default(),
            &mut occurrences,
            &mut ChaCha8Rng::seed_from_u64(5),
        );
        assert_eq!(placed.enemies.len(), enemy_count(10));
        assert!(placed.enemies.iter().all(|s| !s.enemy.is_boss));
        assert_eq!(placed.items.len(), item_count(10));
    }

    #[test]
    fn full_grid_skips_instead_of_looping() {
        // Only entry and exit are open.
        let mut grid = Grid::filled(7);
        grid.set(1, 1, Cell::Empty);
        grid.set(5, 5, Cell::Empty);
        let placed = place_content(
            &grid,
            1,
            &GameConfig::default(),
            &mut HashMap::new(),
            &mut ChaCha8Rng::seed_from_u64(1),
        );
        assert!(placed.enemies.is_empty());
        assert!(placed.items.is_empty());
        assert_eq!(placed.skipped, 5);
    }
}
