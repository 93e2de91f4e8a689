//! First-person projection by per-column ray marching.
//!
//! Rays fan out across the field of view and step forward at a fixed
//! interval until they land in a wall cell. Each hit becomes a
//! [`WallColumn`] carrying everything a painter needs: where the column
//! sits on screen, how tall it is, how bright, and which face was struck.

use crate::world::{Grid, Pose};

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionConfig {
    pub fov_degrees: f64,
    pub rays: usize,
    pub step: f64,
    pub max_distance: f64,
    pub view_width: f64,
    pub view_height: f64,
    /// Wall height is `height_scale / distance`.
    pub height_scale: f64,
    pub height_cap: f64,
    /// Distances below this are clamped before projecting.
    pub min_distance: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            rays: 120,
            step: 0.1,
            max_distance: 10.0,
            view_width: 800.0,
            view_height: 600.0,
            height_scale: 400.0,
            height_cap: 800.0,
            min_distance: 0.1,
        }
    }
}

impl ProjectionConfig {
    pub fn horizon(&self) -> f64 {
        self.view_height / 2.0
    }
}

/// Which way the struck face runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WallHit {
    pub distance: f64,
    pub orientation: Orientation,
    pub hit_x: f64,
    pub hit_y: f64,
    pub cell: (i64, i64),
    pub height: f64,
    pub top: f64,
    /// Shading factor in `[0.3, 1.0]`.
    pub brightness: f64,
    /// Brick pattern phase: hit x on vertical faces, hit y on horizontal.
    pub texture_offset: f64,
    /// Width of the column's top edge relative to its base.
    pub top_ratio: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WallColumn {
    pub index: usize,
    pub screen_x: f64,
    pub width: f64,
    /// `None` when the ray ran out of range.
    pub hit: Option<WallHit>,
}

/// Perspective narrowing of the column top; nearer walls narrow more.
pub fn top_ratio(height: f64) -> f64 {
    if height > 400.0 {
        0.5
    } else if height > 200.0 {
        0.7
    } else {
        0.9
    }
}

/// Linear falloff to the floor of 0.3 at `max_distance`.
pub fn brightness(distance: f64, max_distance: f64) -> f64 {
    (1.0 - distance / max_distance).max(0.3)
}

/// March one ray from `(x, y)` along `(dx, dy)`. A non-positive step or
/// range never hits.
fn march(
    grid: &Grid,
    x: f64,
    y: f64,
    dx: f64,
    dy: f64,
    config: &ProjectionConfig,
) -> Option<(f64, f64, f64)> {
    if !(config.step > 0.0 && config.max_distance > 0.0) {
        return None;
    }
    let steps = (config.max_distance / config.step + 1e-9).floor();
    if !steps.is_finite() {
        return None;
    }
    let steps = steps as usize;
    (1..=steps).find_map(|k| {
        let dist = config.step * k as f64;
        let hx = x + dx * dist;
        let hy = y + dy * dist;
        grid.is_wall(hx.floor() as i64, hy.floor() as i64)
            .then_some((dist, hx, hy))
    })
}

fn project(
    distance: f64,
    hx: f64,
    hy: f64,
    orientation: Orientation,
    config: &ProjectionConfig,
) -> WallHit {
    let height = (config.height_scale / distance.max(config.min_distance)).min(config.height_cap);
    WallHit {
        distance,
        orientation,
        hit_x: hx,
        hit_y: hy,
        cell: (hx.floor() as i64, hy.floor() as i64),
        height,
        top: config.horizon() - height / 2.0,
        brightness: brightness(distance, config.max_distance),
        texture_offset: match orientation {
            Orientation::Vertical => hx,
            Orientation::Horizontal => hy,
        },
        top_ratio: top_ratio(height),
    }
}

pub fn cast_columns(grid: &Grid, pose: &Pose, config: &ProjectionConfig) -> Vec<WallColumn> {
    let n = config.rays.max(1);
    let width = config.view_width / n as f64;
    let facing = pose.facing.degrees();

    (0..n)
        .map(|i| {
            let angle = facing + config.fov_degrees * (i as f64 / n as f64 - 0.5);
            let theta = angle.to_radians();
            let (dx, dy) = (theta.sin(), -theta.cos());
            let orientation = if dx.abs() > dy.abs() {
                Orientation::Vertical
            } else {
                Orientation::Horizontal
            };
            let hit = march(grid, pose.x, pose.y, dx, dy, config)
                .map(|(dist, hx, hy)| project(dist, hx, hy, orientation, config));
            WallColumn {
                index: i,
                screen_x: i as f64 * width,
                width,
                hit,
            }
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::grid::Cell;
    use crate::world::Facing;

    /// Open 9×9 room with a solid border.
    fn room() -> Grid {
        let mut grid = Grid::filled(9);
        for y in 1..8 {
            for x in 1..8 {
                grid.set(x, y, Cell::Empty);
            }
        }
        grid
    }

    #[test]
    fn centre_ray_hits_north_wall() {
        let grid = room();
        let pose = Pose {
            x: 4.5,
            y: 4.45,
            facing: Facing::North,
        };
        let columns = cast_columns(&grid, &pose, &ProjectionConfig::default());
        assert_eq!(columns.len(), 120);

        // Ray 60 points straight ahead; the first sample below y = 1.0 is
        // 35 steps out.
        let centre = columns[60].hit.as_ref().unwrap();
        assert!((centre.distance - 3.5).abs() < 1e-9);
        assert_eq!(centre.orientation, Orientation::Horizontal);
        assert_eq!(centre.cell, (4, 0));
        assert!((centre.height - 400.0 / 3.5).abs() < 1e-6);
        assert!((centre.top - (300.0 - centre.height / 2.0)).abs() < 1e-9);
        assert!((centre.texture_offset - centre.hit_y).abs() < 1e-12);
        assert!((columns[60].screen_x - 400.0).abs() < 1e-9);
        assert!((columns[60].width - 800.0 / 120.0).abs() < 1e-9);
    }

    #[test]
    fn east_facing_hits_vertical_faces() {
        let grid = room();
        let pose = Pose::at_cell(4, 4, Facing::East);
        let columns = cast_columns(&grid, &pose, &ProjectionConfig::default());
        let centre = columns[60].hit.as_ref().unwrap();
        assert_eq!(centre.orientation, Orientation::Vertical);
        assert_eq!(centre.cell.0, 8);
        assert!((centre.texture_offset - centre.hit_x).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_has_no_wall() {
        let grid = room();
        let pose = Pose::at_cell(4, 4, Facing::North);
        let config = ProjectionConfig {
            max_distance: 2.0,
            ..ProjectionConfig::default()
        };
        let columns = cast_columns(&grid, &pose, &config);
        assert!(columns[60].hit.is_none());
    }

    #[test]
    fn degenerate_step_casts_nothing() {
        let grid = room();
        let pose = Pose::at_cell(4, 4, Facing::North);
        for step in [0.0, -0.5, f64::NAN] {
            let config = ProjectionConfig {
                step,
                ..ProjectionConfig::default()
            };
            let columns = cast_columns(&grid, &pose, &config);
            assert_eq!(columns.len(), 120);
            assert!(columns.iter().all(|c| c.hit.is_none()));
        }
    }

    #[test]
    fn shading_follows_the_configured_range() {
        let grid = room();
        let pose = Pose {
            x: 4.5,
            y: 4.45,
            facing: Facing::North,
        };
        let config = ProjectionConfig {
            max_distance: 20.0,
            ..ProjectionConfig::default()
        };
        let columns = cast_columns(&grid, &pose, &config);
        let centre = columns[60].hit.as_ref().unwrap();
        assert!((centre.brightness - (1.0 - 3.5 / 20.0)).abs() < 1e-9);
    }

    #[test]
    fn height_is_capped_up_close() {
        let mut grid = room();
        grid.set(4, 3, Cell::Wall);
        let pose = Pose {
            x: 4.5,
            y: 4.05,
            facing: Facing::North,
        };
        let columns = cast_columns(&grid, &pose, &ProjectionConfig::default());
        let hit = columns[60].hit.as_ref().unwrap();
        assert!((hit.distance - 0.1).abs() < 1e-9);
        assert!((hit.height - 800.0).abs() < 1e-9);
        assert_eq!(hit.top_ratio, 0.5);
        assert!((hit.brightness - 0.99).abs() < 1e-9);
    }

    #[test]
    fn shading_and_taper_thresholds() {
        assert_eq!(brightness(0.0, 10.0), 1.0);
        assert_eq!(brightness(9.0, 10.0), 0.3);
        assert!((brightness(5.0, 10.0) - 0.5).abs() < 1e-12);
        assert!((brightness(5.0, 20.0) - 0.75).abs() < 1e-12);
        assert_eq!(top_ratio(401.0), 0.5);
        assert_eq!(top_ratio(400.0), 0.7);
        assert_eq!(top_ratio(201.0), 0.7);
        assert_eq!(top_ratio(200.0), 0.9);
    }
}
