//! What the presentation layer draws: ray-cast wall columns and a minimap.

pub mod minimap;
pub mod raycast;

use ratatui::style::Color;

pub use minimap::render_minimap;
pub use raycast::{cast_columns, Orientation, ProjectionConfig, WallColumn, WallHit};

/// Base grey of an unlit face.
fn base_grey(orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Vertical => 100.0,
        Orientation::Horizontal => 120.0,
    }
}

/// Shaded wall colour for a column, `None` where no wall was hit.
pub fn wall_color(column: &WallColumn) -> Option<Color> {
    let hit = column.hit.as_ref()?;
    let v = (base_grey(hit.orientation) * hit.brightness) as u8;
    Some(Color::Rgb(v, v, v))
}
