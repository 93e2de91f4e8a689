//! Top-down minimap as styled terminal lines.
//!
//! Each cell is two columns wide so the map keeps a roughly square aspect
//! in a terminal. Row `y` of the grid becomes line `y`.

use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::world::{Cell, EnemySpot, Facing, Level, Pose};

const WALL: Color = Color::Rgb(90, 90, 90);
const FLOOR: Color = Color::Rgb(55, 55, 55);
const ENEMY_FALLBACK: Color = Color::Red;

fn facing_glyph(facing: Facing) -> &'static str {
    match facing {
        Facing::North => "▲ ",
        Facing::East => "▶ ",
        Facing::South => "▽ ",
        Facing::West => "◀ ",
    }
}

fn enemy_span(spot: &EnemySpot, color: Color) -> Span<'static> {
    if spot.enemy.is_boss {
        Span::styled("☠ ", Style::default().fg(color).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("! ", Style::default().fg(color))
    }
}

/// Marker colour from a monster's `#rrggbb` string.
pub fn monster_color(hex: &str) -> Color {
    Color::from_str(hex).unwrap_or(ENEMY_FALLBACK)
}

pub fn render_minimap(level: &Level, pose: &Pose) -> Vec<Line<'static>> {
    let grid = &level.grid;
    let size = grid.size();
    let (px, py) = pose.cell();
    let exit = grid.exit();

    (0..size)
        .map(|y| {
            let spans: Vec<Span<'static>> = (0..size)
                .map(|x| {
                    if (x as i64, y as i64) == (px, py) {
                        return Span::styled(
                            facing_glyph(pose.facing),
                            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                        );
                    }
                    if let Some(spot) = level
                        .enemies
                        .iter()
                        .find(|s| s.active && s.x == x && s.y == y)
                    {
                        return enemy_span(spot, monster_color(&spot.enemy.color));
                    }
                    if level.active_item_at(x, y).is_some() {
                        return Span::styled("◆ ", Style::default().fg(Color::Yellow));
                    }
                    if (x, y) == exit {
                        let color = if level.exit_blocked() {
                            Color::Red
                        } else {
                            Color::Green
                        };
                        return Span::styled("▼ ", Style::default().fg(color));
                    }
                    match grid.cell(x, y) {
                        Cell::Wall => Span::styled("██", Style::default().fg(WALL)),
                        Cell::Empty => Span::styled("· ", Style::default().fg(FLOOR)),
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Plain-text form of rendered lines, one grid row per line.
pub fn to_plain_text(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ──────────────────────────────────────────────────────
