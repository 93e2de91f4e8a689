//! Player position and cardinal facing.

/// Cardinal facing. 0° is North, pointing toward decreasing rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    pub fn degrees(self) -> f64 {
        match self {
            Facing::North => 0.0,
            Facing::East => 90.0,
            Facing::South => 180.0,
            Facing::West => 270.0,
        }
    }

    pub fn dx(self) -> i64 {
        match self {
            Facing::East => 1,
            Facing::West => -1,
            _ => 0,
        }
    }

    pub fn dy(self) -> i64 {
        match self {
            Facing::North => -1,
            Facing::South => 1,
            _ => 0,
        }
    }

    pub fn turn_left(self) -> Self {
        match self {
            Facing::North => Facing::West,
            Facing::West => Facing::South,
            Facing::South => Facing::East,
            Facing::East => Facing::North,
        }
    }

    pub fn turn_right(self) -> Self {
        match self {
            Facing::North => Facing::East,
            Facing::East => Facing::South,
            Facing::South => Facing::West,
            Facing::West => Facing::North,
        }
    }

    pub fn reverse(self) -> Self {
        self.turn_left().turn_left()
    }
}

/// Continuous position in cell units plus facing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub facing: Facing,
}

impl Pose {
    /// Centre of cell `(x, y)`.
    pub fn at_cell(x: usize, y: usize, facing: Facing) -> Self {
        Self {
            x: x as f64 + 0.5,
            y: y as f64 + 0.5,
            facing,
        }
    }

    /// Floored cell coordinates.
    pub fn cell(&self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }

    /// Unit vector the pose looks along: `(sin θ, -cos θ)`.
    pub fn direction(&self) -> (f64, f64) {
        let theta = self.facing.degrees().to_radians();
        (theta.sin(), -theta.cos())
    }

    /// Unit vector to the pose's right: `(cos θ, sin θ)`.
    pub fn right(&self) -> (f64, f64) {
        let theta = self.facing.degrees().to_radians();
        (theta.cos(), theta.sin())
    }
}
