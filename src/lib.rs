//! Maze Crawler: a dungeon-crawler simulation core.
//!
//! Procedural maze levels, a first-person ray caster and a turn-based
//! combat engine. Presentation (drawing, menus, input devices) lives
//! outside this crate; it reads queryable state from [`Session`].

pub mod combat;
pub mod config;
pub mod error;
pub mod session;
pub mod view;
pub mod world;

pub use config::GameConfig;
pub use error::CrawlError;
pub use session::{Mode, MoveInput, Session};

/// Seedable random source injected into generation and combat.
pub type GameRng = rand_chacha::ChaCha8Rng;
