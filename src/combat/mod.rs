//! Turn-based combat: combatants, effects, skill resolution and the battle
//! state machine.

pub mod battle;
pub mod effects;
pub mod events;
pub mod player;
pub mod skills;

pub use battle::{BattleAction, BattlePhase, BattleSession, TurnOutcome};
pub use effects::{EffectKind, EffectTracker, TemporaryEffect};
pub use events::BattleEvent;
pub use player::{Enemy, InventoryItem, Player};
pub use skills::{resolve_effect, EffectOutcome};
