//! Error types surfaced by the crawler core.

use thiserror::Error;

/// Errors returned by session and combat operations.
///
/// Every variant except [`CrawlError::SessionOver`] is recoverable: the
/// request is rejected and no state has changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlError {
    /// Skill cost exceeds the player's current mp.
    #[error("not enough mp: need {required}, have {available}")]
    NotEnoughMp {
        /// Cost of the skill.
        required: u32,
        /// Player's current mp.
        available: u32,
    },

    /// A battle action was requested while exploring.
    #[error("no battle in progress")]
    NotInBattle,

    /// An exploration action was requested during a battle.
    #[error("a battle is in progress")]
    AlreadyInBattle,

    /// Skill index does not name a learned skill.
    #[error("unknown skill slot {0}")]
    UnknownSkill(usize),

    /// Inventory index is out of range.
    #[error("no item in inventory slot {0}")]
    UnknownItem(usize),

    /// The effect needs an enemy target but none is available.
    #[error("{0} needs an enemy target")]
    NoTarget(String),

    /// No active item spot under the player.
    #[error("nothing to pick up here")]
    NothingToPickUp,

    /// Level exit requested away from the exit cell.
    #[error("not at the level exit")]
    NotAtExit,

    /// Level exit requested while a boss is still alive.
    #[error("the exit is sealed while {0} lives")]
    ExitBlocked(String),

    /// No eligible cell was found within the search bounds.
    #[error("no free cell for {0}")]
    NoPlacement(String),

    /// The player has been defeated; the session accepts no more actions.
    #[error("the session is over")]
    SessionOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = CrawlError::NotEnoughMp {
            required: 15,
            available: 4,
        };
        assert_eq!(err.to_string(), "not enough mp: need 15, have 4");
        assert_eq!(
            CrawlError::ExitBlocked("Red Dragon".into()).to_string(),
            "the exit is sealed while Red Dragon lives"
        );
    }
}
