//! Turn-limited stat modifiers.
//!
//! Magnitudes are added to the matching accumulator when an effect is
//! applied and subtracted exactly once when it expires, so a tracker's
//! net contribution over an effect's lifetime is zero. Effects of the same
//! kind stack independently.

use std::fmt;

use crate::config::EffectStat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Attack,
    Defense,
    Invulnerable,
}

impl From<EffectStat> for EffectKind {
    fn from(stat: EffectStat) -> Self {
        match stat {
            EffectStat::Attack => EffectKind::Attack,
            EffectStat::Defense => EffectKind::Defense,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EffectKind::Attack => "ATK",
            EffectKind::Defense => "DEF",
            EffectKind::Invulnerable => "invulnerability",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemporaryEffect {
    pub kind: EffectKind,
    pub magnitude: i32,
    pub remaining_turns: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectTracker {
    effects: Vec<TemporaryEffect>,
    attack: i32,
    defense: i32,
    invulnerable: i32,
}

impl EffectTracker {
    /// Push an effect and add its magnitude right away. A zero duration is
    /// treated as one turn.
    pub fn apply(&mut self, kind: EffectKind, magnitude: i32, duration: u32) {
        *self.slot(kind) += magnitude;
        self.effects.push(TemporaryEffect {
            kind,
            magnitude,
            remaining_turns: duration.max(1),
        });
    }

    /// Advance one turn; returns the effects that ran out.
    pub fn tick(&mut self) -> Vec<TemporaryEffect> {
        let mut expired = Vec::new();
        let mut kept = Vec::with_capacity(self.effects.len());
        for mut effect in self.effects.drain(..) {
            effect.remaining_turns -= 1;
            if effect.remaining_turns == 0 {
                expired.push(effect);
            } else {
                kept.push(effect);
            }
        }
        self.effects = kept;
        for effect in &expired {
            *self.slot(effect.kind) -= effect.magnitude;
        }
        expired
    }

    /// Drop every effect, reversing its contribution.
    pub fn clear(&mut self) {
        for effect in std::mem::take(&mut self.effects) {
            *self.slot(effect.kind) -= effect.magnitude;
        }
    }

    pub fn attack_bonus(&self) -> i32 {
        self.attack
    }

    pub fn defense_bonus(&self) -> i32 {
        self.defense
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0
    }

    pub fn effects(&self) -> &[TemporaryEffect] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    fn slot(&mut self, kind: EffectKind) -> &mut i32 {
        match kind {
            EffectKind::Attack => &mut self.attack,
            EffectKind::Defense => &mut self.defense,
            EffectKind::Invulnerable => &mut self.invulnerable,
        }
    }
}

/// `base + bonus`, floored at zero.
pub(crate) fn with_bonus(base: u32, bonus: i32) -> u32 {
    (i64::from(base) + i64::from(bonus)).clamp(0, i64::from(u32::MAX)) as u32
}

// ── Tests ──────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_kind() -> impl Strategy<Value = EffectKind> {
        prop_oneof![
            Just(EffectKind::Attack),
            Just(EffectKind::Defense),
            Just(EffectKind::Invulnerable),
        ]
    }

    proptest! {
        #[test]
        fn prop_effects_net_to_zero(
            effects in prop::collection::vec((arb_kind(), -50i32..50, 0u32..6), 0..12),
        ) {
            let mut tracker = EffectTracker::default();
            for &(kind, magnitude, duration) in &effects {
                tracker.apply(kind, magnitude, duration);
            }
            for _ in 0..6 {
                tracker.tick();
            }
            prop_assert!(tracker.is_empty());
            prop_assert_eq!(tracker.attack_bonus(), 0);
            prop_assert_eq!(tracker.defense_bonus(), 0);
            prop_assert!(!tracker.is_invulnerable());
        }

        #[test]
        fn prop_expiry_returns_every_effect_once(
            effects in prop::collection::vec((arb_kind(), 1i32..20, 1u32..5), 0..10),
        ) {
            let mut tracker = EffectTracker::default();
            for &(kind, magnitude, duration) in &effects {
                tracker.apply(kind, magnitude, duration);
            }
            let mut expired = 0;
            for _ in 0..5 {
                expired += tracker.tick().len();
            }
            prop_assert_eq!(expired, effects.len());
        }
    }
}
