//! Typed battle log entries.

use std::fmt;

use crate::combat::effects::EffectKind;
use crate::config::StatKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BattleEvent {
    Encounter { name: String, boss: bool },
    PlayerHit { target: String, damage: u32 },
    SkillCast { skill: String, mp: u32 },
    ItemUsed { item: String },
    Combo { name: String },
    Healed { amount: u32 },
    MpRestored { amount: u32 },
    Buffed { kind: EffectKind, value: u32, turns: u32 },
    Debuffed { target: String, kind: EffectKind, value: u32, turns: u32 },
    StatRaised { stat: StatKind, value: u32 },
    ReviveArmed { hp: u32 },
    Invulnerable { turns: u32 },
    ExperienceGained { amount: u32 },
    Escaped,
    FleeFailed,
    EnemyHit { attacker: String, damage: u32 },
    AttackBlocked { attacker: String },
    EffectExpired { kind: EffectKind },
    DebuffExpired { target: String, kind: EffectKind },
    EnemyDefeated { name: String },
    Revived { hp: u32 },
    Victory { experience: u32 },
    Loot { item: String },
    Defeat,
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BattleEvent::*;
        match self {
            Encounter { name, boss: true } => write!(f, "{} blocks the way!", name),
            Encounter { name, boss: false } => write!(f, "A {} appears!", name),
            PlayerHit { target, damage } => write!(f, "You hit {} for {} damage.", target, damage),
            SkillCast { skill, mp } => write!(f, "You cast {} ({} MP).", skill, mp),
            ItemUsed { item } => write!(f, "You use {}.", item),
            Combo { name } => write!(f, "Combo! {}!", name),
            Healed { amount } => write!(f, "Recovered {} HP.", amount),
            MpRestored { amount } => write!(f, "Recovered {} MP.", amount),
            Buffed { kind, value, turns } => {
                write!(f, "{} +{} for {} turns.", kind, value, turns)
            }
            Debuffed {
                target,
                kind,
                value,
                turns,
            } => write!(f, "{} {} -{} for {} turns.", target, kind, value, turns),
            StatRaised { stat, value } => {
                let label = match stat {
                    StatKind::Attack => "ATK",
                    StatKind::Defense => "DEF",
                    StatKind::MaxHp => "Max HP",
                    StatKind::MaxMp => "Max MP",
                };
                write!(f, "{} permanently +{}.", label, value)
            }
            ReviveArmed { hp } => write!(f, "A revive is ready ({} HP).", hp),
            Invulnerable { turns } => write!(f, "Untouchable for {} turns.", turns),
            ExperienceGained { amount } => write!(f, "Gained {} EXP.", amount),
            Escaped => f.write_str("You got away!"),
            FleeFailed => f.write_str("Couldn't escape!"),
            EnemyHit { attacker, damage } => {
                write!(f, "{} hits you for {} damage.", attacker, damage)
            }
            AttackBlocked { attacker } => write!(f, "{}'s attack is blocked.", attacker),
            EffectExpired { kind } => write!(f, "Your {} effect wore off.", kind),
            DebuffExpired { target, kind } => write!(f, "{}'s {} recovers.", target, kind),
            EnemyDefeated { name } => write!(f, "{} is defeated!", name),
            Revived { hp } => write!(f, "You rise again with {} HP!", hp),
            Victory { experience } => write!(f, "Victory! +{} EXP.", experience),
            Loot { item } => write!(f, "Found {}.", item),
            Defeat => f.write_str("You have fallen..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_read_as_sentences() {
        let hit = BattleEvent::EnemyHit {
            attacker: "Goblin".into(),
            damage: 6,
        };
        assert_eq!(hit.to_string(), "Goblin hits you for 6 damage.");
        let buff = BattleEvent::Buffed {
            kind: EffectKind::Attack,
            value: 10,
            turns: 3,
        };
        assert_eq!(buff.to_string(), "ATK +10 for 3 turns.");
    }
}
