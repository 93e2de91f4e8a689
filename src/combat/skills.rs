//! Effect resolution shared by skills, items and combos.

use crate::combat::effects::EffectKind;
use crate::combat::events::BattleEvent;
use crate::combat::player::{Enemy, Player};
use crate::config::{ComboDef, EffectDescriptor, GameConfig, SpecialKind, StatKind};

/// What the caller must do after an effect resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectOutcome {
    Applied,
    /// Relocate the player: a free escape in battle, a random cell outside.
    Teleport,
}

fn first_living<'a>(targets: &'a mut [&mut Enemy]) -> Option<&'a mut Enemy> {
    targets.iter_mut().find(|e| e.is_alive()).map(|e| &mut **e)
}

fn hit(enemy: &mut Enemy, amount: u32, events: &mut Vec<BattleEvent>) {
    let damage = enemy.take_damage(amount);
    events.push(BattleEvent::PlayerHit {
        target: enemy.name.clone(),
        damage,
    });
    if !enemy.is_alive() {
        events.push(BattleEvent::EnemyDefeated {
            name: enemy.name.clone(),
        });
    }
}

/// Apply `effect` to the player and the engaged enemies.
///
/// Targeted effects with nobody left standing do nothing; callers reject
/// those requests up front when they come from the player.
pub fn resolve_effect(
    effect: &EffectDescriptor,
    player: &mut Player,
    targets: &mut [&mut Enemy],
    events: &mut Vec<BattleEvent>,
) -> EffectOutcome {
    match *effect {
        EffectDescriptor::Damage { value } => {
            if let Some(enemy) = first_living(targets) {
                hit(enemy, value, events);
            }
        }
        EffectDescriptor::Heal { value } => {
            let amount = player.heal(value);
            events.push(BattleEvent::Healed { amount });
        }
        EffectDescriptor::RestoreMp { value } => {
            let amount = player.restore_mp(value);
            events.push(BattleEvent::MpRestored { amount });
        }
        EffectDescriptor::Buff {
            stat,
            value,
            duration,
        } => {
            let kind = EffectKind::from(stat);
            player.effects.apply(kind, value as i32, duration);
            events.push(BattleEvent::Buffed {
                kind,
                value,
                turns: duration.max(1),
            });
        }
        EffectDescriptor::Debuff {
            stat,
            value,
            duration,
        } => {
            if let Some(enemy) = first_living(targets) {
                let kind = EffectKind::from(stat);
                enemy.debuffs.apply(kind, -(value as i32), duration);
                events.push(BattleEvent::Debuffed {
                    target: enemy.name.clone(),
                    kind,
                    value,
                    turns: duration.max(1),
                });
            }
        }
        EffectDescriptor::MultiTarget { value } => {
            for enemy in targets.iter_mut().filter(|e| e.is_alive()) {
                hit(enemy, value, events);
            }
        }
        EffectDescriptor::PermanentStat { stat, value } => {
            match stat {
                StatKind::Attack => player.attack += value,
                StatKind::Defense => player.defense += value,
                StatKind::MaxHp => {
                    player.max_hp += value;
                    player.hp += value;
                }
                StatKind::MaxMp => {
                    player.max_mp += value;
                    player.mp += value;
                }
            }
            events.push(BattleEvent::StatRaised { stat, value });
        }
        EffectDescriptor::Special { kind, value } => match kind {
            SpecialKind::Revive => {
                player.pending_revive = Some(value.max(1));
                events.push(BattleEvent::ReviveArmed { hp: value.max(1) });
            }
            SpecialKind::Invulnerable => {
                player.effects.apply(EffectKind::Invulnerable, 1, value);
                events.push(BattleEvent::Invulnerable {
                    turns: value.max(1),
                });
            }
            SpecialKind::Teleport => return EffectOutcome::Teleport,
            SpecialKind::Experience => {
                player.experience += value;
                events.push(BattleEvent::ExperienceGained { amount: value });
            }
        },
    }
    EffectOutcome::Applied
}

/// Combo matching the player's last two casts, if any.
pub fn detect_combo<'a>(player: &Player, config: &'a GameConfig) -> Option<&'a ComboDef> {
    let (first, second) = player.last_two_skills()?;
    config.combo(first, second)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{fallback_monster, EffectStat};

    fn goblins(n: usize) -> Vec<Enemy> {
        (0..n).map(|_| Enemy::from_def(&fallback_monster())).collect()
    }

    fn resolve(
        effect: EffectDescriptor,
        player: &mut Player,
        enemies: &mut [Enemy],
    ) -> Vec<BattleEvent> {
        let mut targets: Vec<&mut Enemy> = enemies.iter_mut().collect();
        let mut events = Vec::new();
        resolve_effect(&effect, player, &mut targets, &mut events);
        events
    }

    #[test]
    fn damage_hits_first_living_target() {
        let mut player = Player::new(Vec::new());
        let mut enemies = goblins(2);
        enemies[0].hp = 0;
        resolve(EffectDescriptor::Damage { value: 12 }, &mut player, &mut enemies);
        assert_eq!(enemies[1].hp, 18);
    }

    #[test]
    fn multi_target_hits_every_living_enemy() {
        let mut player = Player::new(Vec::new());
        let mut enemies = goblins(3);
        let events = resolve(
            EffectDescriptor::MultiTarget { value: 30 },
            &mut player,
            &mut enemies,
        );
        assert!(enemies.iter().all(|e| !e.is_alive()));
        let defeated = events
            .iter()
            .filter(|e| matches!(e, BattleEvent::EnemyDefeated { .. }))
            .count();
        assert_eq!(defeated, 3);
    }

    #[test]
    fn debuff_lowers_enemy_attack() {
        let mut player = Player::new(Vec::new());
        let mut enemies = goblins(1);
        resolve(
            EffectDescriptor::Debuff {
                stat: EffectStat::Attack,
                value: 5,
                duration: 2,
            },
            &mut player,
            &mut enemies,
        );
        assert_eq!(enemies[0].effective_attack(), 3);
    }

    #[test]
    fn permanent_max_hp_raises_current() {
        let mut player = Player::new(Vec::new());
        player.hp = 60;
        resolve(
            EffectDescriptor::PermanentStat {
                stat: StatKind::MaxHp,
                value: 10,
            },
            &mut player,
            &mut [],
        );
        assert_eq!((player.hp, player.max_hp), (70, 110));
    }

    #[test]
    fn specials() {
        let mut player = Player::new(Vec::new());
        resolve(
            EffectDescriptor::Special {
                kind: SpecialKind::Revive,
                value: 50,
            },
            &mut player,
            &mut [],
        );
        assert_eq!(player.pending_revive, Some(50));

        resolve(
            EffectDescriptor::Special {
                kind: SpecialKind::Invulnerable,
                value: 2,
            },
            &mut player,
            &mut [],
        );
        assert!(player.effects.is_invulnerable());

        let mut events = Vec::new();
        let outcome = resolve_effect(
            &EffectDescriptor::Special {
                kind: SpecialKind::Teleport,
                value: 1,
            },
            &mut player,
            &mut [],
            &mut events,
        );
        assert_eq!(outcome, EffectOutcome::Teleport);
    }

    #[test]
    fn combos_are_order_sensitive() {
        let config = GameConfig::default();
        let mut player = Player::new(Vec::new());
        player.record_skill("Chain Lightning");
        player.record_skill("Fireball");
        assert!(detect_combo(&player, &config).is_none());
        player.record_skill("Chain Lightning");
        assert_eq!(
            detect_combo(&player, &config).map(|c| c.name.as_str()),
            Some("Firestorm")
        );
    }
}
