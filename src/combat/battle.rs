//! Turn-based battle state machine.
//!
//! One [`BattleSession`] covers an encounter from entry to a terminal
//! outcome. Each action resolves fully: the player's move, an immediate
//! victory check, enemy retaliation, the knockout check and finally the
//! effect tick. Rejected actions leave every participant untouched.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::combat::events::BattleEvent;
use crate::combat::player::{Enemy, Player};
use crate::combat::skills::{detect_combo, resolve_effect, EffectOutcome};
use crate::config::GameConfig;
use crate::error::CrawlError;
use crate::world::EnemySpot;

/// Chance that a flee attempt succeeds.
pub const FLEE_CHANCE: f64 = 0.7;
/// HP restored after every victory.
pub const VICTORY_HEAL: u32 = 10;
/// Extra random items dropped by a boss.
pub const BOSS_LOOT: usize = 2;

/// Enemy damage against the player: `attack - defense / 2`, never below 1.
pub fn retaliation_damage(enemy_attack: u32, player_defense: u32) -> u32 {
    enemy_attack.saturating_sub(player_defense / 2).max(1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattlePhase {
    SelectAction,
    Victory,
    Defeat,
    Fled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleAction {
    Attack,
    Skill(usize),
    Item(usize),
    Flee,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    Victory,
    Defeat,
    Fled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleSession {
    /// Indices into the level's enemy spots.
    pub engaged: Vec<usize>,
    pub phase: BattlePhase,
    pub events: Vec<BattleEvent>,
    pub turn: u32,
}

impl BattleSession {
    /// Open a battle against `engaged`. Combo history starts fresh.
    pub fn start(engaged: Vec<usize>, spots: &[EnemySpot], player: &mut Player) -> Self {
        player.recent_skills.clear();
        let events = engaged
            .iter()
            .filter_map(|&i| spots.get(i))
            .map(|spot| BattleEvent::Encounter {
                name: spot.enemy.name.clone(),
                boss: spot.enemy.is_boss,
            })
            .collect();
        Self {
            engaged,
            phase: BattlePhase::SelectAction,
            events,
            turn: 0,
        }
    }

    pub fn participants<'a>(
        &'a self,
        spots: &'a [EnemySpot],
    ) -> impl Iterator<Item = &'a Enemy> + 'a {
        self.engaged
            .iter()
            .filter_map(move |&i| spots.get(i))
            .map(|spot| &spot.enemy)
    }

    /// Actions the player can take right now.
    pub fn available_actions(&self, player: &Player) -> Vec<BattleAction> {
        if self.phase != BattlePhase::SelectAction {
            return Vec::new();
        }
        let mut actions = vec![BattleAction::Attack];
        actions.extend(
            player
                .skills
                .iter()
                .enumerate()
                .filter(|(_, s)| s.mp_cost <= player.mp)
                .map(|(i, _)| BattleAction::Skill(i)),
        );
        actions.extend((0..player.inventory.len()).map(BattleAction::Item));
        actions.push(BattleAction::Flee);
        actions
    }

    fn targets<'a>(&self, spots: &'a mut [EnemySpot]) -> Vec<&'a mut Enemy> {
        spots
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| self.engaged.contains(i))
            .map(|(_, spot)| &mut spot.enemy)
            .collect()
    }

    fn all_down(&self, spots: &[EnemySpot]) -> bool {
        self.participants(spots).all(|e| !e.is_alive())
    }

    /// Resolve one player action and everything that follows it.
    pub fn act(
        &mut self,
        action: BattleAction,
        player: &mut Player,
        spots: &mut [EnemySpot],
        config: &GameConfig,
        rng: &mut impl Rng,
    ) -> Result<TurnOutcome, CrawlError> {
        match self.phase {
            BattlePhase::SelectAction => {}
            BattlePhase::Defeat => return Err(CrawlError::SessionOver),
            BattlePhase::Victory | BattlePhase::Fled => return Err(CrawlError::NotInBattle),
        }
        let has_target = self.participants(spots).any(Enemy::is_alive);

        // ── Player action ──
        let escaped = match action {
            BattleAction::Attack => {
                let damage = player.effective_attack();
                let mut targets = self.targets(spots);
                let enemy = targets
                    .iter_mut()
                    .find(|e| e.is_alive())
                    .ok_or_else(|| CrawlError::NoTarget("attack".into()))?;
                let dealt = enemy.take_damage(damage);
                self.events.push(BattleEvent::PlayerHit {
                    target: enemy.name.clone(),
                    damage: dealt,
                });
                if !enemy.is_alive() {
                    self.events.push(BattleEvent::EnemyDefeated {
                        name: enemy.name.clone(),
                    });
                }
                false
            }
            BattleAction::Skill(index) => {
                let skill = player
                    .skills
                    .get(index)
                    .cloned()
                    .ok_or(CrawlError::UnknownSkill(index))?;
                if player.mp < skill.mp_cost {
                    return Err(CrawlError::NotEnoughMp {
                        required: skill.mp_cost,
                        available: player.mp,
                    });
                }
                if skill.effect.needs_target() && !has_target {
                    return Err(CrawlError::NoTarget(skill.name));
                }
                player.mp -= skill.mp_cost;
                self.events.push(BattleEvent::SkillCast {
                    skill: skill.name.clone(),
                    mp: skill.mp_cost,
                });
                let mut targets = self.targets(spots);
                let mut outcome =
                    resolve_effect(&skill.effect, player, &mut targets, &mut self.events);
                player.record_skill(&skill.name);
                if let Some(combo) = detect_combo(player, config) {
                    self.events.push(BattleEvent::Combo {
                        name: combo.name.clone(),
                    });
                    if resolve_effect(&combo.effect, player, &mut targets, &mut self.events)
                        == EffectOutcome::Teleport
                    {
                        outcome = EffectOutcome::Teleport;
                    }
                    player.recent_skills.clear();
                }
                outcome == EffectOutcome::Teleport
            }
            BattleAction::Item(index) => {
                let item = player.peek_item(index)?;
                if item.effect.needs_target() && !has_target {
                    return Err(CrawlError::NoTarget(item.name.clone()));
                }
                let item = player.take_item(index)?;
                self.events.push(BattleEvent::ItemUsed {
                    item: item.name.clone(),
                });
                let mut targets = self.targets(spots);
                resolve_effect(&item.effect, player, &mut targets, &mut self.events)
                    == EffectOutcome::Teleport
            }
            BattleAction::Flee => {
                if rng.gen_bool(FLEE_CHANCE) {
                    true
                } else {
                    self.events.push(BattleEvent::FleeFailed);
                    false
                }
            }
        };

        if escaped {
            self.events.push(BattleEvent::Escaped);
            self.phase = BattlePhase::Fled;
            return Ok(TurnOutcome::Fled);
        }

        if self.all_down(spots) {
            self.resolve_victory(player, spots, config, rng);
            return Ok(TurnOutcome::Victory);
        }

        // ── Retaliation ──
        let player_defense = player.effective_defense();
        let attackers: Vec<(String, u32)> = self
            .participants(spots)
            .filter(|e| e.is_alive())
            .map(|e| (e.name.clone(), e.effective_attack()))
            .collect();
        for (attacker, attack) in attackers {
            if player.effects.is_invulnerable() {
                self.events.push(BattleEvent::AttackBlocked { attacker });
                continue;
            }
            let damage = retaliation_damage(attack, player_defense);
            player.take_damage(damage);
            self.events.push(BattleEvent::EnemyHit { attacker, damage });
        }
        self.turn += 1;

        if player.is_down() {
            match player.pending_revive.take() {
                Some(hp) => {
                    player.hp = hp.min(player.max_hp);
                    self.events.push(BattleEvent::Revived { hp: player.hp });
                }
                None => {
                    self.events.push(BattleEvent::Defeat);
                    self.phase = BattlePhase::Defeat;
                    return Ok(TurnOutcome::Defeat);
                }
            }
        }

        // ── Effect tick ──
        for expired in player.effects.tick() {
            self.events.push(BattleEvent::EffectExpired { kind: expired.kind });
        }
        for enemy in self.targets(spots) {
            for expired in enemy.debuffs.tick() {
                self.events.push(BattleEvent::DebuffExpired {
                    target: enemy.name.clone(),
                    kind: expired.kind,
                });
            }
        }

        Ok(TurnOutcome::Continue)
    }

    fn resolve_victory(
        &mut self,
        player: &mut Player,
        spots: &mut [EnemySpot],
        config: &GameConfig,
        rng: &mut impl Rng,
    ) {
        let mut experience = 0;
        let mut bosses = 0;
        for &i in &self.engaged {
            if let Some(spot) = spots.get_mut(i) {
                spot.active = false;
                experience += spot.enemy.experience;
                if spot.enemy.is_boss {
                    bosses += 1;
                }
            }
        }
        player.experience += experience;
        player.heal(VICTORY_HEAL);
        self.events.push(BattleEvent::Victory { experience });

        for _ in 0..bosses * BOSS_LOOT {
            if let Some(item) = config.items.choose(rng) {
                self.events.push(BattleEvent::Loot {
                    item: item.name.clone(),
                });
                player.add_item(item.clone(), 1);
            }
        }
        self.phase = BattlePhase::Victory;
    }
}

// ── Tests ──────────────────────────────────────────────────────
