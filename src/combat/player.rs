//! Combatants: the persistent player and per-spot enemies.

use crate::combat::effects::{with_bonus, EffectTracker};
use crate::config::{Item, MonsterDef, Skill};
use crate::error::CrawlError;

// ── Player ────────────────────────────────────────────────────

pub const PLAYER_HP: u32 = 100;
pub const PLAYER_MP: u32 = 50;
pub const PLAYER_ATTACK: u32 = 15;
pub const PLAYER_DEFENSE: u32 = 5;

/// Skill names remembered for combo detection.
const SKILL_HISTORY: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryItem {
    pub item: Item,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub hp: u32,
    pub max_hp: u32,
    pub mp: u32,
    pub max_mp: u32,
    pub attack: u32,
    pub defense: u32,
    pub effects: EffectTracker,
    pub inventory: Vec<InventoryItem>,
    pub skills: Vec<Skill>,
    pub recent_skills: Vec<String>,
    pub experience: u32,
    /// HP restored by an armed revive, consumed on the next knockout.
    pub pending_revive: Option<u32>,
}

impl Player {
    pub fn new(skills: Vec<Skill>) -> Self {
        Self {
            hp: PLAYER_HP,
            max_hp: PLAYER_HP,
            mp: PLAYER_MP,
            max_mp: PLAYER_MP,
            attack: PLAYER_ATTACK,
            defense: PLAYER_DEFENSE,
            effects: EffectTracker::default(),
            inventory: Vec::new(),
            skills,
            recent_skills: Vec::new(),
            experience: 0,
            pending_revive: None,
        }
    }

    pub fn effective_attack(&self) -> u32 {
        with_bonus(self.attack, self.effects.attack_bonus())
    }

    pub fn effective_defense(&self) -> u32 {
        with_bonus(self.defense, self.effects.defense_bonus())
    }

    pub fn is_down(&self) -> bool {
        self.hp == 0
    }

    /// Returns the hp actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        self.hp - before
    }

    pub fn restore_mp(&mut self, amount: u32) -> u32 {
        let before = self.mp;
        self.mp = self.mp.saturating_add(amount).min(self.max_mp);
        self.mp - before
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    pub fn add_item(&mut self, item: Item, count: u32) {
        if let Some(entry) = self.inventory.iter_mut().find(|i| i.item.name == item.name) {
            entry.count += count;
        } else {
            self.inventory.push(InventoryItem { item, count });
        }
    }

    pub fn item_count(&self, name: &str) -> u32 {
        self.inventory
            .iter()
            .find(|i| i.item.name == name)
            .map_or(0, |i| i.count)
    }

    pub fn peek_item(&self, index: usize) -> Result<&Item, CrawlError> {
        self.inventory
            .get(index)
            .map(|entry| &entry.item)
            .ok_or(CrawlError::UnknownItem(index))
    }

    /// Remove one unit from slot `index`; empty slots are dropped.
    pub fn take_item(&mut self, index: usize) -> Result<Item, CrawlError> {
        let entry = self
            .inventory
            .get_mut(index)
            .ok_or(CrawlError::UnknownItem(index))?;
        entry.count -= 1;
        let item = entry.item.clone();
        if entry.count == 0 {
            self.inventory.remove(index);
        }
        Ok(item)
    }

    /// Remember a cast; only the last two names are kept.
    pub fn record_skill(&mut self, name: &str) {
        self.recent_skills.push(name.to_string());
        if self.recent_skills.len() > SKILL_HISTORY {
            self.recent_skills.remove(0);
        }
    }

    /// The last two casts, oldest first.
    pub fn last_two_skills(&self) -> Option<(&str, &str)> {
        match self.recent_skills.as_slice() {
            [first, second] => Some((first.as_str(), second.as_str())),
            _ => None,
        }
    }

    /// Level transitions drop every temporary effect.
    pub fn clear_temporary(&mut self) {
        self.effects.clear();
    }
}

// ── Enemy ─────────────────────────────────────────────────────

/// Experience when a monster record doesn't name one.
pub const DEFAULT_EXPERIENCE: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    pub name: String,
    pub kind: String,
    pub max_hp: u32,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub is_boss: bool,
    pub experience: u32,
    /// `#rrggbb` marker colour.
    pub color: String,
    pub debuffs: EffectTracker,
}

impl Enemy {
    pub fn from_def(def: &MonsterDef) -> Self {
        Self {
            name: def.name.clone(),
            kind: def.kind.clone(),
            max_hp: def.max_hp,
            hp: def.max_hp,
            attack: def.attack,
            defense: def.defense,
            is_boss: def.is_boss,
            experience: def.experience.unwrap_or(DEFAULT_EXPERIENCE),
            color: def.color.clone(),
            debuffs: EffectTracker::default(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn effective_attack(&self) -> u32 {
        with_bonus(self.attack, self.debuffs.attack_bonus())
    }

    pub fn effective_defense(&self) -> u32 {
        with_bonus(self.defense, self.debuffs.defense_bonus())
    }

    /// Returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::effects::EffectKind;
    use crate::config::{default_items, default_skills, fallback_monster};

    #[test]
    fn new_player_stats() {
        let p = Player::new(default_skills());
        assert_eq!((p.hp, p.max_hp, p.mp, p.max_mp), (100, 100, 50, 50));
        assert_eq!(p.effective_attack(), 15);
        assert_eq!(p.effective_defense(), 5);
    }

    #[test]
    fn heal_is_capped() {
        let mut p = Player::new(Vec::new());
        p.hp = 90;
        assert_eq!(p.heal(40), 10);
        assert_eq!(p.hp, 100);
        p.mp = 0;
        assert_eq!(p.restore_mp(20), 20);
    }

    #[test]
    fn inventory_stacks_by_name() {
        let items = default_items();
        let mut p = Player::new(Vec::new());
        p.add_item(items[0].clone(), 1);
        p.add_item(items[0].clone(), 2);
        p.add_item(items[1].clone(), 1);
        assert_eq!(p.inventory.len(), 2);
        assert_eq!(p.item_count(&items[0].name), 3);

        assert_eq!(p.take_item(1).unwrap().name, items[1].name);
        assert_eq!(p.inventory.len(), 1);
        assert_eq!(p.take_item(5), Err(CrawlError::UnknownItem(5)));
    }

    #[test]
    fn skill_history_keeps_two() {
        let mut p = Player::new(Vec::new());
        p.record_skill("A");
        assert_eq!(p.last_two_skills(), None);
        p.record_skill("B");
        p.record_skill("C");
        assert_eq!(p.last_two_skills(), Some(("B", "C")));
    }

    #[test]
    fn temporary_effects_cleared() {
        let mut p = Player::new(Vec::new());
        p.effects.apply(EffectKind::Attack, 10, 3);
        assert_eq!(p.effective_attack(), 25);
        p.clear_temporary();
        assert_eq!(p.effective_attack(), 15);
    }

    #[test]
    fn enemy_debuff_floors_at_zero() {
        let mut e = Enemy::from_def(&fallback_monster());
        e.debuffs.apply(EffectKind::Attack, -20, 2);
        assert_eq!(e.effective_attack(), 0);
        assert_eq!(e.take_damage(100), 30);
        assert!(!e.is_alive());
    }
}
