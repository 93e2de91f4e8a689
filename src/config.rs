//! Definition records: monsters, bosses, skills, items and combos.
//!
//! A [`GameConfig`] is built once at startup and passed by reference to the
//! generator, the content placer and the skill resolver. Records come from
//! JSON documents shaped like `{ "monsters": [ ... ] }`. Each record is
//! parsed on its own: a malformed record is skipped, and a document that is
//! missing, unreadable or yields no usable record falls back to the built-in
//! defaults of that kind. Loading never fails.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ── Effect Descriptor ─────────────────────────────────────────

/// Stat touched by a temporary buff or debuff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectStat {
    #[default]
    Attack,
    Defense,
}

/// Stat raised by a permanent upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Attack,
    Defense,
    MaxHp,
    MaxMp,
}

/// Effects that don't fit the stat model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    /// Arms a one-shot revive; `value` is the hp restored.
    Revive,
    /// Enemy attacks deal nothing for `value` turns.
    Invulnerable,
    /// Random relocation; in battle this is a guaranteed escape.
    Teleport,
    /// Grants `value` experience.
    Experience,
}

fn default_damage() -> u32 {
    25
}
fn default_heal() -> u32 {
    40
}
fn default_restore() -> u32 {
    20
}
fn default_modifier() -> u32 {
    10
}
fn default_duration() -> u32 {
    3
}
fn default_multi() -> u32 {
    30
}
fn default_special() -> u32 {
    1
}

/// What a skill or item does. Missing numeric fields take the same
/// defaults the built-in records use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectDescriptor {
    Damage {
        #[serde(default = "default_damage")]
        value: u32,
    },
    Heal {
        #[serde(default = "default_heal")]
        value: u32,
    },
    RestoreMp {
        #[serde(default = "default_restore")]
        value: u32,
    },
    Buff {
        #[serde(default)]
        stat: EffectStat,
        #[serde(default = "default_modifier")]
        value: u32,
        #[serde(default = "default_duration")]
        duration: u32,
    },
    Debuff {
        #[serde(default)]
        stat: EffectStat,
        #[serde(default = "default_modifier")]
        value: u32,
        #[serde(default = "default_duration")]
        duration: u32,
    },
    MultiTarget {
        #[serde(default = "default_multi")]
        value: u32,
    },
    PermanentStat {
        stat: StatKind,
        value: u32,
    },
    Special {
        kind: SpecialKind,
        #[serde(default = "default_special")]
        value: u32,
    },
}

impl EffectDescriptor {
    /// Whether resolving this effect needs a living enemy.
    pub fn needs_target(&self) -> bool {
        matches!(
            self,
            EffectDescriptor::Damage { .. }
                | EffectDescriptor::Debuff { .. }
                | EffectDescriptor::MultiTarget { .. }
        )
    }
}

// ── Records ───────────────────────────────────────────────────

fn default_color() -> String {
    "#ff9999".into()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterDef {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    /// `#rrggbb` marker colour for the minimap.
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub is_boss: bool,
    #[serde(default)]
    pub experience: Option<u32>,
}

fn default_occurrences() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossDef {
    /// Monster type this boss is built from.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub spawn_level: u32,
    /// How many times this boss may appear in one run.
    #[serde(default = "default_occurrences")]
    pub max_occurrences: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default, alias = "cost")]
    pub mp_cost: u32,
    #[serde(default)]
    pub description: String,
    pub effect: EffectDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub effect: EffectDescriptor,
}

/// Bonus effect for casting `first` then `second`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboDef {
    pub first: String,
    pub second: String,
    pub name: String,
    pub effect: EffectDescriptor,
}

/// Anything that can be dropped if it's obviously unusable after parsing.
trait Record {
    fn is_usable(&self) -> bool;
}

impl Record for MonsterDef {
    fn is_usable(&self) -> bool {
        !self.kind.is_empty() && self.max_hp > 0
    }
}

impl Record for BossDef {
    fn is_usable(&self) -> bool {
        !self.kind.is_empty() && self.max_occurrences > 0
    }
}

impl Record for Skill {
    fn is_usable(&self) -> bool {
        !self.name.is_empty()
    }
}

impl Record for Item {
    fn is_usable(&self) -> bool {
        !self.name.is_empty()
    }
}

impl Record for ComboDef {
    fn is_usable(&self) -> bool {
        !self.first.is_empty() && !self.second.is_empty()
    }
}

// ── Built-in Defaults ─────────────────────────────────────────

fn monster(
    kind: &str,
    name: &str,
    hp: u32,
    atk: u32,
    def: u32,
    color: &str,
    exp: u32,
) -> MonsterDef {
    MonsterDef {
        kind: kind.into(),
        name: name.into(),
        max_hp: hp,
        attack: atk,
        defense: def,
        color: color.into(),
        is_boss: false,
        experience: Some(exp),
    }
}

pub fn default_monsters() -> Vec<MonsterDef> {
    vec![
        monster("goblin", "Goblin", 30, 8, 2, "#6abf4b", 10),
        monster("skeleton", "Skeleton", 40, 12, 3, "#e0e0e0", 15),
        monster("spider", "Giant Spider", 50, 15, 1, "#9c27b0", 8),
        monster("orc", "Orc", 60, 18, 4, "#c0803a", 20),
        MonsterDef {
            is_boss: true,
            ..monster("dragon", "Red Dragon", 200, 25, 10, "#ff3030", 100)
        },
        MonsterDef {
            is_boss: true,
            ..monster("demon_king", "Demon King", 400, 35, 15, "#b040ff", 300)
        },
    ]
}

pub fn default_bosses() -> Vec<BossDef> {
    vec![
        BossDef {
            kind: "dragon".into(),
            name: "Red Dragon".into(),
            spawn_level: 10,
            max_occurrences: 2,
        },
        BossDef {
            kind: "demon_king".into(),
            name: "Demon King".into(),
            spawn_level: 20,
            max_occurrences: 1,
        },
    ]
}

fn skill(name: &str, mp_cost: u32, description: &str, effect: EffectDescriptor) -> Skill {
    Skill {
        name: name.into(),
        mp_cost,
        description: description.into(),
        effect,
    }
}

pub fn default_skills() -> Vec<Skill> {
    use EffectDescriptor::*;
    vec![
        skill("Fireball", 10, "Hurls fire at one enemy", Damage { value: 25 }),
        skill("Healing Light", 15, "Restores 40 HP", Heal { value: 40 }),
        skill(
            "Battle Cry",
            8,
            "ATK +10 for 3 turns",
            Buff {
                stat: EffectStat::Attack,
                value: 10,
                duration: 3,
            },
        ),
        skill(
            "Stone Skin",
            8,
            "DEF +5 for 3 turns",
            Buff {
                stat: EffectStat::Defense,
                value: 5,
                duration: 3,
            },
        ),
        skill(
            "Hex",
            6,
            "Enemy ATK -5 for 3 turns",
            Debuff {
                stat: EffectStat::Attack,
                value: 5,
                duration: 3,
            },
        ),
        skill("Chain Lightning", 20, "Strikes every foe", MultiTarget { value: 30 }),
    ]
}

fn item(name: &str, description: &str, effect: EffectDescriptor) -> Item {
    Item {
        name: name.into(),
        description: description.into(),
        effect,
    }
}

pub fn default_items() -> Vec<Item> {
    use EffectDescriptor::*;
    vec![
        item("Healing Potion", "Restores 30 HP", Heal { value: 30 }),
        item("Mana Potion", "Restores 20 MP", RestoreMp { value: 20 }),
        item(
            "Strength Elixir",
            "ATK +10 for 3 turns",
            Buff {
                stat: EffectStat::Attack,
                value: 10,
                duration: 3,
            },
        ),
        item(
            "Guard Tonic",
            "DEF +5 for 3 turns",
            Buff {
                stat: EffectStat::Defense,
                value: 5,
                duration: 3,
            },
        ),
        item(
            "Phoenix Feather",
            "Revives with 50 HP once",
            Special {
                kind: SpecialKind::Revive,
                value: 50,
            },
        ),
        item(
            "Warding Scroll",
            "Ignore enemy attacks for 2 turns",
            Special {
                kind: SpecialKind::Invulnerable,
                value: 2,
            },
        ),
        item(
            "Teleport Scroll",
            "Whisks you somewhere else",
            Special {
                kind: SpecialKind::Teleport,
                value: 1,
            },
        ),
        item(
            "Giant's Heart",
            "Max HP +10",
            PermanentStat {
                stat: StatKind::MaxHp,
                value: 10,
            },
        ),
    ]
}

pub fn default_combos() -> Vec<ComboDef> {
    use EffectDescriptor::*;
    vec![
        ComboDef {
            first: "Fireball".into(),
            second: "Chain Lightning".into(),
            name: "Firestorm".into(),
            effect: MultiTarget { value: 45 },
        },
        ComboDef {
            first: "Battle Cry".into(),
            second: "Fireball".into(),
            name: "Blazing Strike".into(),
            effect: Damage { value: 40 },
        },
        ComboDef {
            first: "Stone Skin".into(),
            second: "Healing Light".into(),
            name: "Sanctuary".into(),
            effect: Buff {
                stat: EffectStat::Defense,
                value: 12,
                duration: 4,
            },
        },
    ]
}

/// Record returned when a monster lookup misses.
pub fn fallback_monster() -> MonsterDef {
    monster("goblin", "Goblin", 30, 8, 2, "#6abf4b", 10)
}

// ── Loading ───────────────────────────────────────────────────

/// Parse the array under `key`, keeping only records that deserialize and
/// pass [`Record::is_usable`].
fn parse_records<T: DeserializeOwned + Record>(source: &str, key: &str) -> Vec<T> {
    let document: serde_json::Value = match serde_json::from_str(source) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(key, %err, "malformed config document");
            return Vec::new();
        }
    };
    let Some(entries) = document.get(key).and_then(|v| v.as_array()) else {
        tracing::warn!(key, "config document has no record list");
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<T>(entry.clone()) {
            Ok(record) if record.is_usable() => Some(record),
            Ok(_) => {
                tracing::warn!(key, index, "skipping unusable config record");
                None
            }
            Err(err) => {
                tracing::warn!(key, index, %err, "skipping malformed config record");
                None
            }
        })
        .collect()
}

fn records_or_default<T: DeserializeOwned + Record>(
    source: Option<&str>,
    key: &str,
    defaults: fn() -> Vec<T>,
) -> Vec<T> {
    let parsed = source.map(|s| parse_records(s, key)).unwrap_or_default();
    if parsed.is_empty() {
        if source.is_some() {
            tracing::warn!(key, "no usable records, using built-in defaults");
        }
        defaults()
    } else {
        parsed
    }
}

/// Raw JSON documents, one per record kind. `None` means "not supplied".
#[derive(Clone, Debug, Default)]
pub struct ConfigDocuments<'a> {
    pub monsters: Option<&'a str>,
    pub bosses: Option<&'a str>,
    pub skills: Option<&'a str>,
    pub items: Option<&'a str>,
    pub combos: Option<&'a str>,
}

// ── Game Config ───────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub monsters: Vec<MonsterDef>,
    pub bosses: Vec<BossDef>,
    pub skills: Vec<Skill>,
    pub items: Vec<Item>,
    pub combos: Vec<ComboDef>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            monsters: default_monsters(),
            bosses: default_bosses(),
            skills: default_skills(),
            items: default_items(),
            combos: default_combos(),
        }
    }
}

impl GameConfig {
    pub fn from_json_documents(documents: &ConfigDocuments<'_>) -> Self {
        Self {
            monsters: records_or_default(documents.monsters, "monsters", default_monsters),
            bosses: records_or_default(documents.bosses, "bosses", default_bosses),
            skills: records_or_default(documents.skills, "skills", default_skills),
            items: records_or_default(documents.items, "items", default_items),
            combos: records_or_default(documents.combos, "combos", default_combos),
        }
    }

    /// Read `monsters.json`, `bosses.json`, `skills.json`, `items.json` and
    /// `combos.json` from `dir`. Missing files are not an error.
    pub fn from_dir(dir: &Path) -> Self {
        let read = |name: &str| -> Option<String> {
            let path = dir.join(name);
            match fs::read_to_string(&path) {
                Ok(text) => Some(text),
                Err(err) => {
                    tracing::debug!(path = %path.display(), %err, "config file not read");
                    None
                }
            }
        };
        let monsters = read("monsters.json");
        let bosses = read("bosses.json");
        let skills = read("skills.json");
        let items = read("items.json");
        let combos = read("combos.json");

        Self::from_json_documents(&ConfigDocuments {
            monsters: monsters.as_deref(),
            bosses: bosses.as_deref(),
            skills: skills.as_deref(),
            items: items.as_deref(),
            combos: combos.as_deref(),
        })
    }

    /// Monster definition for `kind`, or the built-in fallback.
    pub fn monster(&self, kind: &str) -> MonsterDef {
        self.monsters
            .iter()
            .find(|m| m.kind == kind)
            .cloned()
            .unwrap_or_else(fallback_monster)
    }

    /// Non-boss monsters, the pool for normal enemy spots.
    pub fn normal_monsters(&self) -> Vec<&MonsterDef> {
        self.monsters.iter().filter(|m| !m.is_boss).collect()
    }

    /// Combo triggered by casting `first` then `second`.
    pub fn combo(&self, first: &str, second: &str) -> Option<&ComboDef> {
        self.combos
            .iter()
            .find(|c| c.first == first && c.second == second)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_populated() {
        let config = GameConfig::default();
        assert!(!config.normal_monsters().is_empty());
        assert!(config.monsters.iter().any(|m| m.is_boss));
        assert!(!config.skills.is_empty());
        assert!(!config.items.is_empty());
        assert!(config.combo("Fireball", "Chain Lightning").is_some());
    }

    #[test]
    fn combo_lookup_is_order_sensitive() {
        let config = GameConfig::default();
        assert!(config.combo("Chain Lightning", "Fireball").is_none());
    }

    #[test]
    fn effect_fields_fall_back_to_defaults() {
        let effect: EffectDescriptor = serde_json::from_str(r#"{"type":"buff"}"#).unwrap();
        assert_eq!(
            effect,
            EffectDescriptor::Buff {
                stat: EffectStat::Attack,
                value: 10,
                duration: 3
            }
        );
        let effect: EffectDescriptor =
            serde_json::from_str(r#"{"type":"special","kind":"revive","value":50}"#).unwrap();
        assert_eq!(
            effect,
            EffectDescriptor::Special {
                kind: SpecialKind::Revive,
                value: 50
            }
        );
    }

    #[test]
    fn malformed_records_are_skipped() {
        let source = r#"{"monsters": [
            {"type": "bat", "name": "Bat", "max_hp": 12, "attack": 4, "defense": 0},
            {"type": "broken", "name": "No stats"},
            {"type": "ghost", "name": "Ghost", "max_hp": 0, "attack": 1, "defense": 1}
        ]}"#;
        let config = GameConfig::from_json_documents(&ConfigDocuments {
            monsters: Some(source),
            ..Default::default()
        });
        assert_eq!(config.monsters.len(), 1);
        assert_eq!(config.monsters[0].kind, "bat");
        assert_eq!(config.monsters[0].color, "#ff9999");
    }

    #[test]
    fn unreadable_document_falls_back() {
        let config = GameConfig::from_json_documents(&ConfigDocuments {
            skills: Some("{ not json"),
            items: Some(r#"{"wrong_key": []}"#),
            ..Default::default()
        });
        assert_eq!(config.skills, default_skills());
        assert_eq!(config.items, default_items());
    }

    #[test]
    fn skill_cost_accepts_alias() {
        let source = r#"{"skills": [
            {"name": "Spark", "cost": 3, "effect": {"type": "damage", "value": 7}}
        ]}"#;
        let config = GameConfig::from_json_documents(&ConfigDocuments {
            skills: Some(source),
            ..Default::default()
        });
        assert_eq!(config.skills[0].mp_cost, 3);
        assert_eq!(config.skills[0].effect, EffectDescriptor::Damage { value: 7 });
    }

    #[test]
    fn missing_monster_uses_fallback() {
        let config = GameConfig::default();
        assert_eq!(config.monster("unicorn"), fallback_monster());
        assert_eq!(config.monster("orc").name, "Orc");
    }

    #[test]
    fn missing_dir_uses_defaults() {
        let config = GameConfig::from_dir(Path::new("/nonexistent/maze-crawler-config"));
        assert_eq!(config, GameConfig::default());
    }
}
