//! A single playthrough: level, pose, player and the current mode.
//!
//! Exploration runs on a fixed movement tick driven by held directions;
//! battles advance one synchronous action at a time. The session owns the
//! seeded RNG so a seed reproduces the whole run.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::combat::{
    resolve_effect, BattleAction, BattleEvent, BattleSession, EffectOutcome, Player, TurnOutcome,
};
use crate::config::GameConfig;
use crate::error::CrawlError;
use crate::world::grid::NEIGHBOURS;
use crate::world::{Facing, Level, Pose};
use crate::GameRng;

/// Cells moved per tick at full input.
pub const MOVE_SPEED: f64 = 0.1;
/// Movement tick interval expected from the driver.
pub const TICK_MS: u64 = 33;
/// Euclidean cell distance under which the exit prompt shows.
pub const EXIT_RANGE: f64 = 1.5;
const MAX_MESSAGES: usize = 30;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Exploring,
    Battle(BattleSession),
    GameOver,
}

/// Held movement, relative to facing. `forward` > 0 walks ahead,
/// `strafe` > 0 sidesteps right.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveInput {
    pub forward: f64,
    pub strafe: f64,
}

impl MoveInput {
    pub fn from_keys(up: bool, down: bool, left: bool, right: bool) -> Self {
        let axis = |pos: bool, neg: bool| f64::from(u8::from(pos)) - f64::from(u8::from(neg));
        Self {
            forward: axis(up, down),
            strafe: axis(right, left),
        }
    }
}

pub struct Session {
    config: GameConfig,
    rng: GameRng,
    level: Level,
    pose: Pose,
    player: Player,
    mode: Mode,
    messages: Vec<String>,
    boss_occurrences: HashMap<String, u32>,
    /// Cell the player escaped on; battles there stay off until they leave.
    disengaged_cell: Option<(usize, usize)>,
}

impl Session {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = GameRng::seed_from_u64(seed);
        let mut boss_occurrences = HashMap::new();
        let level = Level::generate(1, &config, &mut boss_occurrences, &mut rng);
        let player = Player::new(config.skills.clone());
        let (ex, ey) = level.grid.entry();
        let mut session = Self {
            config,
            rng,
            level,
            pose: Pose::at_cell(ex, ey, Facing::North),
            player,
            mode: Mode::Exploring,
            messages: Vec::new(),
            boss_occurrences,
            disengaged_cell: None,
        };
        session.add_log("You descend into level 1.");
        tracing::info!(seed, "session started");
        session
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn battle(&self) -> Option<&BattleSession> {
        match &self.mode {
            Mode::Battle(b) => Some(b),
            _ => None,
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_over(&self) -> bool {
        self.mode == Mode::GameOver
    }

    fn player_cell(&self) -> (usize, usize) {
        let (x, y) = self.pose.cell();
        (x.max(0) as usize, y.max(0) as usize)
    }

    pub fn near_exit(&self) -> bool {
        let (x, y) = self.player_cell();
        let (ex, ey) = self.level.grid.exit();
        let dx = x as f64 - ex as f64;
        let dy = y as f64 - ey as f64;
        dx.hypot(dy) < EXIT_RANGE
    }

    /// Whether to offer the "next level" prompt.
    pub fn exit_prompt(&self) -> bool {
        self.mode == Mode::Exploring && self.near_exit()
    }

    pub fn add_log(&mut self, text: &str) {
        self.messages.push(text.to_string());
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }

    fn require_exploring(&self) -> Result<(), CrawlError> {
        match self.mode {
            Mode::Exploring => Ok(()),
            Mode::Battle(_) => Err(CrawlError::AlreadyInBattle),
            Mode::GameOver => Err(CrawlError::SessionOver),
        }
    }

    // ── Exploration ───────────────────────────────────────────

    pub fn face(&mut self, facing: Facing) {
        self.pose.facing = facing;
    }

    pub fn turn_left(&mut self) {
        self.pose.facing = self.pose.facing.turn_left();
    }

    pub fn turn_right(&mut self) {
        self.pose.facing = self.pose.facing.turn_right();
    }

    /// One movement tick. Returns whether the player moved; walking onto an
    /// active enemy starts a battle.
    pub fn tick_movement(&mut self, input: MoveInput) -> Result<bool, CrawlError> {
        self.require_exploring()?;
        let len = input.forward.hypot(input.strafe);
        if len == 0.0 {
            return Ok(false);
        }
        let forward = input.forward / len * MOVE_SPEED;
        let strafe = input.strafe / len * MOVE_SPEED;
        let (fx, fy) = self.pose.direction();
        let (rx, ry) = self.pose.right();
        let nx = self.pose.x + fx * forward + rx * strafe;
        let ny = self.pose.y + fy * forward + ry * strafe;

        if self.level.grid.is_wall(nx.floor() as i64, ny.floor() as i64) {
            return Ok(false);
        }
        self.pose.x = nx;
        self.pose.y = ny;

        let cell = self.player_cell();
        if self.disengaged_cell.is_some_and(|c| c != cell) {
            self.disengaged_cell = None;
        }
        if self.disengaged_cell.is_none() {
            let engaged = self.level.active_enemies_at(cell.0, cell.1);
            if !engaged.is_empty() {
                self.start_battle(engaged);
            }
        }
        Ok(true)
    }

    /// Walk one whole cell toward `facing` on the movement tick and settle
    /// on its centre. Stops early at a wall or when a battle starts; returns
    /// whether the player left the cell.
    pub fn step(&mut self, facing: Facing) -> Result<bool, CrawlError> {
        self.require_exploring()?;
        self.face(facing);
        let (x, y) = self.player_cell();
        let (tx, ty) = (x as i64 + facing.dx(), y as i64 + facing.dy());
        if self.level.grid.is_wall(tx, ty) {
            return Ok(false);
        }
        let ticks = (1.0 / MOVE_SPEED).round() as usize;
        for _ in 0..ticks {
            if !self.tick_movement(MoveInput {
                forward: 1.0,
                strafe: 0.0,
            })? {
                break;
            }
            if self.mode != Mode::Exploring {
                return Ok(true);
            }
        }
        let target = (tx as usize, ty as usize);
        if self.player_cell() == target {
            self.pose = Pose::at_cell(target.0, target.1, facing);
        }
        Ok(self.player_cell() != (x, y))
    }

    fn start_battle(&mut self, engaged: Vec<usize>) {
        let battle = BattleSession::start(engaged, &self.level.enemies, &mut self.player);
        let names: Vec<String> = battle.events.iter().map(ToString::to_string).collect();
        for line in &names {
            self.add_log(line);
        }
        tracing::info!(
            level = self.level.number,
            enemies = battle.engaged.len(),
            "battle started"
        );
        self.mode = Mode::Battle(battle);
    }

    pub fn pickup(&mut self) -> Result<String, CrawlError> {
        self.require_exploring()?;
        let (x, y) = self.player_cell();
        let index = self
            .level
            .active_item_at(x, y)
            .ok_or(CrawlError::NothingToPickUp)?;
        let spot = &mut self.level.items[index];
        spot.active = false;
        let item = spot.item.clone();
        let name = item.name.clone();
        self.player.add_item(item, 1);
        self.add_log(&format!("Picked up {}.", name));
        Ok(name)
    }

    /// Use an inventory item while exploring. Targeted items are refused.
    pub fn use_item_outside_battle(&mut self, index: usize) -> Result<(), CrawlError> {
        self.require_exploring()?;
        let item = self.player.peek_item(index)?;
        if item.effect.needs_target() {
            return Err(CrawlError::NoTarget(item.name.clone()));
        }
        let item = self.player.take_item(index)?;
        let mut events = vec![BattleEvent::ItemUsed {
            item: item.name.clone(),
        }];
        let outcome = resolve_effect(&item.effect, &mut self.player, &mut [], &mut events);
        for event in &events {
            self.add_log(&event.to_string());
        }
        if outcome == EffectOutcome::Teleport {
            self.teleport();
        }
        Ok(())
    }

    /// Jump to a random Empty cell without an active enemy.
    fn teleport(&mut self) {
        let grid = &self.level.grid;
        let candidates: Vec<(usize, usize)> = grid
            .empty_cells()
            .filter(|&(x, y)| self.level.active_enemies_at(x, y).is_empty())
            .collect();
        if let Some(&(x, y)) = candidates.choose(&mut self.rng) {
            self.pose = Pose::at_cell(x, y, self.pose.facing);
            self.add_log("The world twists around you.");
        }
    }

    pub fn advance_level(&mut self) -> Result<u32, CrawlError> {
        self.require_exploring()?;
        if !self.near_exit() {
            return Err(CrawlError::NotAtExit);
        }
        if let Some(boss) = self.level.active_boss() {
            return Err(CrawlError::ExitBlocked(boss.enemy.name.clone()));
        }

        self.player.clear_temporary();
        let next = self.level.number + 1;
        self.level = Level::generate(next, &self.config, &mut self.boss_occurrences, &mut self.rng);
        let (ex, ey) = self.level.grid.entry();
        self.pose = Pose::at_cell(ex, ey, Facing::North);
        self.disengaged_cell = None;
        self.add_log(&format!("You descend into level {}.", next));
        tracing::info!(
            level = next,
            boss = self.level.exit_blocked(),
            "level transition"
        );
        Ok(next)
    }

    // ── Battle ────────────────────────────────────────────────

    pub fn attack(&mut self) -> Result<TurnOutcome, CrawlError> {
        self.battle_action(BattleAction::Attack)
    }

    pub fn cast_skill(&mut self, index: usize) -> Result<TurnOutcome, CrawlError> {
        self.battle_action(BattleAction::Skill(index))
    }

    pub fn use_item(&mut self, index: usize) -> Result<TurnOutcome, CrawlError> {
        self.battle_action(BattleAction::Item(index))
    }

    pub fn flee(&mut self) -> Result<TurnOutcome, CrawlError> {
        self.battle_action(BattleAction::Flee)
    }

    pub fn battle_action(&mut self, action: BattleAction) -> Result<TurnOutcome, CrawlError> {
        let battle = match &mut self.mode {
            Mode::Battle(b) => b,
            Mode::Exploring => return Err(CrawlError::NotInBattle),
            Mode::GameOver => return Err(CrawlError::SessionOver),
        };
        let seen = battle.events.len();
        let outcome = battle.act(
            action,
            &mut self.player,
            &mut self.level.enemies,
            &self.config,
            &mut self.rng,
        )?;
        let lines: Vec<String> = battle.events[seen..].iter().map(ToString::to_string).collect();
        let turn = battle.turn;
        for line in &lines {
            self.add_log(line);
        }

        match outcome {
            TurnOutcome::Continue => {}
            TurnOutcome::Victory => {
                tracing::info!(level = self.level.number, turn, "battle won");
                self.mode = Mode::Exploring;
            }
            TurnOutcome::Defeat => {
                tracing::info!(level = self.level.number, turn, "player defeated");
                self.mode = Mode::GameOver;
            }
            TurnOutcome::Fled => {
                tracing::info!(level = self.level.number, turn, "player fled");
                self.mode = Mode::Exploring;
                self.step_aside();
            }
        }
        Ok(outcome)
    }

    /// Move to a random open neighbour without an active enemy after an
    /// escape. The landing cell won't start a battle until it's left.
    fn step_aside(&mut self) {
        let (x, y) = self.player_cell();
        let grid = &self.level.grid;
        let options: Vec<(usize, usize)> = NEIGHBOURS
            .iter()
            .map(|&(dx, dy)| (x as i64 + dx, y as i64 + dy))
            .filter(|&(nx, ny)| !grid.is_wall(nx, ny))
            .map(|(nx, ny)| (nx as usize, ny as usize))
            .filter(|&(nx, ny)| self.level.active_enemies_at(nx, ny).is_empty())
            .collect();
        if let Some(&(nx, ny)) = options.choose(&mut self.rng) {
            self.pose = Pose::at_cell(nx, ny, self.pose.facing);
        }
        self.disengaged_cell = Some(self.player_cell());
    }
}

// ── Tests ──────────────────────────────────────────────────────
