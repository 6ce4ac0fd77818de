use rand::RngCore;
use tracing::{debug, info};

use crate::components::Direction;
use crate::error::{BoardError, LevelError};
use crate::level::{Level, Transition};
use crate::map::{self, Map};
use crate::player::Player;
use crate::random::Random;

pub const TICKS_PER_SECOND: u32 = 30;
pub const START_LIVES: i32 = 4;
pub const DEBUG_START_LIVES: i32 = 99;
pub const WORLD_TIME_SECS: u32 = 800;
pub const DEBUG_WORLD_TIME_SECS: u32 = 9999;
pub const TIME_BONUS_PER_SECOND: u32 = 10;

const START_SCORE: u32 = 0;
const START_MAX_BOMBS: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    PlaceBomb,
    KillAll,
    DestroyWalls,
    ToggleImmortality,
    ToggleUltraspeed,
    Suicide,
    Forfeit,
}

impl Command {
    pub fn is_debug(self) -> bool {
        !matches!(self, Command::Move(_) | Command::PlaceBomb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Victory,
    Defeat,
    BonusExit,
}

pub fn bomb_cap(level: usize) -> u16 {
    match level {
        0 => 1,
        1 | 2 => 2,
        _ => 3,
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    player: Player,
    levels: Vec<Level>,
    completed: Vec<bool>,
    current: usize,
    world_time: u32,
    debug: bool,
    bonus: bool,
    status: Status,
}

impl Game {
    pub fn campaign(seed: u64, debug: bool) -> Result<Self, LevelError> {
        Self::with_maps(&map::campaign(), seed, debug)
    }

    pub fn with_maps(maps: &[Map], seed: u64, debug: bool) -> Result<Self, LevelError> {
        let mut game = Self::build(maps, seed, debug, false)?;
        game.set_current_level(0, Transition::None)?;
        Ok(game)
    }

    /// A single user-supplied level. Taking either gate ends the session.
    pub fn bonus(map: &Map, seed: u64, debug: bool) -> Result<Self, LevelError> {
        let mut game = Self::build(std::slice::from_ref(map), seed, debug, true)?;
        game.levels[0].on_enter(Transition::None, &mut game.player);
        Ok(game)
    }

    fn build(maps: &[Map], seed: u64, debug: bool, bonus: bool) -> Result<Self, LevelError> {
        let mut master = Random::new(seed);
        let levels = maps
            .iter()
            .map(|m| Level::new(m, master.next_u64()))
            .collect::<Result<Vec<_>, _>>()?;
        let first = levels.first().ok_or(LevelError::MissingSpawn)?;

        let mut player = Player::new(first.board(), first.spawn())?;
        player.set_lives(if debug { DEBUG_START_LIVES } else { START_LIVES });
        player.set_score(START_SCORE);
        player.set_max_bombs(START_MAX_BOMBS);

        let secs = if debug {
            DEBUG_WORLD_TIME_SECS
        } else {
            WORLD_TIME_SECS
        };
        let debug_mode = debug;
        info!(levels = levels.len(), seed, debug = debug_mode, bonus, "game started");
        Ok(Self {
            player,
            completed: vec![false; levels.len()],
            levels,
            current: 0,
            world_time: secs * TICKS_PER_SECOND,
            debug,
            bonus,
            status: Status::Running,
        })
    }

    pub fn handle_input(&mut self, command: Command) -> Result<(), BoardError> {
        if self.status != Status::Running {
            return Ok(());
        }
        if command.is_debug() && !self.debug {
            return Ok(());
        }
        let level = &mut self.levels[self.current];
        let player = &mut self.player;
        match command {
            Command::Move(dir) => {
                if player.can_move() {
                    player.try_move(dir, level.board());
                }
            }
            Command::PlaceBomb => {
                level.place_bomb(player);
            }
            Command::KillAll => level.kill_all_enemies(),
            Command::DestroyWalls => level.destroy_all_destructibles()?,
            Command::ToggleImmortality => level.toggle_immortality(player),
            Command::ToggleUltraspeed => level.toggle_ultraspeed(player),
            Command::Suicide => level.suicide(player),
            Command::Forfeit => self.finish(Status::Defeat),
        }
        Ok(())
    }

    pub fn update(&mut self) -> Result<(), BoardError> {
        if self.status != Status::Running {
            return Ok(());
        }
        let level = &mut self.levels[self.current];
        level.update(&mut self.player)?;
        self.player.update_movement_timer();
        self.world_time = self.world_time.saturating_sub(1);
        let transition = level.transition();

        if self.player.is_dead() || self.world_time == 0 {
            self.finish(Status::Defeat);
            return Ok(());
        }

        if !self.completed[self.current] && level.enemies().is_empty() {
            self.completed[self.current] = true;
            info!(level = self.current, "level cleared");
        }

        match transition {
            Transition::None => {}
            _ if self.bonus => {
                self.levels[self.current].clear_transition();
                self.finish(Status::BonusExit);
            }
            Transition::Next => {
                if self.all_levels_completed() {
                    let bonus = (self.world_time / TICKS_PER_SECOND) * TIME_BONUS_PER_SECOND;
                    self.player.add_score(bonus);
                    self.finish(Status::Victory);
                } else if let Some(next) = self.find_next_incomplete(self.current) {
                    self.set_current_level(next, Transition::Next)?;
                }
            }
            Transition::Prev => {
                if let Some(prev) = self.find_prev_incomplete(self.current) {
                    self.set_current_level(prev, Transition::Prev)?;
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self, status: Status) {
        self.status = status;
        info!(?status, score = self.player.score(), "game over");
    }

    pub fn set_current_level(&mut self, index: usize, from: Transition) -> Result<(), BoardError> {
        if index >= self.levels.len() {
            return Ok(());
        }
        self.levels[self.current].on_exit(&mut self.player)?;
        self.current = index;
        self.player.set_max_bombs(bomb_cap(index));
        self.levels[index].on_enter(from, &mut self.player);
        debug!(level = index, ?from, "level changed");
        Ok(())
    }

    pub fn find_next_incomplete(&self, from: usize) -> Option<usize> {
        (from + 1..self.levels.len()).find(|&i| !self.completed[i])
    }

    pub fn find_prev_incomplete(&self, from: usize) -> Option<usize> {
        (0..from).rev().find(|&i| !self.completed[i])
    }

    pub fn all_levels_completed(&self) -> bool {
        self.completed.iter().all(|&done| done)
    }

    pub fn is_level_completed(&self, index: usize) -> bool {
        self.completed.get(index).copied().unwrap_or(false)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != Status::Running
    }

    pub fn is_ranked(&self) -> bool {
        !self.bonus && matches!(self.status, Status::Victory | Status::Defeat)
    }

    pub fn is_bonus(&self) -> bool {
        self.bonus
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn level(&self) -> &Level {
        &self.levels[self.current]
    }

    pub fn current_level(&self) -> usize {
        self.current
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn score(&self) -> u32 {
        self.player.score()
    }

    pub fn world_time(&self) -> u32 {
        self.world_time
    }

    pub fn time_left_secs(&self) -> u32 {
        self.world_time / TICKS_PER_SECOND
    }
}
