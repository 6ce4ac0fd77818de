use tracing::debug;

use crate::board::{Board, CellType};
use crate::components::{Direction, Pos};
use crate::error::SpawnError;

pub const INVULN_TIME_TICKS: u16 = 110;
pub const DEFAULT_LIVES: i32 = 3;
pub const DEFAULT_MOVE_COOLDOWN: u16 = 4;
pub const DEFAULT_BOMB_RANGE: u16 = 1;
pub const DEFAULT_MAX_BOMBS: u16 = 1;

#[derive(Debug, Clone)]
pub struct Player {
    pos: Pos,
    spawn: Pos,
    lives: i32,
    score: u32,
    move_cooldown: u16,
    move_tick: u16,
    invuln_ticks: u16,
    invuln_total: u16,
    bomb_range: u16,
    bomb_range_bonus: u16,
    bomb_buff_left: u16,
    speed_bonus: u16,
    speed_buff_left: u16,
    max_bombs: u16,
    bombs_placed: u16,
    reached_next_gate: bool,
    reached_prev_gate: bool,
    last_move: Direction,
}

impl Player {
    pub fn new(board: &Board, pos: Pos) -> Result<Self, SpawnError> {
        if !board.is_walkable(pos)? {
            return Err(SpawnError::InvalidStartingPosition { x: pos.x, y: pos.y });
        }
        Ok(Self {
            pos,
            spawn: pos,
            lives: DEFAULT_LIVES,
            score: 0,
            move_cooldown: DEFAULT_MOVE_COOLDOWN,
            move_tick: 0,
            invuln_ticks: 0,
            invuln_total: 0,
            bomb_range: DEFAULT_BOMB_RANGE,
            bomb_range_bonus: 0,
            bomb_buff_left: 0,
            speed_bonus: 0,
            speed_buff_left: 0,
            max_bombs: DEFAULT_MAX_BOMBS,
            bombs_placed: 0,
            reached_next_gate: false,
            reached_prev_gate: false,
            last_move: Direction::Down,
        })
    }

    pub fn try_move(&mut self, dir: Direction, board: &Board) -> bool {
        let next = self.pos.step(dir);
        let cell = match board.cell(next) {
            Ok(cell) if cell.is_walkable() => cell,
            _ => return false,
        };
        match cell {
            CellType::GateNext => self.reached_next_gate = true,
            CellType::GatePrev => self.reached_prev_gate = true,
            _ => {}
        }
        self.pos = next;
        self.last_move = dir;
        self.move_tick = self.speed();
        true
    }

    pub fn can_move(&self) -> bool {
        self.move_tick == 0
    }

    pub fn update_movement_timer(&mut self) {
        self.move_tick = self.move_tick.saturating_sub(1);
    }

    pub fn place_bomb(&mut self, board: &mut Board) -> Option<Pos> {
        if self.bombs_placed >= self.max_bombs {
            return None;
        }
        let cell = board.cell(self.pos).ok()?;
        // A solid wall under the player would mean a movement bug.
        if matches!(
            cell,
            CellType::GateNext | CellType::GatePrev | CellType::WallSolid | CellType::Bomb
        ) {
            return None;
        }
        board.set_cell(self.pos, CellType::Bomb).ok()?;
        self.bombs_placed += 1;
        Some(self.pos)
    }

    pub fn bomb_exploded(&mut self) {
        self.bombs_placed = self.bombs_placed.saturating_sub(1);
    }

    pub fn reset_current_bombs(&mut self) {
        self.bombs_placed = 0;
    }

    pub fn take_damage(&mut self) {
        if self.is_invulnerable() {
            return;
        }
        if self.lives > 0 {
            self.lives -= 1;
            self.pos = self.spawn;
        }
        self.invuln_ticks = INVULN_TIME_TICKS;
        self.invuln_total = INVULN_TIME_TICKS;
        debug!(lives = self.lives, "player damaged");
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub fn is_dead(&self) -> bool {
        self.lives <= 0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln_ticks > 0
    }

    pub fn set_invulnerability(&mut self, ticks: u16) {
        self.invuln_total = ticks;
        self.invuln_ticks = ticks;
    }

    pub fn remove_invulnerability(&mut self) {
        self.invuln_ticks = 0;
        self.invuln_total = 0;
    }

    pub fn update_invulnerability(&mut self) {
        self.invuln_ticks = self.invuln_ticks.saturating_sub(1);
    }

    pub fn give_speed_buff(&mut self, bonus: u16, ticks: u16) {
        self.speed_bonus = bonus;
        self.speed_buff_left = ticks;
    }

    pub fn give_bomb_range_buff(&mut self, bonus: u16, ticks: u16) {
        self.bomb_range_bonus = bonus;
        self.bomb_buff_left = ticks;
    }

    pub fn update_timers(&mut self) {
        if self.speed_buff_left > 0 {
            self.speed_buff_left -= 1;
            if self.speed_buff_left == 0 {
                self.speed_bonus = 0;
            }
        }
        if self.bomb_buff_left > 0 {
            self.bomb_buff_left -= 1;
            if self.bomb_buff_left == 0 {
                self.bomb_range_bonus = 0;
            }
        }
    }

    pub fn bomb_range(&self) -> u16 {
        self.bomb_range + self.bomb_range_bonus
    }

    pub fn speed(&self) -> u16 {
        self.move_cooldown.saturating_sub(self.speed_bonus)
    }

    pub fn set_speed(&mut self, cooldown: u16) {
        self.move_cooldown = cooldown;
    }

    pub fn reset_gate_flags(&mut self) {
        self.reached_next_gate = false;
        self.reached_prev_gate = false;
    }

    pub fn reset(&mut self) {
        self.lives = DEFAULT_LIVES;
        self.score = 0;
        self.move_cooldown = DEFAULT_MOVE_COOLDOWN;
        self.move_tick = 0;
        self.remove_invulnerability();
        self.bomb_range = DEFAULT_BOMB_RANGE;
        self.bomb_range_bonus = 0;
        self.bomb_buff_left = 0;
        self.speed_bonus = 0;
        self.speed_buff_left = 0;
        self.max_bombs = DEFAULT_MAX_BOMBS;
        self.bombs_placed = 0;
        self.reset_gate_flags();
        self.last_move = Direction::Down;
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn set_pos(&mut self, pos: Pos) {
        self.pos = pos;
    }

    pub fn spawn(&self) -> Pos {
        self.spawn
    }

    pub fn set_spawn(&mut self, spawn: Pos) {
        self.spawn = spawn;
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn set_lives(&mut self, lives: i32) {
        self.lives = lives;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    pub fn max_bombs(&self) -> u16 {
        self.max_bombs
    }

    pub fn set_max_bombs(&mut self, max_bombs: u16) {
        self.max_bombs = max_bombs;
    }

    pub fn bombs_placed(&self) -> u16 {
        self.bombs_placed
    }

    pub fn invuln_ticks(&self) -> u16 {
        self.invuln_ticks
    }

    pub fn invuln_total(&self) -> u16 {
        self.invuln_total
    }

    pub fn speed_buff_left(&self) -> u16 {
        self.speed_buff_left
    }

    pub fn bomb_buff_left(&self) -> u16 {
        self.bomb_buff_left
    }

    pub fn has_reached_next_gate(&self) -> bool {
        self.reached_next_gate
    }

    pub fn has_reached_prev_gate(&self) -> bool {
        self.reached_prev_gate
    }

    pub fn last_move(&self) -> Direction {
        self.last_move
    }
}
