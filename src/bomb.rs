use rand::Rng;
use tracing::debug;

use crate::board::{Board, CellType};
use crate::components::{Direction, Pos};
use crate::enemy::Enemy;
use crate::error::BoardError;
use crate::player::Player;
use crate::powerup::{PowerUp, PowerUpKind, DROP_ROLL_SIDES};
use crate::random::Random;

pub const BOMB_TIMER: u16 = 90;
pub const DESTRUCTIBLE_SCORE: u32 = 10;

const BLAST_DIRECTIONS: [Direction; 4] = [
    Direction::Right,
    Direction::Left,
    Direction::Down,
    Direction::Up,
];

/// A placed bomb. The position is `None` once the bomb has gone off, which
/// doubles as the "placed" flag and makes a second explosion a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bomb {
    pos: Option<Pos>,
    timer: u16,
    range: u16,
}

impl Bomb {
    pub fn place(board: &mut Board, owner: &mut Player, timer: u16, range: u16) -> Option<Self> {
        let pos = owner.place_bomb(board)?;
        debug!(x = pos.x, y = pos.y, range, "bomb placed");
        Some(Self {
            pos: Some(pos),
            timer,
            range,
        })
    }

    pub fn is_placed(&self) -> bool {
        self.pos.is_some()
    }

    pub fn pos(&self) -> Option<Pos> {
        self.pos
    }

    pub fn timer(&self) -> u16 {
        self.timer
    }

    pub fn range(&self) -> u16 {
        self.range
    }

    pub fn update(
        &mut self,
        board: &mut Board,
        owner: &mut Player,
        enemies: &mut Vec<Enemy>,
        powerups: &mut Vec<PowerUp>,
        rng: &mut Random,
    ) -> Result<(), BoardError> {
        if !self.is_placed() {
            return Ok(());
        }
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.explode(board, owner, enemies, powerups, rng)?;
        }
        Ok(())
    }

    /// Resolves the blast as four rays of up to `range` cells. A ray stops at a
    /// solid wall or the grid edge, and right after the destructible wall it breaks.
    pub fn explode(
        &mut self,
        board: &mut Board,
        owner: &mut Player,
        enemies: &mut Vec<Enemy>,
        powerups: &mut Vec<PowerUp>,
        rng: &mut Random,
    ) -> Result<(), BoardError> {
        let Some(origin) = self.pos else {
            return Ok(());
        };

        board.set_cell(origin, CellType::Explosion)?;
        owner.bomb_exploded();
        if owner.pos() == origin {
            owner.take_damage();
        }

        for dir in BLAST_DIRECTIONS {
            let (dx, dy) = dir.delta();
            for r in 1..=i32::from(self.range) {
                let target = origin.offset(dx * r, dy * r);
                let cell = match board.cell(target) {
                    Ok(cell) => cell,
                    Err(BoardError::OutOfBounds { .. }) => break,
                    Err(err) => return Err(err),
                };
                if cell == CellType::WallSolid {
                    break;
                }

                if owner.pos() == target {
                    owner.take_damage();
                }

                if let Some(idx) = enemies.iter().position(|e| e.pos() == target) {
                    let enemy = enemies.remove(idx);
                    owner.add_score(enemy.score_value());
                    debug!(kind = ?enemy.kind(), x = target.x, y = target.y, "enemy killed");
                }

                match cell {
                    CellType::WallDestructible => {
                        owner.add_score(DESTRUCTIBLE_SCORE);
                        let after = if try_spawn_power_up(target, powerups, rng) {
                            CellType::Empty
                        } else {
                            CellType::Explosion
                        };
                        board.set_cell(target, after)?;
                        break;
                    }
                    CellType::Empty => board.set_cell(target, CellType::Explosion)?,
                    _ => {}
                }
            }
        }

        debug!(x = origin.x, y = origin.y, range = self.range, "bomb exploded");
        self.pos = None;
        Ok(())
    }
}

/// Nothing is rolled when a power-up already occupies the cell.
pub fn try_spawn_power_up(pos: Pos, powerups: &mut Vec<PowerUp>, rng: &mut Random) -> bool {
    if powerups.iter().any(|p| p.pos() == pos) {
        return false;
    }
    let roll = rng.gen_range(1..=DROP_ROLL_SIDES);
    match PowerUpKind::from_roll(roll) {
        Some(kind) => {
            debug!(?kind, x = pos.x, y = pos.y, roll, "power-up spawned");
            powerups.push(PowerUp::spawn(kind, pos));
            true
        }
        None => false,
    }
}
