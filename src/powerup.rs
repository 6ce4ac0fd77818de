use crate::components::Pos;
use crate::player::Player;

pub const POWERUP_LIFETIME: u16 = 600;
pub const SPEED_UP_DURATION: u16 = 180;
pub const SPEED_UP_BONUS: u16 = 2;
pub const GUNPOWDER_DURATION: u16 = 300;
pub const GUNPOWDER_BONUS: u16 = 1;
pub const SCORE_UP_VALUE: u16 = 250;
pub const STAR_DURATION: u16 = 90;

pub const DROP_ROLL_SIDES: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    Star,
    Gunpowder,
    SpeedUp,
    ScoreUp,
}

impl PowerUpKind {
    pub fn from_roll(roll: i32) -> Option<PowerUpKind> {
        match roll {
            i32::MIN..=880 => None,
            881..=928 => Some(PowerUpKind::SpeedUp),
            929..=964 => Some(PowerUpKind::Gunpowder),
            965..=994 => Some(PowerUpKind::ScoreUp),
            _ => Some(PowerUpKind::Star),
        }
    }

    pub fn effect_value(self) -> u16 {
        match self {
            PowerUpKind::Star => STAR_DURATION,
            PowerUpKind::Gunpowder => GUNPOWDER_DURATION,
            PowerUpKind::SpeedUp => SPEED_UP_DURATION,
            PowerUpKind::ScoreUp => SCORE_UP_VALUE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUp {
    pos: Pos,
    kind: PowerUpKind,
    time_left: u16,
    effect_value: u16,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: Pos, time_left: u16, effect_value: u16) -> Self {
        Self {
            pos,
            kind,
            time_left,
            effect_value,
        }
    }

    pub fn spawn(kind: PowerUpKind, pos: Pos) -> Self {
        Self::new(kind, pos, POWERUP_LIFETIME, kind.effect_value())
    }

    pub fn update(&mut self) {
        self.time_left = self.time_left.saturating_sub(1);
    }

    pub fn is_expired(&self) -> bool {
        self.time_left == 0
    }

    pub fn apply(&self, player: &mut Player) {
        match self.kind {
            PowerUpKind::Star => player.set_invulnerability(self.effect_value),
            PowerUpKind::Gunpowder => {
                player.give_bomb_range_buff(GUNPOWDER_BONUS, self.effect_value)
            }
            PowerUpKind::SpeedUp => player.give_speed_buff(SPEED_UP_BONUS, self.effect_value),
            PowerUpKind::ScoreUp => player.add_score(u32::from(self.effect_value)),
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn kind(&self) -> PowerUpKind {
        self.kind
    }

    pub fn time_left(&self) -> u16 {
        self.time_left
    }

    pub fn effect_value(&self) -> u16 {
        self.effect_value
    }
}
