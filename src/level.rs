use rand::RngCore;
use tracing::{debug, info};

use crate::board::{Board, CellType};
use crate::bomb::{Bomb, BOMB_TIMER};
use crate::components::Pos;
use crate::enemy::{Enemy, CHASER_DEFAULT_VISION};
use crate::error::{BoardError, LevelError, SpawnError};
use crate::map::{Map, TileKind};
use crate::player::Player;
use crate::powerup::PowerUp;
use crate::random::Random;

const IMMORTAL_TICKS: u16 = u16::MAX;
const NORMAL_SPEED: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    #[default]
    None,
    Next,
    Prev,
}

#[derive(Debug, Clone)]
pub struct Level {
    board: Board,
    enemies: Vec<Enemy>,
    bombs: Vec<Bomb>,
    powerups: Vec<PowerUp>,
    rng: Random,
    gate_next: Option<Pos>,
    gate_prev: Option<Pos>,
    spawn: Pos,
    completed: bool,
    transition: Transition,
}

fn tile_to_cell(kind: TileKind) -> CellType {
    match kind {
        TileKind::Solid => CellType::WallSolid,
        TileKind::Destructible => CellType::WallDestructible,
        TileKind::GateNext => CellType::GateNext,
        TileKind::GatePrev => CellType::GatePrev,
        // Spawn and enemy markers sit on open floor.
        TileKind::Empty
        | TileKind::Spawn
        | TileKind::Walker
        | TileKind::Patroller
        | TileKind::Chaser => CellType::Empty,
    }
}

impl Level {
    pub fn new(map: &Map, seed: u64) -> Result<Self, LevelError> {
        let mut board = Board::new(map.width(), map.height());
        let mut spawn = None;
        let mut gate_next = None;
        let mut gate_prev = None;

        for (pos, tile) in map.iter() {
            board.set_cell(pos, tile_to_cell(tile.kind))?;
            match tile.kind {
                TileKind::Spawn => spawn = Some(pos),
                TileKind::GateNext => gate_next = Some(pos),
                TileKind::GatePrev => gate_prev = Some(pos),
                _ => {}
            }
        }
        let spawn = spawn.ok_or(LevelError::MissingSpawn)?;

        let mut rng = Random::new(seed);
        let mut enemies = Vec::new();
        for (pos, tile) in map.iter() {
            let enemy = match tile.kind {
                TileKind::Walker => Enemy::walker(&board, tile.start, rng.next_u64(), tile.speed),
                TileKind::Patroller => Enemy::patroller(&board, tile.start, tile.end, tile.speed),
                TileKind::Chaser => Enemy::chaser(
                    &board,
                    tile.start,
                    rng.next_u64(),
                    tile.speed,
                    CHASER_DEFAULT_VISION,
                ),
                _ => continue,
            };
            enemies.push(enemy.map_err(|source| enemy_error(pos, source))?);
        }

        info!(
            width = map.width(),
            height = map.height(),
            enemies = enemies.len(),
            "level loaded"
        );
        Ok(Self {
            board,
            enemies,
            bombs: Vec::new(),
            powerups: Vec::new(),
            rng,
            gate_next,
            gate_prev,
            spawn,
            completed: false,
            transition: Transition::None,
        })
    }

    /// Advances the level by one tick.
    ///
    /// Order: enemies move, enemy contact hurts the player, bombs tick and
    /// exploded ones are dropped, power-ups age and are picked up or expire.
    /// A player standing on a gate requests a transition and ends the tick
    /// there; otherwise explosions and player timers decay.
    pub fn update(&mut self, player: &mut Player) -> Result<(), BoardError> {
        for enemy in &mut self.enemies {
            enemy.update(&self.board, player);
        }

        let pos = player.pos();
        if self.enemies.iter().any(|e| e.pos() == pos) {
            player.take_damage();
        }

        for bomb in &mut self.bombs {
            bomb.update(
                &mut self.board,
                player,
                &mut self.enemies,
                &mut self.powerups,
                &mut self.rng,
            )?;
        }
        self.bombs.retain(Bomb::is_placed);

        let player_pos = player.pos();
        self.powerups.retain_mut(|pu| {
            pu.update();
            if pu.pos() == player_pos {
                debug!(kind = ?pu.kind(), "power-up picked up");
                pu.apply(player);
                return false;
            }
            !pu.is_expired()
        });

        match self.board.cell(pos)? {
            CellType::GatePrev => {
                self.transition = Transition::Prev;
                return Ok(());
            }
            CellType::GateNext => {
                self.transition = Transition::Next;
                return Ok(());
            }
            _ => {}
        }

        self.board.update_explosions()?;
        player.update_invulnerability();
        player.update_timers();
        Ok(())
    }

    pub fn place_bomb(&mut self, player: &mut Player) -> bool {
        let range = player.bomb_range();
        match Bomb::place(&mut self.board, player, BOMB_TIMER, range) {
            Some(bomb) => {
                self.bombs.push(bomb);
                true
            }
            None => false,
        }
    }

    /// Moves the player into this level. Coming through a NEXT gate puts
    /// them just past the PREV gate, coming back through a PREV gate puts
    /// them just before the NEXT gate; anything else starts at the spawn.
    pub fn on_enter(&mut self, from: Transition, player: &mut Player) {
        player.reset_gate_flags();
        player.set_spawn(self.spawn);
        self.transition = Transition::None;

        let arrival = match from {
            Transition::Next => self.gate_prev.map(|g| g.offset(1, 0)),
            Transition::Prev => self.gate_next.map(|g| g.offset(-1, 0)),
            Transition::None => None,
        };
        player.set_pos(arrival.unwrap_or(self.spawn));
        debug!(?from, pos = ?player.pos(), "entered level");
    }

    pub fn on_exit(&mut self, player: &mut Player) -> Result<(), BoardError> {
        for pos in self.bombs.drain(..).filter_map(|b| b.pos()) {
            if self.board.cell(pos)? == CellType::Bomb {
                self.board.set_cell(pos, CellType::Empty)?;
            }
        }
        player.reset_current_bombs();
        Ok(())
    }

    pub fn is_bomb_at(&self, pos: Pos) -> bool {
        self.bombs.iter().any(|b| b.pos() == Some(pos))
    }

    pub fn transition(&self) -> Transition {
        self.transition
    }

    pub fn clear_transition(&mut self) {
        self.transition = Transition::None;
    }

    /// True only after the kill-all debug command. Regular completion is
    /// tracked by the game from the enemy count.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn powerups(&self) -> &[PowerUp] {
        &self.powerups
    }

    pub fn spawn(&self) -> Pos {
        self.spawn
    }

    pub fn gate_next(&self) -> Option<Pos> {
        self.gate_next
    }

    pub fn gate_prev(&self) -> Option<Pos> {
        self.gate_prev
    }

    pub fn kill_all_enemies(&mut self) {
        self.enemies.clear();
        self.completed = true;
    }

    pub fn destroy_all_destructibles(&mut self) -> Result<(), BoardError> {
        let walls: Vec<Pos> = self
            .board
            .iter()
            .filter(|(_, cell)| *cell == CellType::WallDestructible)
            .map(|(pos, _)| pos)
            .collect();
        for pos in walls {
            self.board.set_cell(pos, CellType::Empty)?;
        }
        Ok(())
    }

    pub fn toggle_immortality(&self, player: &mut Player) {
        if player.is_invulnerable() {
            player.remove_invulnerability();
        } else {
            player.set_invulnerability(IMMORTAL_TICKS);
        }
    }

    pub fn toggle_ultraspeed(&self, player: &mut Player) {
        if player.speed() != 0 {
            player.set_speed(0);
        } else {
            player.set_speed(NORMAL_SPEED);
        }
    }

    pub fn suicide(&self, player: &mut Player) {
        player.take_damage();
    }
}

fn enemy_error(pos: Pos, source: SpawnError) -> LevelError {
    LevelError::Enemy {
        x: pos.x,
        y: pos.y,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::EXPLOSION_TTL;
    use crate::components::Direction;
    use crate::map::Tile;
    use crate::player::INVULN_TIME_TICKS;
    use crate::powerup::{PowerUpKind, SCORE_UP_VALUE};

    // 9x5 room: PREV gate on the left wall, NEXT gate on the right wall,
    // spawn in the middle.
    fn room() -> Map {
        let mut m = Map::new(9, 5);
        m.border_walls();
        m.gate_prev(Pos::new(0, 2));
        m.gate_next(Pos::new(8, 2));
        m.set_spawn(Pos::new(4, 2));
        m
    }

    fn setup(map: &Map) -> (Level, Player) {
        let mut level = Level::new(map, 7).unwrap();
        let mut player = Player::new(level.board(), level.spawn()).unwrap();
        level.on_enter(Transition::None, &mut player);
        (level, player)
    }

    #[test]
    fn load_maps_tiles_to_cells() {
        let mut m = room();
        m.set(Pos::new(2, 1), Tile::plain(TileKind::Destructible));
        m.spawn_walker(Pos::new(6, 3), 8);
        let level = Level::new(&m, 1).unwrap();
        let board = level.board();
        assert_eq!(board.cell(Pos::new(0, 0)).unwrap(), CellType::WallSolid);
        assert_eq!(board.cell(Pos::new(2, 1)).unwrap(), CellType::WallDestructible);
        assert_eq!(board.cell(Pos::new(8, 2)).unwrap(), CellType::GateNext);
        assert_eq!(board.cell(Pos::new(0, 2)).unwrap(), CellType::GatePrev);
        assert_eq!(board.cell(Pos::new(4, 2)).unwrap(), CellType::Empty);
        assert_eq!(board.cell(Pos::new(6, 3)).unwrap(), CellType::Empty);
        assert_eq!(level.enemies().len(), 1);
        assert_eq!(level.spawn(), Pos::new(4, 2));
        assert_eq!(level.gate_next(), Some(Pos::new(8, 2)));
    }

    #[test]
    fn missing_spawn_is_rejected() {
        let mut m = Map::new(5, 5);
        m.border_walls();
        assert!(matches!(Level::new(&m, 1), Err(LevelError::MissingSpawn)));
    }

    #[test]
    fn enemy_on_a_wall_is_rejected() {
        let mut m = room();
        // Patrollers start at their authored start point, here a wall.
        m.set(
            Pos::new(3, 3),
            Tile {
                kind: TileKind::Patroller,
                start: Pos::new(0, 0),
                end: Pos::new(3, 3),
                speed: 4,
            },
        );
        let err = Level::new(&m, 1).unwrap_err();
        assert!(matches!(
            err,
            LevelError::Enemy {
                x: 3,
                y: 3,
                source: SpawnError::InvalidStartingPosition { x: 0, y: 0 }
            }
        ));
    }

    #[test]
    fn gate_tick_skips_decay() {
        let mut m = room();
        m.set_spawn(Pos::new(7, 2));
        let (mut level, mut player) = setup(&m);

        level.board.set_cell(Pos::new(4, 3), CellType::Explosion).unwrap();
        player.set_invulnerability(50);
        assert!(player.try_move(Direction::Right, level.board()));
        assert_eq!(player.pos(), Pos::new(8, 2));

        level.update(&mut player).unwrap();
        assert_eq!(level.transition(), Transition::Next);
        assert_eq!(level.board().explosion_ttl(Pos::new(4, 3)).unwrap(), EXPLOSION_TTL);
        assert_eq!(player.invuln_ticks(), 50);

        level.clear_transition();
        assert_eq!(level.transition(), Transition::None);
    }

    #[test]
    fn regular_tick_decays_timers() {
        let (mut level, mut player) = setup(&room());
        level.board.set_cell(Pos::new(2, 3), CellType::Explosion).unwrap();
        player.set_invulnerability(50);
        level.update(&mut player).unwrap();
        assert_eq!(level.transition(), Transition::None);
        assert_eq!(level.board().explosion_ttl(Pos::new(2, 3)).unwrap(), EXPLOSION_TTL - 1);
        assert_eq!(player.invuln_ticks(), 49);
    }

    #[test]
    fn on_enter_positions_player() {
        let (mut level, mut player) = setup(&room());
        level.on_enter(Transition::Next, &mut player);
        assert_eq!(player.pos(), Pos::new(1, 2));
        level.on_enter(Transition::Prev, &mut player);
        assert_eq!(player.pos(), Pos::new(7, 2));
        level.on_enter(Transition::None, &mut player);
        assert_eq!(player.pos(), Pos::new(4, 2));
        assert_eq!(player.spawn(), Pos::new(4, 2));
    }

    #[test]
    fn on_enter_without_gate_uses_spawn() {
        let mut m = room();
        m.set(Pos::new(0, 2), Tile::plain(TileKind::Solid));
        let (mut level, mut player) = setup(&m);
        level.on_enter(Transition::Next, &mut player);
        assert_eq!(player.pos(), level.spawn());
    }

    #[test]
    fn on_exit_clears_bombs_and_slots() {
        let (mut level, mut player) = setup(&room());
        assert!(level.place_bomb(&mut player));
        assert!(!level.place_bomb(&mut player));
        assert!(level.is_bomb_at(Pos::new(4, 2)));
        assert_eq!(player.bombs_placed(), 1);

        level.on_exit(&mut player).unwrap();
        assert!(level.bombs().is_empty());
        assert!(!level.is_bomb_at(Pos::new(4, 2)));
        assert_eq!(level.board().cell(Pos::new(4, 2)).unwrap(), CellType::Empty);
        assert_eq!(player.bombs_placed(), 0);
        assert!(level.place_bomb(&mut player));
    }

    #[test]
    fn on_exit_leaves_overwritten_bomb_cells_alone() {
        let (mut level, mut player) = setup(&room());
        assert!(level.place_bomb(&mut player));
        level.board.set_cell(Pos::new(4, 2), CellType::Explosion).unwrap();

        assert_eq!(level.on_exit(&mut player), Ok(()));
        assert_eq!(level.board().cell(Pos::new(4, 2)).unwrap(), CellType::Explosion);
        assert!(level.bombs().is_empty());
        assert_eq!(player.bombs_placed(), 0);
    }

    #[test]
    fn bomb_goes_off_after_fuse_and_is_reaped() {
        let (mut level, mut player) = setup(&room());
        assert!(level.place_bomb(&mut player));
        player.set_pos(Pos::new(1, 1));
        for _ in 0..BOMB_TIMER - 1 {
            level.update(&mut player).unwrap();
        }
        assert_eq!(level.bombs().len(), 1);
        level.update(&mut player).unwrap();
        assert!(level.bombs().is_empty());
        assert_eq!(player.bombs_placed(), 0);
        // The decay step of the same tick already ran once.
        assert_eq!(
            level.board().explosion_ttl(Pos::new(4, 2)).unwrap(),
            EXPLOSION_TTL - 1
        );
        assert_eq!(level.board().cell(Pos::new(5, 2)).unwrap(), CellType::Explosion);
    }

    #[test]
    fn enemy_contact_costs_one_life() {
        let mut m = room();
        m.spawn_patroller(Pos::new(5, 2), Pos::new(5, 2), 1);
        m.spawn_patroller(Pos::new(5, 1), Pos::new(5, 1), 1);
        let (mut level, mut player) = setup(&m);
        let lives = player.lives();
        player.set_pos(Pos::new(5, 2));

        level.update(&mut player).unwrap();
        assert_eq!(player.lives(), lives - 1);
        assert_eq!(player.pos(), Pos::new(4, 2));
        assert_eq!(player.invuln_ticks(), INVULN_TIME_TICKS - 1);
    }

    #[test]
    fn powerups_are_picked_up_or_expire() {
        let (mut level, mut player) = setup(&room());
        level
            .powerups
            .push(PowerUp::spawn(PowerUpKind::ScoreUp, Pos::new(4, 2)));
        level
            .powerups
            .push(PowerUp::new(PowerUpKind::Star, Pos::new(2, 1), 1, 90));
        level
            .powerups
            .push(PowerUp::spawn(PowerUpKind::Gunpowder, Pos::new(6, 3)));

        level.update(&mut player).unwrap();
        assert_eq!(player.score(), u32::from(SCORE_UP_VALUE));
        assert_eq!(level.powerups().len(), 1);
        assert_eq!(level.powerups()[0].kind(), PowerUpKind::Gunpowder);
    }

    #[test]
    fn debug_commands() {
        let mut m = room();
        m.set(Pos::new(2, 1), Tile::plain(TileKind::Destructible));
        m.set(Pos::new(6, 3), Tile::plain(TileKind::Destructible));
        m.spawn_walker(Pos::new(2, 3), 8);
        let (mut level, mut player) = setup(&m);

        assert!(!level.is_completed());
        level.kill_all_enemies();
        assert!(level.enemies().is_empty());
        assert!(level.is_completed());

        level.destroy_all_destructibles().unwrap();
        assert!(level
            .board()
            .iter()
            .all(|(_, c)| c != CellType::WallDestructible));

        level.toggle_immortality(&mut player);
        assert_eq!(player.invuln_ticks(), IMMORTAL_TICKS);
        level.toggle_immortality(&mut player);
        assert!(!player.is_invulnerable());

        level.toggle_ultraspeed(&mut player);
        assert_eq!(player.speed(), 0);
        level.toggle_ultraspeed(&mut player);
        assert_eq!(player.speed(), NORMAL_SPEED);

        let lives = player.lives();
        level.suicide(&mut player);
        assert_eq!(player.lives(), lives - 1);
    }
}
