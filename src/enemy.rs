use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, CellType};
use crate::components::{Direction, Pos};
use crate::error::{BoardError, SpawnError};
use crate::player::Player;
use crate::random::Random;

pub const WALKER_DEFAULT_SPEED: u16 = 8;
pub const PATROLLER_DEFAULT_SPEED: u16 = 4;
pub const CHASER_DEFAULT_SPEED: u16 = 6;
pub const CHASER_IDLE_SPEED: u16 = 10;
pub const CHASER_DEFAULT_VISION: u16 = 16;

const WANDER_HOLD_MIN: u16 = 4;
const WANDER_HOLD_MAX: u16 = 10;
const WANDER_RETRIES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Walker,
    Patroller,
    Chaser,
}

impl EnemyKind {
    pub fn score_value(self) -> u32 {
        match self {
            EnemyKind::Walker => 100,
            EnemyKind::Patroller => 150,
            EnemyKind::Chaser => 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChaserState {
    rng: Random,
    idle_speed: u16,
    chase_speed: u16,
    vision: u16,
    wander_dir: Direction,
    wander_hold: u16,
    chasing: bool,
}

impl ChaserState {
    fn pick_wander_dir(&mut self) {
        if let Some(&dir) = Direction::ALL.choose(&mut self.rng) {
            self.wander_dir = dir;
        }
        self.wander_hold = self.rng.gen_range(WANDER_HOLD_MIN..=WANDER_HOLD_MAX);
    }
}

#[derive(Debug, Clone)]
pub enum Behavior {
    Walker {
        rng: Random,
        last_dir: Option<Direction>,
    },
    Patroller { start: Pos, end: Pos, forward: bool },
    Chaser(ChaserState),
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pos: Pos,
    speed: u16,
    tick: u16,
    behavior: Behavior,
}

fn check_start(board: &Board, pos: Pos) -> Result<(), SpawnError> {
    if !board.is_initialized() {
        return Err(SpawnError::Board(BoardError::NotInitialized));
    }
    match board.is_walkable(pos) {
        Ok(true) => Ok(()),
        _ => Err(SpawnError::InvalidStartingPosition { x: pos.x, y: pos.y }),
    }
}

fn try_step(pos: &mut Pos, board: &Board, dx: i32, dy: i32) -> bool {
    let next = pos.offset(dx, dy);
    if matches!(board.is_walkable(next), Ok(true)) {
        *pos = next;
        true
    } else {
        false
    }
}

fn blocks_vision(cell: CellType) -> bool {
    matches!(
        cell,
        CellType::WallSolid | CellType::WallDestructible | CellType::Bomb
    )
}

/// Straight-line sight along a shared row or column, within `range` cells,
/// with nothing opaque strictly between the two ends.
pub fn line_of_sight(board: &Board, from: Pos, to: Pos, range: u16) -> bool {
    let (dx, dy) = if from.y == to.y {
        ((to.x - from.x).signum(), 0)
    } else if from.x == to.x {
        (0, (to.y - from.y).signum())
    } else {
        return false;
    };
    let dist = (to.x - from.x).abs() + (to.y - from.y).abs();
    if dist > i32::from(range) {
        return false;
    }
    let mut cur = from.offset(dx, dy);
    while cur != to {
        match board.cell(cur) {
            Ok(cell) if !blocks_vision(cell) => {}
            _ => return false,
        }
        cur = cur.offset(dx, dy);
    }
    true
}

impl Enemy {
    pub fn walker(board: &Board, start: Pos, seed: u64, speed: u16) -> Result<Self, SpawnError> {
        check_start(board, start)?;
        Ok(Self {
            pos: start,
            speed,
            tick: 0,
            behavior: Behavior::Walker {
                rng: Random::new(seed),
                last_dir: None,
            },
        })
    }

    pub fn patroller(board: &Board, start: Pos, end: Pos, speed: u16) -> Result<Self, SpawnError> {
        check_start(board, start)?;
        Ok(Self {
            pos: start,
            speed,
            tick: 0,
            behavior: Behavior::Patroller {
                start,
                end,
                forward: true,
            },
        })
    }

    pub fn chaser(
        board: &Board,
        start: Pos,
        seed: u64,
        speed: u16,
        vision: u16,
    ) -> Result<Self, SpawnError> {
        check_start(board, start)?;
        let mut state = ChaserState {
            rng: Random::new(seed),
            idle_speed: CHASER_IDLE_SPEED,
            chase_speed: speed,
            vision,
            wander_dir: Direction::Up,
            wander_hold: 0,
            chasing: false,
        };
        state.pick_wander_dir();
        Ok(Self {
            pos: start,
            speed: CHASER_IDLE_SPEED,
            tick: 0,
            behavior: Behavior::Chaser(state),
        })
    }

    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Walker { .. } => EnemyKind::Walker,
            Behavior::Patroller { .. } => EnemyKind::Patroller,
            Behavior::Chaser(_) => EnemyKind::Chaser,
        }
    }

    pub fn score_value(&self) -> u32 {
        self.kind().score_value()
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn speed(&self) -> u16 {
        self.speed
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn is_chasing(&self) -> bool {
        matches!(&self.behavior, Behavior::Chaser(state) if state.chasing)
    }

    pub fn sees(&self, board: &Board, target: Pos) -> bool {
        match &self.behavior {
            Behavior::Chaser(state) => line_of_sight(board, self.pos, target, state.vision),
            _ => false,
        }
    }

    pub fn update(&mut self, board: &Board, player: &Player) {
        if let Behavior::Chaser(state) = &mut self.behavior {
            let seen = !player.is_invulnerable()
                && line_of_sight(board, self.pos, player.pos(), state.vision);
            state.chasing = seen;
            self.speed = if seen {
                state.chase_speed
            } else {
                state.idle_speed
            };
        }

        self.tick = self.tick.saturating_add(1);
        if self.tick < self.speed {
            return;
        }
        self.tick = 0;

        let pos = &mut self.pos;
        match &mut self.behavior {
            Behavior::Walker { rng, last_dir } => walk(pos, board, rng, last_dir),
            Behavior::Patroller {
                start,
                end,
                forward,
            } => patrol(pos, board, *start, *end, forward),
            Behavior::Chaser(state) => {
                if state.chasing {
                    chase(pos, board, state, player.pos());
                } else {
                    wander(pos, board, state);
                }
            }
        }
    }
}

fn walk(pos: &mut Pos, board: &Board, rng: &mut Random, last_dir: &mut Option<Direction>) {
    let mut dirs = Direction::ALL;
    dirs.shuffle(rng);
    let reverse = last_dir.map(Direction::opposite);
    for pass in 0..2 {
        for dir in dirs {
            if pass == 0 && Some(dir) == reverse {
                continue;
            }
            let (dx, dy) = dir.delta();
            if try_step(pos, board, dx, dy) {
                *last_dir = Some(dir);
                return;
            }
        }
    }
}

fn patrol(pos: &mut Pos, board: &Board, start: Pos, end: Pos, forward: &mut bool) {
    let target = if *forward { end } else { start };
    if *pos == target {
        *forward = !*forward;
        return;
    }
    let step_x = (target.x - pos.x).signum();
    let step_y = (target.y - pos.y).signum();
    if step_x != 0 && try_step(pos, board, step_x, 0) {
        return;
    }
    if step_y != 0 && try_step(pos, board, 0, step_y) {
        return;
    }
    *forward = !*forward;
}

fn chase(pos: &mut Pos, board: &Board, state: &mut ChaserState, target: Pos) {
    let dx = (target.x - pos.x).signum();
    let dy = (target.y - pos.y).signum();
    let adx = (target.x - pos.x).abs();
    let ady = (target.y - pos.y).abs();
    let x_first = if adx == ady {
        state.rng.gen_bool(0.5)
    } else {
        adx > ady
    };

    let moved = if x_first {
        (dx != 0 && try_step(pos, board, dx, 0)) || (dy != 0 && try_step(pos, board, 0, dy))
    } else {
        (dy != 0 && try_step(pos, board, 0, dy)) || (dx != 0 && try_step(pos, board, dx, 0))
    };
    if !moved {
        wander(pos, board, state);
    }
}

fn wander(pos: &mut Pos, board: &Board, state: &mut ChaserState) {
    if state.wander_hold == 0 {
        state.pick_wander_dir();
    } else {
        state.wander_hold -= 1;
    }
    let (dx, dy) = state.wander_dir.delta();
    if try_step(pos, board, dx, dy) {
        return;
    }
    for _ in 0..WANDER_RETRIES {
        state.pick_wander_dir();
        let (dx, dy) = state.wander_dir.delta();
        if try_step(pos, board, dx, dy) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena(width: u16, height: u16) -> Board {
        let (w, h) = (width as i32, height as i32);
        let mut board = Board::new(width, height);
        for y in 0..h {
            for x in 0..w {
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    board.set_cell(Pos::new(x, y), CellType::WallSolid).unwrap();
                }
            }
        }
        board
    }

    fn corridor(length: u16) -> Board {
        arena(length, 3)
    }

    fn player_at(board: &Board, pos: Pos) -> Player {
        Player::new(board, pos).unwrap()
    }

    fn chaser_state(enemy: &mut Enemy) -> &mut ChaserState {
        match &mut enemy.behavior {
            Behavior::Chaser(state) => state,
            other => panic!("not a chaser: {other:?}"),
        }
    }

    // A chaser that never sees `player` and wanders every tick.
    fn blind_chaser(board: &Board, start: Pos, seed: u64) -> Enemy {
        let mut chaser = Enemy::chaser(board, start, seed, 1, 0).unwrap();
        chaser_state(&mut chaser).idle_speed = 1;
        chaser
    }

    #[test]
    fn constructors_validate_start() {
        let board = arena(5, 5);
        assert_eq!(
            Enemy::walker(&board, Pos::new(0, 0), 1, 1).unwrap_err(),
            SpawnError::InvalidStartingPosition { x: 0, y: 0 }
        );
        assert!(Enemy::patroller(&board, Pos::new(9, 9), Pos::new(1, 1), 1).is_err());
        assert_eq!(
            Enemy::chaser(&Board::default(), Pos::new(1, 1), 1, 1, 4).unwrap_err(),
            SpawnError::Board(BoardError::NotInitialized)
        );
    }

    #[test]
    fn score_values_by_kind() {
        let board = arena(5, 5);
        let w = Enemy::walker(&board, Pos::new(1, 1), 1, 1).unwrap();
        let p = Enemy::patroller(&board, Pos::new(1, 1), Pos::new(3, 1), 1).unwrap();
        let c = Enemy::chaser(&board, Pos::new(1, 1), 1, 1, 4).unwrap();
        assert_eq!(w.score_value(), 100);
        assert_eq!(p.score_value(), 150);
        assert_eq!(c.score_value(), 300);
    }

    #[test]
    fn moves_only_when_tick_reaches_speed() {
        let board = arena(7, 7);
        let player = player_at(&board, Pos::new(5, 5));
        let mut walker = Enemy::walker(&board, Pos::new(3, 3), 99, 3).unwrap();
        walker.update(&board, &player);
        walker.update(&board, &player);
        assert_eq!(walker.pos(), Pos::new(3, 3));
        walker.update(&board, &player);
        assert_ne!(walker.pos(), Pos::new(3, 3));
    }

    #[test]
    fn walker_does_not_backtrack_in_corridor() {
        let board = corridor(12);
        let player = player_at(&board, Pos::new(1, 1));
        for seed in [1u64, 7, 1234, 0xBEEF] {
            let mut walker = Enemy::walker(&board, Pos::new(5, 1), seed, 1).unwrap();
            walker.update(&board, &player);
            let first = walker.pos();
            let heading = (first.x - 5).signum();
            assert_ne!(heading, 0);
            let mut prev = first;
            while (1..=10).contains(&(prev.x + heading)) {
                walker.update(&board, &player);
                assert_eq!(walker.pos().x - prev.x, heading, "seed {seed}");
                prev = walker.pos();
            }
            // Dead end: the only way out is back.
            walker.update(&board, &player);
            assert_eq!(walker.pos().x - prev.x, -heading);
        }
    }

    #[test]
    fn boxed_in_walker_stays_put() {
        let mut board = arena(3, 3);
        board.set_cell(Pos::new(1, 1), CellType::Empty).unwrap();
        let player = player_at(&board, Pos::new(1, 1));
        let mut walker = Enemy::walker(&board, Pos::new(1, 1), 5, 1).unwrap();
        walker.update(&board, &player);
        assert_eq!(walker.pos(), Pos::new(1, 1));
    }

    #[test]
    fn patroller_shuttles_between_waypoints() {
        let board = corridor(8);
        let player = player_at(&board, Pos::new(6, 1));
        let mut patroller = Enemy::patroller(&board, Pos::new(1, 1), Pos::new(3, 1), 1).unwrap();

        patroller.update(&board, &player);
        assert_eq!(patroller.pos(), Pos::new(2, 1));
        patroller.update(&board, &player);
        assert_eq!(patroller.pos(), Pos::new(3, 1));
        // Arrival tick only flips direction.
        patroller.update(&board, &player);
        assert_eq!(patroller.pos(), Pos::new(3, 1));
        patroller.update(&board, &player);
        assert_eq!(patroller.pos(), Pos::new(2, 1));
    }

    #[test]
    fn patroller_reverses_when_blocked() {
        let mut board = corridor(8);
        board
            .set_cell(Pos::new(3, 1), CellType::WallDestructible)
            .unwrap();
        let player = player_at(&board, Pos::new(6, 1));
        let mut patroller = Enemy::patroller(&board, Pos::new(1, 1), Pos::new(5, 1), 1).unwrap();

        patroller.update(&board, &player);
        assert_eq!(patroller.pos(), Pos::new(2, 1));
        patroller.update(&board, &player);
        assert_eq!(patroller.pos(), Pos::new(2, 1));
        patroller.update(&board, &player);
        assert_eq!(patroller.pos(), Pos::new(1, 1));
    }

    #[test]
    fn sight_is_blocked_by_opaque_cells() {
        let mut board = arena(10, 5);
        let chaser = Enemy::chaser(&board, Pos::new(1, 2), 3, 1, 16).unwrap();
        let target = Pos::new(7, 2);
        assert!(chaser.sees(&board, target));

        for blocker in [CellType::WallSolid, CellType::WallDestructible, CellType::Bomb] {
            board.set_cell(Pos::new(4, 2), blocker).unwrap();
            assert!(!chaser.sees(&board, target), "{blocker:?}");
        }
        board.set_cell(Pos::new(4, 2), CellType::Explosion).unwrap();
        assert!(chaser.sees(&board, target));

        assert!(!chaser.sees(&board, Pos::new(7, 3)));
    }

    #[test]
    fn sight_respects_vision_range() {
        let board = arena(12, 12);
        let chaser = Enemy::chaser(&board, Pos::new(1, 1), 3, 1, 4).unwrap();
        assert!(chaser.sees(&board, Pos::new(1, 5)));
        assert!(!chaser.sees(&board, Pos::new(1, 6)));
    }

    #[test]
    fn chaser_closes_in_on_visible_player() {
        let board = arena(10, 5);
        let player = player_at(&board, Pos::new(6, 2));
        let mut chaser = Enemy::chaser(&board, Pos::new(2, 2), 11, 1, 16).unwrap();
        chaser.update(&board, &player);
        assert!(chaser.is_chasing());
        assert_eq!(chaser.speed(), 1);
        assert_eq!(chaser.pos(), Pos::new(3, 2));
        chaser.update(&board, &player);
        assert_eq!(chaser.pos(), Pos::new(4, 2));
    }

    #[test]
    fn chaser_ignores_invulnerable_player() {
        let board = arena(10, 5);
        let mut player = player_at(&board, Pos::new(6, 2));
        player.set_invulnerability(50);
        let mut chaser = Enemy::chaser(&board, Pos::new(2, 2), 11, 1, 16).unwrap();
        chaser.update(&board, &player);
        assert!(!chaser.is_chasing());
        assert_eq!(chaser.speed(), CHASER_IDLE_SPEED);
        assert_eq!(chaser.pos(), Pos::new(2, 2));
    }

    #[test]
    fn wandering_chaser_stays_on_walkable_cells() {
        let mut board = arena(9, 9);
        board.set_cell(Pos::new(4, 4), CellType::WallSolid).unwrap();
        let player = player_at(&board, Pos::new(7, 7));
        let mut chaser = Enemy::chaser(&board, Pos::new(1, 1), 77, 1, 0).unwrap();
        for _ in 0..500 {
            chaser.update(&board, &player);
            assert!(board.is_walkable(chaser.pos()).unwrap());
        }
    }

    #[test]
    fn patroller_steps_x_before_y() {
        let board = arena(7, 7);
        let player = player_at(&board, Pos::new(5, 5));
        let mut patroller = Enemy::patroller(&board, Pos::new(1, 1), Pos::new(3, 3), 1).unwrap();
        for expected in [(2, 1), (3, 1), (3, 2), (3, 3)] {
            patroller.update(&board, &player);
            assert_eq!(patroller.pos(), Pos::new(expected.0, expected.1));
        }

        let mut board = arena(7, 7);
        board.set_cell(Pos::new(2, 1), CellType::WallSolid).unwrap();
        let mut patroller = Enemy::patroller(&board, Pos::new(1, 1), Pos::new(3, 3), 1).unwrap();
        patroller.update(&board, &player);
        assert_eq!(patroller.pos(), Pos::new(1, 2));
        patroller.update(&board, &player);
        assert_eq!(patroller.pos(), Pos::new(2, 2));
    }

    #[test]
    fn blocked_chase_falls_back_to_wandering() {
        let mut board = corridor(10);
        let player = player_at(&board, Pos::new(3, 1));
        // The player stands on their own bomb right next to the chaser.
        board.set_cell(Pos::new(3, 1), CellType::Bomb).unwrap();
        let mut chaser = Enemy::chaser(&board, Pos::new(2, 1), 4, 1, 16).unwrap();
        {
            let state = chaser_state(&mut chaser);
            state.wander_dir = Direction::Left;
            state.wander_hold = 3;
        }

        chaser.update(&board, &player);
        assert!(chaser.is_chasing());
        assert_eq!(chaser.pos(), Pos::new(1, 1));
        assert_eq!(chaser_state(&mut chaser).wander_hold, 2);
    }

    #[test]
    fn wander_keeps_direction_until_hold_runs_out() {
        let board = arena(41, 41);
        let player = player_at(&board, Pos::new(1, 1));
        let mut chaser = blind_chaser(&board, Pos::new(20, 20), 5);
        {
            let state = chaser_state(&mut chaser);
            state.wander_dir = Direction::Right;
            state.wander_hold = 2;
        }

        chaser.update(&board, &player);
        assert_eq!(chaser.pos(), Pos::new(21, 20));
        assert_eq!(chaser_state(&mut chaser).wander_hold, 1);
        chaser.update(&board, &player);
        assert_eq!(chaser.pos(), Pos::new(22, 20));
        assert_eq!(chaser_state(&mut chaser).wander_hold, 0);

        // Hold exhausted: a fresh direction and hold are drawn.
        chaser.update(&board, &player);
        let (dir, hold) = {
            let state = chaser_state(&mut chaser);
            (state.wander_dir, state.wander_hold)
        };
        assert!((WANDER_HOLD_MIN..=WANDER_HOLD_MAX).contains(&hold), "{hold}");
        let mut expected = Pos::new(22, 20).step(dir);
        assert_eq!(chaser.pos(), expected);

        for left in (0..hold).rev() {
            chaser.update(&board, &player);
            expected = expected.step(dir);
            assert_eq!(chaser.pos(), expected);
            let state = chaser_state(&mut chaser);
            assert_eq!(state.wander_dir, dir);
            assert_eq!(state.wander_hold, left);
        }
    }

    #[test]
    fn boxed_in_chaser_gives_up_after_six_repicks() {
        let board = arena(3, 3);
        let mut player = player_at(&board, Pos::new(1, 1));
        player.set_invulnerability(50);
        let mut chaser = blind_chaser(&board, Pos::new(1, 1), 21);
        chaser_state(&mut chaser).wander_hold = 5;
        let mut expected = chaser_state(&mut chaser).clone();
        for _ in 0..WANDER_RETRIES {
            expected.pick_wander_dir();
        }

        chaser.update(&board, &player);
        assert_eq!(chaser.pos(), Pos::new(1, 1));
        let state = chaser_state(&mut chaser);
        assert_eq!(state.rng, expected.rng);
        assert_eq!(state.wander_dir, expected.wander_dir);
        assert_eq!(state.wander_hold, expected.wander_hold);
    }

    #[test]
    fn repicks_stop_at_the_first_open_direction() {
        // One open neighbour: (2, 1) to the right.
        let board = arena(4, 3);
        let mut player = player_at(&board, Pos::new(2, 1));
        player.set_invulnerability(50);
        let mut moved = 0;
        for seed in 1..=20 {
            let mut chaser = blind_chaser(&board, Pos::new(1, 1), seed);
            {
                let state = chaser_state(&mut chaser);
                state.wander_dir = Direction::Left;
                state.wander_hold = 5;
            }
            let mut expected = chaser_state(&mut chaser).clone();
            let found = (0..WANDER_RETRIES).any(|_| {
                expected.pick_wander_dir();
                expected.wander_dir == Direction::Right
            });

            chaser.update(&board, &player);
            let want = if found { Pos::new(2, 1) } else { Pos::new(1, 1) };
            assert_eq!(chaser.pos(), want, "seed {seed}");
            assert_eq!(chaser_state(&mut chaser).rng, expected.rng, "seed {seed}");
            moved += usize::from(found);
        }
        assert!(moved > 0);
    }

    #[test]
    fn same_cell_tie_flips_a_coin_then_wanders() {
        let board = arena(7, 5);
        let player = player_at(&board, Pos::new(3, 2));
        let mut chaser = Enemy::chaser(&board, Pos::new(3, 2), 8, 1, 16).unwrap();
        {
            let state = chaser_state(&mut chaser);
            state.wander_dir = Direction::Right;
            state.wander_hold = 3;
        }
        let mut rng = chaser_state(&mut chaser).rng;
        let _: bool = rng.gen_bool(0.5);

        chaser.update(&board, &player);
        assert!(chaser.is_chasing());
        assert_eq!(chaser.pos(), Pos::new(4, 2));
        let state = chaser_state(&mut chaser);
        assert_eq!(state.rng, rng);
        assert_eq!(state.wander_hold, 2);
    }

    #[test]
    fn sight_changes_move_timing_immediately() {
        let board = arena(10, 5);
        let mut player = player_at(&board, Pos::new(6, 2));
        player.set_invulnerability(50);
        let mut chaser = Enemy::chaser(&board, Pos::new(2, 2), 3, 3, 16).unwrap();

        // Idle: the first tick counts against the slow threshold.
        chaser.update(&board, &player);
        assert_eq!(chaser.speed(), CHASER_IDLE_SPEED);
        assert_eq!(chaser.pos(), Pos::new(2, 2));

        // Spotted: the third tick already reaches the chase threshold.
        player.remove_invulnerability();
        chaser.update(&board, &player);
        assert_eq!(chaser.speed(), 3);
        assert_eq!(chaser.pos(), Pos::new(2, 2));
        chaser.update(&board, &player);
        assert_eq!(chaser.pos(), Pos::new(3, 2));

        // Lost again two ticks in: the third tick no longer moves.
        chaser.update(&board, &player);
        chaser.update(&board, &player);
        assert_eq!(chaser.pos(), Pos::new(3, 2));
        player.set_invulnerability(50);
        chaser.update(&board, &player);
        assert_eq!(chaser.speed(), CHASER_IDLE_SPEED);
        assert_eq!(chaser.pos(), Pos::new(3, 2));
        for _ in 0..CHASER_IDLE_SPEED - 4 {
            chaser.update(&board, &player);
            assert_eq!(chaser.pos(), Pos::new(3, 2));
        }
        chaser.update(&board, &player);
        assert_ne!(chaser.pos(), Pos::new(3, 2));
    }
}
