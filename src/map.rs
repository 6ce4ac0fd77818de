use crate::components::Pos;
use crate::enemy::PATROLLER_DEFAULT_SPEED;

pub const MAP_WIDTH: u16 = 27;
pub const MAP_HEIGHT: u16 = 22;

pub const MAP_WALKER_SPEED: u16 = 12;
pub const MAP_CHASER_SPEED: u16 = 10;

/// Tile markers a map is authored with. The discriminants are the ordinals
/// used by the bonus level file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileKind {
    #[default]
    Empty = 0,
    Solid = 1,
    Destructible = 2,
    Spawn = 3,
    Walker = 4,
    Patroller = 5,
    Chaser = 6,
    GateNext = 7,
    GatePrev = 8,
}

impl TileKind {
    pub fn from_ordinal(value: u32) -> Option<TileKind> {
        let kind = match value {
            0 => TileKind::Empty,
            1 => TileKind::Solid,
            2 => TileKind::Destructible,
            3 => TileKind::Spawn,
            4 => TileKind::Walker,
            5 => TileKind::Patroller,
            6 => TileKind::Chaser,
            7 => TileKind::GateNext,
            8 => TileKind::GatePrev,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_gate(self) -> bool {
        matches!(self, TileKind::GateNext | TileKind::GatePrev)
    }

    fn is_fill(self) -> bool {
        matches!(self, TileKind::Empty | TileKind::Solid | TileKind::Destructible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tile {
    pub kind: TileKind,
    pub start: Pos,
    pub end: Pos,
    pub speed: u16,
}

impl Tile {
    pub fn plain(kind: TileKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    width: u16,
    height: u16,
    tiles: Vec<Tile>,
}

impl Default for Map {
    fn default() -> Self {
        Self::new(MAP_WIDTH, MAP_HEIGHT)
    }
}

impl Map {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    pub fn is_border(&self, pos: Pos) -> bool {
        pos.x == 0 || pos.y == 0 || pos.x == self.width as i32 - 1 || pos.y == self.height as i32 - 1
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn at(&self, pos: Pos) -> Option<&Tile> {
        self.index(pos).map(|idx| &self.tiles[idx])
    }

    pub fn set(&mut self, pos: Pos, tile: Tile) {
        if let Some(idx) = self.index(pos) {
            self.tiles[idx] = tile;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, &Tile)> + '_ {
        let width = self.width.max(1) as usize;
        self.tiles.iter().enumerate().map(move |(idx, tile)| {
            (Pos::new((idx % width) as i32, (idx / width) as i32), tile)
        })
    }

    pub fn row(&mut self, y: i32, x1: i32, x2: i32, kind: TileKind) {
        self.fill(x1, y, x2, y, kind);
    }

    pub fn column(&mut self, x: i32, y1: i32, y2: i32, kind: TileKind) {
        self.fill(x, y1, x, y2, kind);
    }

    pub fn fill(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, kind: TileKind) {
        if !kind.is_fill() {
            return;
        }
        let (x1, x2) = (x1.min(x2).max(0), x1.max(x2).min(self.width as i32 - 1));
        let (y1, y2) = (y1.min(y2).max(0), y1.max(y2).min(self.height as i32 - 1));
        for y in y1..=y2 {
            for x in x1..=x2 {
                self.set(Pos::new(x, y), Tile::plain(kind));
            }
        }
    }

    pub fn border_walls(&mut self) {
        let (w, h) = (self.width as i32, self.height as i32);
        self.row(0, 0, w - 1, TileKind::Solid);
        self.row(h - 1, 0, w - 1, TileKind::Solid);
        self.column(0, 0, h - 1, TileKind::Solid);
        self.column(w - 1, 0, h - 1, TileKind::Solid);
    }

    pub fn pillars(&mut self) {
        for y in (2..self.height as i32 - 3).step_by(2) {
            for x in (2..self.width as i32 - 1).step_by(2) {
                self.set(Pos::new(x, y), Tile::plain(TileKind::Solid));
            }
        }
    }

    pub fn set_spawn(&mut self, pos: Pos) {
        self.set(pos, Tile::plain(TileKind::Spawn));
    }

    pub fn gate_next(&mut self, pos: Pos) {
        self.set(pos, Tile::plain(TileKind::GateNext));
    }

    pub fn gate_prev(&mut self, pos: Pos) {
        self.set(pos, Tile::plain(TileKind::GatePrev));
    }

    pub fn spawn_walker(&mut self, pos: Pos, speed: u16) {
        self.set(pos, enemy_tile(TileKind::Walker, pos, pos, speed));
    }

    pub fn spawn_chaser(&mut self, pos: Pos, speed: u16) {
        self.set(pos, enemy_tile(TileKind::Chaser, pos, pos, speed));
    }

    pub fn spawn_patroller(&mut self, pos: Pos, end: Pos, speed: u16) {
        self.set(pos, enemy_tile(TileKind::Patroller, pos, end, speed));
    }
}

fn enemy_tile(kind: TileKind, start: Pos, end: Pos, speed: u16) -> Tile {
    Tile {
        kind,
        start,
        end,
        speed,
    }
}

const GATE_ROW: i32 = 11;
const GATE_PREV_POS: Pos = Pos::new(1, GATE_ROW);
const GATE_NEXT_POS: Pos = Pos::new(MAP_WIDTH as i32 - 2, GATE_ROW);

fn base() -> Map {
    let mut m = Map::default();
    m.pillars();
    m.border_walls();
    m
}

// Keeps the cells next to both gates free so arrivals never land in a wall.
fn clear_gate_approaches(m: &mut Map) {
    m.fill(2, GATE_ROW - 1, 3, GATE_ROW + 1, TileKind::Empty);
    let x = GATE_NEXT_POS.x;
    m.fill(x - 2, GATE_ROW - 1, x - 1, GATE_ROW + 1, TileKind::Empty);
}

pub fn campaign() -> Vec<Map> {
    vec![courtyard(), bunker(), switchyard(), foundry(), citadel()]
}

pub fn courtyard() -> Map {
    let mut m = base();
    m.row(5, 3, 9, TileKind::Destructible);
    m.row(5, 15, 23, TileKind::Destructible);
    m.row(15, 5, 21, TileKind::Destructible);
    m.column(13, 3, 13, TileKind::Destructible);
    m.column(19, 7, 13, TileKind::Destructible);
    clear_gate_approaches(&mut m);

    m.set_spawn(Pos::new(1, 1));
    m.gate_next(GATE_NEXT_POS);
    m.spawn_walker(Pos::new(7, 9), MAP_WALKER_SPEED);
    m.spawn_walker(Pos::new(21, 17), MAP_WALKER_SPEED);
    m.spawn_patroller(Pos::new(3, 19), Pos::new(11, 19), 5);
    m
}

pub fn bunker() -> Map {
    let mut m = base();
    m.fill(4, 3, 9, 7, TileKind::Destructible);
    m.fill(17, 3, 22, 7, TileKind::Destructible);
    m.fill(4, 14, 9, 18, TileKind::Destructible);
    m.fill(17, 14, 22, 18, TileKind::Destructible);
    m.column(7, 9, 13, TileKind::Destructible);
    m.column(19, 9, 13, TileKind::Destructible);
    clear_gate_approaches(&mut m);

    m.set_spawn(Pos::new(13, 1));
    m.gate_prev(GATE_PREV_POS);
    m.gate_next(GATE_NEXT_POS);
    m.spawn_patroller(Pos::new(9, 11), Pos::new(17, 11), PATROLLER_DEFAULT_SPEED);
    m.spawn_walker(Pos::new(13, 19), MAP_WALKER_SPEED);
    m.spawn_chaser(Pos::new(13, 15), MAP_CHASER_SPEED);
    m
}

pub fn switchyard() -> Map {
    let mut m = base();
    for y in [3, 7, 13, 17] {
        m.row(y, 3, 23, TileKind::Destructible);
    }
    for x in [5, 11, 15, 21] {
        m.set(Pos::new(x, 3), Tile::plain(TileKind::Empty));
        m.set(Pos::new(x, 17), Tile::plain(TileKind::Empty));
    }
    m.column(9, 8, 12, TileKind::Destructible);
    m.column(17, 8, 12, TileKind::Destructible);
    clear_gate_approaches(&mut m);

    m.set_spawn(Pos::new(1, 19));
    m.gate_prev(GATE_PREV_POS);
    m.gate_next(GATE_NEXT_POS);
    m.spawn_patroller(Pos::new(3, 5), Pos::new(23, 5), 3);
    m.spawn_patroller(Pos::new(23, 15), Pos::new(3, 15), 3);
    m.spawn_walker(Pos::new(13, 9), MAP_WALKER_SPEED);
    m.spawn_chaser(Pos::new(13, 19), MAP_CHASER_SPEED);
    m
}

pub fn foundry() -> Map {
    let mut m = base();
    m.fill(3, 3, 23, 9, TileKind::Destructible);
    m.fill(3, 13, 23, 18, TileKind::Destructible);
    m.fill(11, 5, 15, 7, TileKind::Empty);
    m.fill(11, 15, 15, 17, TileKind::Empty);
    m.row(GATE_ROW, 3, 23, TileKind::Empty);
    m.pillars();
    clear_gate_approaches(&mut m);

    m.set_spawn(Pos::new(13, 20));
    m.gate_prev(GATE_PREV_POS);
    m.gate_next(GATE_NEXT_POS);
    m.spawn_chaser(Pos::new(13, 5), 8);
    m.spawn_chaser(Pos::new(13, 17), 8);
    m.spawn_walker(Pos::new(7, 11), 10);
    m.spawn_walker(Pos::new(19, 11), 10);
    m
}

pub fn citadel() -> Map {
    let mut m = base();
    m.fill(8, 5, 18, 16, TileKind::Solid);
    m.fill(9, 6, 17, 15, TileKind::Destructible);
    m.fill(11, 9, 15, 12, TileKind::Empty);
    for (x, y) in [(13, 5), (13, 16), (8, 11), (18, 11)] {
        m.set(Pos::new(x, y), Tile::plain(TileKind::Destructible));
    }
    m.row(3, 3, 23, TileKind::Destructible);
    m.row(19, 3, 23, TileKind::Destructible);
    clear_gate_approaches(&mut m);

    m.set_spawn(Pos::new(1, 1));
    m.gate_prev(GATE_PREV_POS);
    m.gate_next(GATE_NEXT_POS);
    m.spawn_chaser(Pos::new(13, 11), 6);
    m.spawn_chaser(Pos::new(5, 17), 8);
    m.spawn_patroller(Pos::new(3, 1), Pos::new(23, 1), 4);
    m.spawn_walker(Pos::new(21, 13), 8);
    m
}
