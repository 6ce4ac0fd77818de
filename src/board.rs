use crate::components::Pos;
use crate::error::BoardError;

pub const EXPLOSION_TTL: u16 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    Empty,
    WallSolid,
    WallDestructible,
    Explosion,
    GateNext,
    GatePrev,
    Bomb,
}

impl CellType {
    pub const ALL: [CellType; 7] = [
        CellType::Empty,
        CellType::WallSolid,
        CellType::WallDestructible,
        CellType::Explosion,
        CellType::GateNext,
        CellType::GatePrev,
        CellType::Bomb,
    ];

    pub fn is_walkable(self) -> bool {
        matches!(
            self,
            CellType::Empty | CellType::Explosion | CellType::GateNext | CellType::GatePrev
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    width: u16,
    height: u16,
    cells: Vec<CellType>,
    explosion_ttl: Vec<u16>,
}

impl Board {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![CellType::Empty; len],
            explosion_ttl: vec![0; len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn is_initialized(&self) -> bool {
        !self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    fn index(&self, pos: Pos) -> Result<usize, BoardError> {
        if !self.is_initialized() {
            return Err(BoardError::NotInitialized);
        }
        if !self.contains(pos) {
            return Err(BoardError::OutOfBounds { x: pos.x, y: pos.y });
        }
        Ok(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn clear(&mut self) {
        self.cells.fill(CellType::Empty);
        self.explosion_ttl.fill(0);
    }

    pub fn set_cell(&mut self, pos: Pos, cell: CellType) -> Result<(), BoardError> {
        let idx = self.index(pos)?;
        self.cells[idx] = cell;
        if cell == CellType::Explosion {
            self.explosion_ttl[idx] = EXPLOSION_TTL;
        }
        Ok(())
    }

    pub fn cell(&self, pos: Pos) -> Result<CellType, BoardError> {
        Ok(self.cells[self.index(pos)?])
    }

    pub fn explosion_ttl(&self, pos: Pos) -> Result<u16, BoardError> {
        Ok(self.explosion_ttl[self.index(pos)?])
    }

    pub fn is_walkable(&self, pos: Pos) -> Result<bool, BoardError> {
        Ok(self.cell(pos)?.is_walkable())
    }

    pub fn damage_taken(&self, pos: Pos) -> Result<bool, BoardError> {
        Ok(self.cell(pos)? == CellType::Explosion)
    }

    pub fn clear_explosions(&mut self) -> Result<(), BoardError> {
        if !self.is_initialized() {
            return Err(BoardError::NotInitialized);
        }
        for cell in &mut self.cells {
            if *cell == CellType::Explosion {
                *cell = CellType::Empty;
            }
        }
        Ok(())
    }

    /// Advances every armed explosion by one tick. A cell only reverts to
    /// `Empty` if it still holds an explosion when its timer runs out.
    pub fn update_explosions(&mut self) -> Result<(), BoardError> {
        if !self.is_initialized() {
            return Err(BoardError::NotInitialized);
        }
        for (cell, ttl) in self.cells.iter_mut().zip(self.explosion_ttl.iter_mut()) {
            if *ttl == 0 {
                continue;
            }
            *ttl -= 1;
            if *ttl == 0 && *cell == CellType::Explosion {
                *cell = CellType::Empty;
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, CellType)> + '_ {
        let width = self.width.max(1) as usize;
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            let pos = Pos::new((idx % width) as i32, (idx / width) as i32);
            (pos, *cell)
        })
    }
}
