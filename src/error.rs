use std::io;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("board access out of bounds: ({x}, {y})")]
    OutOfBounds { x: i32, y: i32 },
    #[error("access to a board that has not been initialized")]
    NotInitialized,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    #[error("starting position ({x}, {y}) is not walkable")]
    InvalidStartingPosition { x: i32, y: i32 },
    #[error("invalid board: {0}")]
    Board(#[from] BoardError),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LevelError {
    #[error("cannot create enemy at ({x}, {y}): {source}")]
    Enemy {
        x: i32,
        y: i32,
        #[source]
        source: SpawnError,
    },
    #[error("map has no spawn tile")]
    MissingSpawn,
    #[error("cannot place player: {0}")]
    Player(#[from] SpawnError),
    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot open bonus CSV: {0}")]
    Io(#[from] io::Error),
    #[error("invalid tile type value in CSV (line {line})")]
    InvalidTileType { line: usize },
    #[error("tile position out of bounds in CSV (line {line})")]
    OutOfBounds { line: usize },
    #[error("duplicate (x,y) entry in CSV (line {line})")]
    Duplicate { line: usize },
    #[error("gate tiles must not be placed on the map border (line {line})")]
    GateOnBorder { line: usize },
    #[error("CSV must contain exactly one SPAWN tile, found {found}")]
    SpawnCount { found: usize },
    #[error("CSV must contain at least a gate tile")]
    NoGate,
    #[error("SPAWN must not be on the border")]
    SpawnOnBorder,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard file error: {0}")]
    Io(#[from] io::Error),
}
