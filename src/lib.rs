//! Tick-driven bomber arena: a grid with timed explosions, bombs with
//! cross-shaped blasts, three enemy behaviours, power-ups and gate-linked
//! levels, plus the crossterm renderer used by the `bomber` binary.

pub mod board;
pub mod bomb;
pub mod components;
pub mod config;
pub mod enemy;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod level;
pub mod map;
pub mod parser;
pub mod player;
pub mod powerup;
pub mod random;
pub mod render;

pub use board::{Board, CellType};
pub use bomb::Bomb;
pub use components::{Direction, Pos};
pub use config::Settings;
pub use enemy::{Enemy, EnemyKind};
pub use error::{BoardError, LeaderboardError, LevelError, ParseError, SpawnError};
pub use game::{Command, Game, Status};
pub use leaderboard::Leaderboard;
pub use level::{Level, Transition};
pub use map::{Map, Tile, TileKind};
pub use player::Player;
pub use powerup::{PowerUp, PowerUpKind};
pub use random::Random;
