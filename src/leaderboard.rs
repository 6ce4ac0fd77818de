use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::error::LeaderboardError;

pub const MAX_ENTRIES: usize = 50;
pub const NAME_LEN: usize = 3;
const NAME_PAD: char = 'A';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .chain(std::iter::repeat(NAME_PAD))
        .take(NAME_LEN)
        .collect()
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a score. When the board is full the new score only gets in
    /// by beating the current last entry, which it then replaces.
    pub fn add(&mut self, name: &str, score: u32) {
        let entry = ScoreEntry {
            name: normalize_name(name),
            score,
        };
        if self.entries.len() >= MAX_ENTRIES {
            match self.entries.last_mut() {
                Some(last) if score > last.score => *last = entry,
                _ => return,
            }
        } else {
            self.entries.push(entry);
        }
        self.entries
            .sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn top(&self, n: usize) -> &[ScoreEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn parse(text: &str) -> Self {
        let mut board = Self::new();
        for line in text.lines() {
            let Some((name, score)) = line.split_once(';') else {
                continue;
            };
            let score = score.trim().parse().unwrap_or(0);
            board.add(name, score);
        }
        board
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LeaderboardError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let board = Self::parse(&text);
                info!(path = %path.display(), entries = board.len(), "leaderboard loaded");
                Ok(board)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "no leaderboard file yet");
                Ok(Self::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LeaderboardError> {
        let mut out = String::new();
        for entry in &self.entries {
            // Writing into a String cannot fail.
            let _ = writeln!(out, "{};{}", entry.name, entry.score);
        }
        fs::write(path, out)?;
        Ok(())
    }
}
