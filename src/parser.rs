use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::components::Pos;
use crate::error::ParseError;
use crate::map::{Map, Tile, TileKind, MAP_HEIGHT, MAP_WIDTH};

const FIELDS: usize = 8;

pub fn load_bonus_file(path: impl AsRef<Path>) -> Result<Map, ParseError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let map = parse_bonus(&text)?;
    info!(path = %path.display(), "bonus level loaded");
    Ok(map)
}

/// Every meaningful line is `type;x;y;start_x;start_y;end_x;end_y;speed`,
/// `type` being a [`TileKind`] ordinal. Lines that do not hold exactly eight
/// integers are skipped. The border is always walled off.
pub fn parse_bonus(input: &str) -> Result<Map, ParseError> {
    let mut map = Map::new(MAP_WIDTH, MAP_HEIGHT);
    let mut used = HashSet::new();
    let mut spawns = Vec::new();
    let mut has_gate = false;

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let Some(values) = split_fields(text) else {
            debug!(line, "skipping malformed bonus line");
            continue;
        };
        let [kind, x, y, sx, sy, ex, ey, speed] = values;

        let kind = TileKind::from_ordinal(kind).ok_or(ParseError::InvalidTileType { line })?;
        let pos = Pos::new(coord(x), coord(y));
        if !map.contains(pos) {
            return Err(ParseError::OutOfBounds { line });
        }
        if !used.insert(pos) {
            return Err(ParseError::Duplicate { line });
        }

        map.set(
            pos,
            Tile {
                kind,
                start: Pos::new(coord(sx), coord(sy)),
                end: Pos::new(coord(ex), coord(ey)),
                speed: u16::try_from(speed).unwrap_or(u16::MAX),
            },
        );

        if kind == TileKind::Spawn {
            spawns.push(pos);
        }
        if kind.is_gate() {
            if map.is_border(pos) {
                return Err(ParseError::GateOnBorder { line });
            }
            has_gate = true;
        }
    }

    let spawn = match spawns.as_slice() {
        [spawn] => *spawn,
        _ => return Err(ParseError::SpawnCount { found: spawns.len() }),
    };
    if !has_gate {
        return Err(ParseError::NoGate);
    }
    if map.is_border(spawn) {
        return Err(ParseError::SpawnOnBorder);
    }

    map.border_walls();
    Ok(map)
}

fn split_fields(line: &str) -> Option<[u32; FIELDS]> {
    let mut values = [0; FIELDS];
    let mut parts = line.split(';');
    for slot in &mut values {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    match parts.next() {
        Some(_) => None,
        None => Some(values),
    }
}

fn coord(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
