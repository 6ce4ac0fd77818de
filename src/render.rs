use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::board::CellType;
use crate::components::Pos;
use crate::enemy::EnemyKind;
use crate::game::Game;
use crate::leaderboard::Leaderboard;
use crate::powerup::PowerUpKind;

pub const CELL_W: usize = 2;
pub const LEADERBOARD_PAGE: usize = 10;

// Blink half-period in ticks: slow when a shield is fresh, fast near its end.
const BLINK_SLOWEST: u16 = 12;
const BLINK_FASTEST: u16 = 5;
const BLINK_FALLBACK: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Player,
    Enemy(EnemyKind),
    Bomb,
    Explosion,
    PowerUp(PowerUpKind),
    WallSolid,
    WallDestructible,
    GateNext,
    GatePrev,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Color,
}

impl Cell {
    const fn new(glyph: Glyph, color: Color) -> Self {
        Self { glyph, color }
    }
}

pub struct Renderer {
    width: usize,
    height: usize,
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: vec![Cell::new(Glyph::Empty, Color::Reset); width * height],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn render<W: Write>(&mut self, out: &mut W, game: &Game) -> io::Result<()> {
        let board = game.level().board();
        let (width, height) = (board.width() as usize, board.height() as usize);
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
        let needed_h = (height + 2) as u16;
        let needed_w = (width * CELL_W) as u16;

        out.queue(MoveTo(0, 0))?;
        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {needed_w}x{needed_h} (cols x rows). Current: {term_w}x{term_h}."
            );
            out.queue(Print(msg))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
        }

        let hud = hud_line(game);
        if self.needs_full || hud != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(&hud))?;
            out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        for y in 0..height {
            for x in 0..width {
                let cell = cell_for(game, Pos::new(x as i32, y as i32));
                let idx = y * width + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(out, x, y, cell)?;
                }
            }
        }

        let help = if game.is_debug() {
            "arrows move  space bomb  q quit  |  k kill  d walls  i immortal  u speed  s hurt  l lose"
        } else {
            "arrows move  space bomb  q quit"
        };
        if self.needs_full {
            out.queue(MoveTo(self.origin_x, self.origin_y + height as u16))?;
            out.queue(SetForegroundColor(Color::DarkGrey))?;
            out.queue(Print(help))?;
            out.queue(ResetColor)?;
        }
        self.needs_full = false;

        out.flush()
    }

    fn draw_cell<W: Write>(&self, out: &mut W, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = glyph_text(cell.glyph);
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        out.queue(MoveTo(x_pos, y_pos))?;
        out.queue(SetForegroundColor(cell.color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..CELL_W {
            out.queue(Print(' '))?;
        }
        out.queue(ResetColor)?;
        Ok(())
    }
}

fn glyph_text(glyph: Glyph) -> &'static str {
    match glyph {
        Glyph::Player => "\u{1F603}",
        Glyph::Enemy(EnemyKind::Walker) => "\u{1F47E}",
        Glyph::Enemy(EnemyKind::Patroller) => "\u{1F916}",
        Glyph::Enemy(EnemyKind::Chaser) => "\u{1F479}",
        Glyph::Bomb => "\u{1F4A3}",
        Glyph::Explosion => "\u{1F4A5}",
        Glyph::PowerUp(PowerUpKind::Star) => "\u{2B50}",
        Glyph::PowerUp(PowerUpKind::Gunpowder) => "\u{1F9E8}",
        Glyph::PowerUp(PowerUpKind::SpeedUp) => "\u{1F45F}",
        Glyph::PowerUp(PowerUpKind::ScoreUp) => "\u{1F4B0}",
        Glyph::WallSolid => "\u{2588}\u{2588}",
        Glyph::WallDestructible => "\u{2592}\u{2592}",
        Glyph::GateNext => ">>",
        Glyph::GatePrev => "<<",
        Glyph::Empty => "  ",
    }
}

pub fn hud_line(game: &Game) -> String {
    let player = game.player();
    let mut hud = format!(
        "Time: {}  Score: {}  Lives: {}  Level: {}/{}  Bombs: {}/{}  Range: {}",
        game.time_left_secs(),
        player.score(),
        player.lives(),
        game.current_level() + 1,
        game.level_count(),
        player.max_bombs() - player.bombs_placed().min(player.max_bombs()),
        player.max_bombs(),
        player.bomb_range(),
    );
    if player.speed_buff_left() > 0 {
        hud.push_str("  SPEED");
    }
    if player.bomb_buff_left() > 0 {
        hud.push_str("  POWDER");
    }
    if player.is_invulnerable() {
        hud.push_str("  SHIELD");
    }
    if game.is_bonus() {
        hud.push_str("  [BONUS]");
    }
    hud
}

fn blink_period(left: u16, total: u16) -> u16 {
    if total == 0 {
        return BLINK_FALLBACK;
    }
    let progress = u32::from(total.saturating_sub(left));
    let speedup = (progress * u32::from(BLINK_SLOWEST - BLINK_FASTEST) / u32::from(total)) as u16;
    BLINK_SLOWEST.saturating_sub(speedup).max(BLINK_FASTEST)
}

// Player on top, then enemies, bombs and power-ups, then the grid.
pub fn cell_for(game: &Game, pos: Pos) -> Cell {
    let level = game.level();
    let player = game.player();
    if player.pos() == pos {
        let period = blink_period(player.invuln_ticks(), player.invuln_total());
        let blink = player.is_invulnerable() && (player.invuln_ticks() / period) % 2 == 0;
        let color = if blink { Color::DarkGrey } else { Color::Yellow };
        return Cell::new(Glyph::Player, color);
    }
    if let Some(enemy) = level.enemies().iter().find(|e| e.pos() == pos) {
        let color = match enemy.kind() {
            EnemyKind::Walker => Color::Green,
            EnemyKind::Patroller => Color::Cyan,
            EnemyKind::Chaser if enemy.is_chasing() => Color::Red,
            EnemyKind::Chaser => Color::Magenta,
        };
        return Cell::new(Glyph::Enemy(enemy.kind()), color);
    }
    if level.is_bomb_at(pos) {
        return Cell::new(Glyph::Bomb, Color::White);
    }
    if let Some(pu) = level.powerups().iter().find(|p| p.pos() == pos) {
        return Cell::new(Glyph::PowerUp(pu.kind()), Color::Yellow);
    }
    match level.board().cell(pos) {
        Ok(CellType::WallSolid) => Cell::new(Glyph::WallSolid, Color::Blue),
        Ok(CellType::WallDestructible) => Cell::new(Glyph::WallDestructible, Color::DarkYellow),
        Ok(CellType::Explosion) => Cell::new(Glyph::Explosion, Color::Red),
        Ok(CellType::GateNext) => Cell::new(Glyph::GateNext, Color::Green),
        Ok(CellType::GatePrev) => Cell::new(Glyph::GatePrev, Color::Cyan),
        Ok(CellType::Bomb) => Cell::new(Glyph::Bomb, Color::White),
        Ok(CellType::Empty) | Err(_) => Cell::new(Glyph::Empty, Color::Reset),
    }
}

fn centered<W: Write>(out: &mut W, row: u16, text: &str, color: Color) -> io::Result<()> {
    let (term_w, _) = terminal::size()?;
    let w = UnicodeWidthStr::width(text) as u16;
    out.queue(MoveTo(term_w.saturating_sub(w) / 2, row))?;
    out.queue(SetForegroundColor(color))?;
    out.queue(Print(text))?;
    out.queue(ResetColor)?;
    Ok(())
}

fn top_row(lines: usize) -> io::Result<u16> {
    let (_, term_h) = terminal::size()?;
    Ok(term_h.saturating_sub(lines as u16) / 2)
}

pub fn draw_menu<W: Write>(out: &mut W, items: &[&str], selected: usize) -> io::Result<()> {
    out.queue(Clear(ClearType::All))?;
    let top = top_row(items.len() + 3)?;
    centered(out, top, "B O M B E R", Color::Yellow)?;
    for (i, item) in items.iter().enumerate() {
        let row = top + 2 + i as u16;
        if i == selected {
            centered(out, row, &format!("> {item} <"), Color::White)?;
        } else {
            centered(out, row, item, Color::DarkGrey)?;
        }
    }
    out.flush()
}

pub fn draw_name_entry<W: Write>(
    out: &mut W,
    letters: &[char],
    cursor: usize,
    score: u32,
    victory: bool,
) -> io::Result<()> {
    out.queue(Clear(ClearType::All))?;
    let top = top_row(7)?;
    let title = if victory { "YOU WIN!" } else { "GAME OVER" };
    centered(out, top, title, Color::Yellow)?;
    centered(out, top + 2, &format!("Score: {score}"), Color::White)?;
    centered(out, top + 3, "Enter your name", Color::White)?;

    let name: String = letters.iter().flat_map(|c| [*c, ' ']).collect();
    centered(out, top + 5, name.trim_end(), Color::Cyan)?;
    let marker: String = (0..letters.len())
        .map(|i| if i == cursor { "^ " } else { "  " })
        .collect();
    centered(out, top + 6, marker.trim_end(), Color::Cyan)?;
    centered(
        out,
        top + 8,
        "up/down letter  left/right move  enter save  esc skip",
        Color::DarkGrey,
    )?;
    out.flush()
}

pub fn draw_leaderboard<W: Write>(out: &mut W, board: &Leaderboard, page: usize) -> io::Result<()> {
    out.queue(Clear(ClearType::All))?;
    let top = top_row(LEADERBOARD_PAGE + 4)?;
    centered(out, top, "LEADERBOARD", Color::Yellow)?;
    if board.is_empty() {
        centered(out, top + 2, "No scores yet", Color::White)?;
    } else {
        let start = page * LEADERBOARD_PAGE;
        for (i, entry) in board
            .entries()
            .iter()
            .enumerate()
            .skip(start)
            .take(LEADERBOARD_PAGE)
        {
            let line = format!("{:>2}. {}  {:>8}", i + 1, entry.name, entry.score);
            centered(out, top + 2 + (i - start) as u16, &line, Color::White)?;
        }
        let pages = board.len().div_ceil(LEADERBOARD_PAGE);
        centered(
            out,
            top + 3 + LEADERBOARD_PAGE as u16,
            &format!("page {}/{}  left/right to browse", page + 1, pages),
            Color::DarkGrey,
        )?;
    }
    centered(
        out,
        top + 4 + LEADERBOARD_PAGE as u16,
        "enter or q to go back",
        Color::DarkGrey,
    )?;
    out.flush()
}

pub fn draw_message<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    out.queue(Clear(ClearType::All))?;
    let top = top_row(lines.len())?;
    for (i, line) in lines.iter().enumerate() {
        let color = if i == 0 { Color::Yellow } else { Color::White };
        centered(out, top + i as u16, line, color)?;
    }
    out.flush()
}
