use std::fs::File;
use std::io::{self, Stdout};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use tracing::{error, info, warn};

use bomber_game::config::Settings;
use bomber_game::game::{Command, Game, Status};
use bomber_game::leaderboard::{Leaderboard, NAME_LEN};
use bomber_game::parser;
use bomber_game::random::Random;
use bomber_game::render::{self, Renderer, LEADERBOARD_PAGE};
use bomber_game::Direction;

const MENU_ITEMS: [&str; 4] = ["Start", "Bonus level", "Leaderboard", "Quit"];
const INPUT_HOLD_MS: u64 = 160;

enum Screen {
    Menu { selected: usize },
    Playing(Box<Game>),
    NameEntry {
        letters: [char; NAME_LEN],
        cursor: usize,
        score: u32,
        victory: bool,
    },
    Outcome { victory: bool, score: u32 },
    Leaderboard { page: usize },
    Message(Vec<String>),
    Exit,
}

fn main() -> Result<()> {
    let settings = Settings::from_env();
    init_logging(&settings)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &settings);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    if let Err(err) = &result {
        error!(error = %err, "bomber exited with an error");
    }
    result
}

// The terminal belongs to the game, so logs only go to a file and only
// when `BOMBER_LOG` asks for one.
fn init_logging(settings: &Settings) -> Result<()> {
    let Some(path) = &settings.log_path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    info!(?settings, "logging started");
    Ok(())
}

fn run(stdout: &mut Stdout, settings: &Settings) -> Result<()> {
    let mut screen = Screen::Menu { selected: 0 };
    loop {
        screen = match screen {
            Screen::Exit => return Ok(()),
            Screen::Menu { selected } => menu(stdout, selected, settings)?,
            Screen::Playing(game) => play(stdout, *game, settings)?,
            Screen::NameEntry {
                letters,
                cursor,
                score,
                victory,
            } => name_entry(stdout, letters, cursor, score, victory, settings)?,
            Screen::Outcome { victory, score } => outcome(stdout, victory, score)?,
            Screen::Leaderboard { page } => leaderboard(stdout, page, settings)?,
            Screen::Message(lines) => message(stdout, &lines)?,
        };
    }
}

fn read_key() -> io::Result<KeyEvent> {
    loop {
        if let Event::Key(key) = event::read()? {
            if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                return Ok(key);
            }
        }
    }
}

fn is_confirm(code: KeyCode) -> bool {
    matches!(code, KeyCode::Enter | KeyCode::Char(' '))
}

fn is_back(code: KeyCode) -> bool {
    matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
}

fn menu(stdout: &mut Stdout, selected: usize, settings: &Settings) -> Result<Screen> {
    render::draw_menu(stdout, &MENU_ITEMS, selected)?;
    let key = read_key()?;
    let next = match key.code {
        KeyCode::Up => Screen::Menu {
            selected: (selected + MENU_ITEMS.len() - 1) % MENU_ITEMS.len(),
        },
        KeyCode::Down => Screen::Menu {
            selected: (selected + 1) % MENU_ITEMS.len(),
        },
        KeyCode::Char('q') | KeyCode::Char('Q') => Screen::Exit,
        code if is_confirm(code) => match selected {
            0 => start_campaign(settings),
            1 => start_bonus(settings),
            2 => Screen::Leaderboard { page: 0 },
            _ => Screen::Exit,
        },
        _ => Screen::Menu { selected },
    };
    Ok(next)
}

fn game_seed(settings: &Settings) -> u64 {
    settings.seed.unwrap_or_else(Random::new_seed)
}

fn start_campaign(settings: &Settings) -> Screen {
    match Game::campaign(game_seed(settings), settings.debug) {
        Ok(game) => Screen::Playing(Box::new(game)),
        Err(err) => {
            error!(error = %err, "cannot build campaign");
            Screen::Message(vec!["CANNOT START GAME".into(), err.to_string()])
        }
    }
}

fn start_bonus(settings: &Settings) -> Screen {
    let map = match parser::load_bonus_file(&settings.bonus_path) {
        Ok(map) => map,
        Err(err) => {
            warn!(error = %err, path = %settings.bonus_path.display(), "bonus level rejected");
            return Screen::Message(vec!["BONUS ERROR".into(), err.to_string()]);
        }
    };
    match Game::bonus(&map, game_seed(settings), settings.debug) {
        Ok(game) => Screen::Playing(Box::new(game)),
        Err(err) => {
            warn!(error = %err, "cannot create bonus level");
            Screen::Message(vec![
                "BONUS ERROR".into(),
                "Cannot create bonus level.".into(),
                err.to_string(),
            ])
        }
    }
}

fn key_command(code: KeyCode, debug: bool) -> Option<Command> {
    let command = match code {
        KeyCode::Char(' ') => Command::PlaceBomb,
        KeyCode::Char('k') | KeyCode::Char('K') if debug => Command::KillAll,
        KeyCode::Char('d') | KeyCode::Char('D') if debug => Command::DestroyWalls,
        KeyCode::Char('i') | KeyCode::Char('I') if debug => Command::ToggleImmortality,
        KeyCode::Char('u') | KeyCode::Char('U') if debug => Command::ToggleUltraspeed,
        KeyCode::Char('s') | KeyCode::Char('S') if debug => Command::Suicide,
        KeyCode::Char('l') | KeyCode::Char('L') if debug => Command::Forfeit,
        _ => return None,
    };
    Some(command)
}

fn key_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

fn play(stdout: &mut Stdout, mut game: Game, settings: &Settings) -> Result<Screen> {
    let board = game.level().board();
    let mut renderer = Renderer::new(board.width() as usize, board.height() as usize);
    let mut last_tick = Instant::now();
    let mut last_seen: [Option<Instant>; 4] = [None; 4];
    let mut last_pressed: Option<Direction> = None;
    let tick_time = Duration::from_millis(settings.tick_ms);
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
                info!(score = game.score(), "player quit");
                return Ok(Screen::Exit);
            }
            if let Some(dir) = key_direction(key.code) {
                last_seen[dir_index(dir)] = Some(Instant::now());
                last_pressed = Some(dir);
            } else if let Some(command) = key_command(key.code, game.is_debug()) {
                game.handle_input(command)?;
            }
        }

        if last_tick.elapsed() >= tick_time {
            last_tick = Instant::now();
            if let Some(dir) = active_dir_recent(&last_seen, last_pressed) {
                game.handle_input(Command::Move(dir))?;
            }
            game.update().context("simulation step failed")?;
            renderer.render(stdout, &game)?;
            if game.is_over() {
                return Ok(finished(&game));
            }
        } else {
            renderer.render(stdout, &game)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn finished(game: &Game) -> Screen {
    let victory = game.status() == Status::Victory;
    let score = game.score();
    match game.status() {
        Status::BonusExit => Screen::Menu { selected: 0 },
        _ if game.is_ranked() => Screen::NameEntry {
            letters: ['A'; NAME_LEN],
            cursor: 0,
            score,
            victory,
        },
        _ => Screen::Outcome { victory, score },
    }
}

// Direction of the key held most recently. Terminals only send repeats,
// so a key counts as held for a short while after its last event.
fn active_dir_recent(
    last_seen: &[Option<Instant>; 4],
    last_pressed: Option<Direction>,
) -> Option<Direction> {
    let now = Instant::now();
    let hold = Duration::from_millis(INPUT_HOLD_MS);
    let fresh = |t: Instant| now.duration_since(t) <= hold;
    if let Some(dir) = last_pressed {
        if last_seen[dir_index(dir)].is_some_and(fresh) {
            return Some(dir);
        }
    }
    Direction::ALL
        .iter()
        .filter_map(|dir| last_seen[dir_index(*dir)].filter(|t| fresh(*t)).map(|t| (*dir, t)))
        .max_by_key(|(_, t)| *t)
        .map(|(dir, _)| dir)
}

fn dir_index(dir: Direction) -> usize {
    match dir {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

fn shift_letter(c: char, delta: i32) -> char {
    let idx = (c as i32 - 'A' as i32 + delta).rem_euclid(26);
    char::from(b'A' + idx as u8)
}

fn name_entry(
    stdout: &mut Stdout,
    mut letters: [char; NAME_LEN],
    mut cursor: usize,
    score: u32,
    victory: bool,
    settings: &Settings,
) -> Result<Screen> {
    render::draw_name_entry(stdout, &letters, cursor, score, victory)?;
    let key = read_key()?;
    match key.code {
        KeyCode::Left => cursor = (cursor + NAME_LEN - 1) % NAME_LEN,
        KeyCode::Right => cursor = (cursor + 1) % NAME_LEN,
        KeyCode::Up => letters[cursor] = shift_letter(letters[cursor], 1),
        KeyCode::Down => letters[cursor] = shift_letter(letters[cursor], -1),
        KeyCode::Enter => {
            let name: String = letters.iter().collect();
            save_score(&name, score, settings);
            return Ok(Screen::Outcome { victory, score });
        }
        code if is_back(code) => return Ok(Screen::Outcome { victory, score }),
        _ => {}
    }
    Ok(Screen::NameEntry {
        letters,
        cursor,
        score,
        victory,
    })
}

fn save_score(name: &str, score: u32, settings: &Settings) {
    let path = &settings.scores_path;
    let mut board = Leaderboard::load(path).unwrap_or_else(|err| {
        warn!(error = %err, "leaderboard unreadable, starting a new one");
        Leaderboard::new()
    });
    board.add(name, score);
    match board.save(path) {
        Ok(()) => info!(name, score, "score saved"),
        Err(err) => error!(error = %err, path = %path.display(), "cannot save leaderboard"),
    }
}

fn outcome(stdout: &mut Stdout, victory: bool, score: u32) -> Result<Screen> {
    let title = if victory { "YOU WIN!" } else { "GAME OVER" };
    let lines = [
        title.to_string(),
        String::new(),
        format!("Final score: {score}"),
        String::new(),
        "Press ENTER for menu".to_string(),
        "Press Q to quit".to_string(),
    ];
    render::draw_message(stdout, &lines)?;
    let next = match read_key()?.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Screen::Exit,
        KeyCode::Enter | KeyCode::Esc => Screen::Menu { selected: 0 },
        _ => Screen::Outcome { victory, score },
    };
    Ok(next)
}

fn leaderboard(stdout: &mut Stdout, page: usize, settings: &Settings) -> Result<Screen> {
    let board = Leaderboard::load(&settings.scores_path).unwrap_or_else(|err| {
        warn!(error = %err, "leaderboard unreadable");
        Leaderboard::new()
    });
    let pages = board.len().div_ceil(LEADERBOARD_PAGE).max(1);
    let page = page.min(pages - 1);
    render::draw_leaderboard(stdout, &board, page)?;
    let next = match read_key()?.code {
        KeyCode::Left => Screen::Leaderboard {
            page: page.saturating_sub(1),
        },
        KeyCode::Right => Screen::Leaderboard { page: page + 1 },
        code if is_back(code) || code == KeyCode::Enter => Screen::Menu { selected: 2 },
        _ => Screen::Leaderboard { page },
    };
    Ok(next)
}

fn message(stdout: &mut Stdout, lines: &[String]) -> Result<Screen> {
    let mut shown = lines.to_vec();
    shown.push(String::new());
    shown.push("Press ENTER to go back".to_string());
    render::draw_message(stdout, &shown)?;
    let code = read_key()?.code;
    if is_back(code) || code == KeyCode::Enter {
        Ok(Screen::Menu { selected: 0 })
    } else {
        Ok(Screen::Message(lines.to_vec()))
    }
}
