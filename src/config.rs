use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_TICK_MS: u64 = 33;
pub const DEFAULT_RENDER_FPS: u64 = 60;
pub const DEFAULT_SCORES_PATH: &str = "scores.csv";
pub const DEFAULT_BONUS_PATH: &str = "bonus.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tick_ms: u64,
    pub render_fps: u64,
    pub debug: bool,
    /// Master seed; `None` draws a fresh one per game.
    pub seed: Option<u64>,
    pub scores_path: PathBuf,
    pub bonus_path: PathBuf,
    pub log_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            render_fps: DEFAULT_RENDER_FPS,
            debug: false,
            seed: None,
            scores_path: PathBuf::from(DEFAULT_SCORES_PATH),
            bonus_path: PathBuf::from(DEFAULT_BONUS_PATH),
            log_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            tick_ms: read_positive(&lookup, "BOMBER_TICK_MS").unwrap_or(defaults.tick_ms),
            render_fps: read_positive(&lookup, "BOMBER_FPS").unwrap_or(defaults.render_fps),
            debug: lookup("BOMBER_DEBUG").is_some_and(|v| is_truthy(&v)),
            seed: read(&lookup, "BOMBER_SEED"),
            scores_path: lookup("BOMBER_SCORES")
                .map(PathBuf::from)
                .unwrap_or(defaults.scores_path),
            bonus_path: lookup("BOMBER_BONUS")
                .map(PathBuf::from)
                .unwrap_or(defaults.bonus_path),
            log_path: lookup("BOMBER_LOG")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

fn read<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse::<T>().ok())
}

fn read_positive(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    read::<u64>(lookup, key).filter(|v| *v > 0)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(settings(&[]), Settings::default());
    }

    #[test]
    fn reads_every_variable() {
        let s = settings(&[
            ("BOMBER_TICK_MS", "20"),
            ("BOMBER_FPS", "30"),
            ("BOMBER_DEBUG", "yes"),
            ("BOMBER_SEED", " 42 "),
            ("BOMBER_SCORES", "/tmp/s.csv"),
            ("BOMBER_BONUS", "levels/b.csv"),
            ("BOMBER_LOG", "bomber.log"),
        ]);
        assert_eq!(s.tick_ms, 20);
        assert_eq!(s.render_fps, 30);
        assert!(s.debug);
        assert_eq!(s.seed, Some(42));
        assert_eq!(s.scores_path, PathBuf::from("/tmp/s.csv"));
        assert_eq!(s.bonus_path, PathBuf::from("levels/b.csv"));
        assert_eq!(s.log_path, Some(PathBuf::from("bomber.log")));
    }

    #[test]
    fn bad_values_fall_back() {
        let s = settings(&[
            ("BOMBER_TICK_MS", "0"),
            ("BOMBER_FPS", "fast"),
            ("BOMBER_DEBUG", "0"),
            ("BOMBER_SEED", "-1"),
            ("BOMBER_LOG", ""),
        ]);
        assert_eq!(s.tick_ms, DEFAULT_TICK_MS);
        assert_eq!(s.render_fps, DEFAULT_RENDER_FPS);
        assert!(!s.debug);
        assert_eq!(s.seed, None);
        assert_eq!(s.log_path, None);
    }
}
