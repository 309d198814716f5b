use crate::playback::RepeatMode;
use directories::UserDirs;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_EXTENSIONS: [&str; 7] = ["mp3", "flac", "ogg", "wav", "m4a", "aac", "opus"];

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub library_root: PathBuf,
    pub extensions: Vec<String>,
    pub repeat_mode: RepeatMode,
    pub shuffle_on_load: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_root: default_library_root(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            repeat_mode: RepeatMode::Off,
            shuffle_on_load: false,
        }
    }
}

fn default_library_root() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.audio_dir().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Reads `SATUNES_*` variables, including those loaded from a `.env` file.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`. Invalid values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup("SATUNES_LIBRARY").filter(|v| !v.trim().is_empty()) {
            config.library_root = PathBuf::from(root.trim());
        }

        if let Some(raw) = lookup("SATUNES_EXTENSIONS") {
            let extensions: Vec<String> = raw
                .split(',')
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect();
            if extensions.is_empty() {
                warn!("SATUNES_EXTENSIONS is empty, using defaults");
            } else {
                config.extensions = extensions;
            }
        }

        if let Some(raw) = lookup("SATUNES_REPEAT") {
            match raw.parse() {
                Ok(mode) => config.repeat_mode = mode,
                Err(e) => warn!("Ignoring SATUNES_REPEAT: {e}"),
            }
        }

        if let Some(raw) = lookup("SATUNES_SHUFFLE_ON_LOAD") {
            match parse_bool(&raw) {
                Some(shuffle) => config.shuffle_on_load = shuffle,
                None => warn!("Ignoring SATUNES_SHUFFLE_ON_LOAD: not a boolean: {raw}"),
            }
        }

        config
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
