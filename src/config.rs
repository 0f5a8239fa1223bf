/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Milliseconds between simulation ticks.
    pub tick_ms: u64,
    pub lives: u32,
    /// Seconds per level; 0 turns the countdown off.
    pub time_limit_s: u64,
    pub start_muted: bool,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub mute: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_ms")]
    tick_ms: u64,
    #[serde(default = "default_lives")]
    lives: u32,
    #[serde(default = "default_time_limit")]
    time_limit_s: u64,
    #[serde(default)]
    mute: bool,
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_mute")]
    mute: Vec<String>,
}

// ── Defaults ──

fn default_tick_ms() -> u64 { 16 }
fn default_lives() -> u32 { 3 }
fn default_time_limit() -> u64 { 100 }

fn default_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_mute() -> Vec<String> { vec!["Y".into()] }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            tick_ms: default_tick_ms(),
            lives: default_lives(),
            time_limit_s: default_time_limit(),
            mute: false,
            levels_dir: default_levels_dir(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            confirm: default_confirm(),
            cancel: default_cancel(),
            mute: default_mute(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();

        // Find config.toml
        let toml_cfg = load_toml(&search_dirs);

        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            // Search candidate dirs for the levels folder
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| {
                    // Default: relative to CWD
                    PathBuf::from(levels_dir_str)
                })
        };

        GameConfig {
            tick_ms: toml_cfg.general.tick_ms,
            lives: toml_cfg.general.lives,
            time_limit_s: toml_cfg.general.time_limit_s,
            start_muted: toml_cfg.general.mute,
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                mute: toml_cfg.gamepad.mute,
            },
            levels_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so /usr/bin/blockhop → /usr/games/blockhop
        // still finds data relative to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/blockhop)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/blockhop");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/blockhop)
    let sys = PathBuf::from("/usr/share/blockhop");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.general.tick_ms, 16);
        assert_eq!(cfg.general.lives, 3);
        assert_eq!(cfg.general.time_limit_s, 100);
        assert!(!cfg.general.mute);
        assert_eq!(cfg.general.levels_dir, "levels");
        assert_eq!(cfg.gamepad.jump, vec!["A", "B"]);
    }

    #[test]
    fn mute_flag_parses() {
        let cfg: TomlConfig = toml::from_str("[general]\nmute = true\n").unwrap();
        assert!(cfg.general.mute);
        // Untouched keys keep their defaults
        assert_eq!(cfg.general.tick_ms, 16);
    }

    #[test]
    fn partial_general_section() {
        let cfg: TomlConfig =
            toml::from_str("[general]\nlives = 5\ntime_limit_s = 0\n").unwrap();
        assert_eq!(cfg.general.lives, 5);
        assert_eq!(cfg.general.time_limit_s, 0); // 0 = countdown off
        assert_eq!(cfg.general.tick_ms, 16);
        assert!(!cfg.general.mute);
    }

    #[test]
    fn gamepad_bindings_override() {
        let cfg: TomlConfig =
            toml::from_str("[gamepad]\njump = [\"X\"]\nmute = [\"LB\", \"RB\"]\n").unwrap();
        assert_eq!(cfg.gamepad.jump, vec!["X"]);
        assert_eq!(cfg.gamepad.mute, vec!["LB", "RB"]);
        // Sections are independent: confirm stays default
        assert_eq!(cfg.gamepad.confirm, vec!["Start", "A"]);
    }
}
