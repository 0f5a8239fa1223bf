/// Level loading.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files, lexicographic)
///   2. Built-in embedded levels
///
/// ## Grid format (`.txt`):
///   One character per tile, up to 20 columns x 15 rows, row 0 at the
///   top. A `#` starts a comment running to the end of the line; a
///   whole-line comment still counts as a (blank) row. Cells past the
///   playfield bounds are ignored.
///
/// ## Tile legend:
///   '1' = platform               '/' = vine
///   '+' = coin                   '^' = extra life
///   '@' = player spawn (exactly one per level)
///   'D' = door (at most one; the marker tile is the door's base)
///   '$' = enemy patrol marker (paired left-to-right within a row)
///   anything else = empty

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::GameConfig;
use crate::domain::entity::{Enemy, Entity, EntityKind, Player};
use crate::domain::geom::Rect;
use crate::domain::rules;
use crate::sim::world::{Phase, WorldState};
use crate::sim::{ENEMY_SIZE, GRID_H, GRID_W, TILE};

/// Fatal problems in level data. None of these are recoverable: the
/// session must not enter play with a half-built level.
#[derive(Debug, Error)]
pub enum LevelFormatError {
    #[error("level '{name}': second player spawn at row {row}, column {col}")]
    DuplicateSpawn { name: String, row: usize, col: usize },
    #[error("level '{name}': second door at row {row}, column {col}")]
    DuplicateDoor { name: String, row: usize, col: usize },
    #[error("level '{name}': no player spawn")]
    NoSpawn { name: String },
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One parsed level, ready to be instantiated into the world any
/// number of times.
#[derive(Clone, PartialEq, Debug)]
pub struct LevelDef {
    pub name: String,
    pub entities: Vec<Entity>,
    pub enemies: Vec<Enemy>,
    pub spawn: Rect,
    pub door: Option<Rect>,
}

impl LevelDef {
    pub fn coin_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.kind == EntityKind::Coin)
            .count()
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Parse one grid. Pure: the same text always yields the same level.
pub fn parse_level(name: &str, text: &str) -> Result<LevelDef, LevelFormatError> {
    let mut entities = vec![];
    let mut enemies = vec![];
    let mut spawn: Option<Rect> = None;
    let mut door: Option<Rect> = None;

    for (row, raw) in text.lines().enumerate() {
        if row >= GRID_H {
            break;
        }
        let line = raw.split('#').next().unwrap_or("");
        let mut markers: Vec<usize> = vec![];

        for (col, code) in line.chars().enumerate() {
            if col >= GRID_W {
                break;
            }
            let tile = Rect::new(col as f32 * TILE, row as f32 * TILE, TILE, TILE);
            match code {
                '1' => entities.push(Entity::new(EntityKind::Platform, tile)),
                '/' => entities.push(Entity::new(EntityKind::Vine, tile)),
                '+' => entities.push(Entity::new(EntityKind::Coin, tile)),
                '^' => entities.push(Entity::new(EntityKind::Life, tile)),
                '@' => {
                    if spawn.is_some() {
                        return Err(LevelFormatError::DuplicateSpawn {
                            name: name.to_string(),
                            row,
                            col,
                        });
                    }
                    spawn = Some(tile);
                }
                'D' => {
                    if door.is_some() {
                        return Err(LevelFormatError::DuplicateDoor {
                            name: name.to_string(),
                            row,
                            col,
                        });
                    }
                    // two tiles tall, the marker tile is the base
                    door = Some(Rect::new(tile.x, tile.y - TILE, TILE, TILE * 2.0));
                }
                '$' => markers.push(col),
                _ => {}
            }
        }

        // Markers pair up left to right within their own row; a
        // trailing odd marker spawns nothing.
        for pair in markers.chunks_exact(2) {
            let y = row as f32 * TILE + (TILE - ENEMY_SIZE);
            let body = Rect::new(pair[0] as f32 * TILE, y, ENEMY_SIZE, ENEMY_SIZE);
            let path = Rect::new(
                pair[0] as f32 * TILE,
                y,
                (pair[1] - pair[0]) as f32 * TILE,
                ENEMY_SIZE,
            );
            enemies.push(Enemy::new(body, path));
        }
    }

    let spawn = spawn.ok_or_else(|| LevelFormatError::NoSpawn {
        name: name.to_string(),
    })?;

    Ok(LevelDef {
        name: name.to_string(),
        entities,
        enemies,
        spawn,
        door,
    })
}

/// Everything the session can play: the configured directory when it
/// has levels, the built-in set otherwise. Any malformed file aborts
/// the whole load.
pub fn load_levels(config: &GameConfig) -> Result<Vec<LevelDef>, LevelFormatError> {
    let dir = &config.levels_dir;
    if dir.is_dir() {
        let levels = load_from_directory(dir)?;
        if !levels.is_empty() {
            return Ok(levels);
        }
    }
    embedded_levels()
}

/// Instantiate a level into the world. Lives and the level list are
/// preserved; everything per-level is rebuilt from the stored def.
pub fn enter_level(world: &mut WorldState, level_idx: usize, now_ms: u64) {
    let def = match world.levels.get(level_idx) {
        Some(d) => d.clone(),
        None => return,
    };

    world.current_level = level_idx;
    world.level_name = def.name.clone();
    world.entities = def.entities;
    world.enemies = def.enemies;
    world.spawn = def.spawn;
    world.door = def.door;
    world.door_open = false;
    world.coins_total = world
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Coin)
        .count();
    world.coins_collected = 0;
    world.player = Player::new(def.spawn);
    // A spawn sitting on a platform can jump on the very first tick.
    world.player.on_ground = rules::standing_on_platform(&world.player.rect, &world.entities);
    world.tick = 0;

    world.phase = Phase::Playing;
    world.phase_started_ms = now_ms;
    world.level_started_ms = now_ms;
    world.set_message(&def.name, 150);
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Result<Vec<LevelDef>, LevelFormatError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Ok(vec![]),
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |e| e == "txt"))
        .collect();
    // filename order is level order
    files.sort();

    let mut levels = vec![];
    for path in files {
        let text = std::fs::read_to_string(&path).map_err(|source| LevelFormatError::Io {
            path: path.clone(),
            source,
        })?;
        levels.push(parse_level(&title_of(&path, &text), &text)?);
    }
    Ok(levels)
}

/// A whole-line comment on the first line names the level; the file
/// stem otherwise.
fn title_of(path: &Path, text: &str) -> String {
    if let Some(first) = text.lines().next() {
        let trimmed = first.trim();
        if let Some(title) = trimmed.strip_prefix('#') {
            let title = title.trim();
            if !title.is_empty() {
                return title.to_string();
            }
        }
    }
    path.file_stem().unwrap_or_default().to_string_lossy().to_string()
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels() -> Result<Vec<LevelDef>, LevelFormatError> {
    Ok(vec![
        make_embedded("Hop 1 - Coin Run", &[
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "............+.+.+...",
            "",
            ".@.$.+...$.^.111111.",
            "11111111111111111111",
        ])?,
        make_embedded("Hop 2 - Vine Line", &[
            "",
            "",
            "",
            "",
            "",
            "....+...+....+......",
            "..$....$......D.....",
            ".11111111.111111111.",
            "........./..........",
            "........./+.........",
            "........./..........",
            "........./..........",
            ".@.+...../.$...$+...",
            "11111111111111111111",
        ])?,
        make_embedded("Hop 3 - Stair Gauntlet", &[
            "",
            "",
            "",
            "",
            "",
            "",
            ".^$+$+..............",
            ".11111............D+",
            "/................111",
            "/..............+1...",
            "/........+.....1....",
            "/............+1.....",
            "/.$..$.@.....1...+..",
            "11111111...111111111",
        ])?,
    ])
}

fn make_embedded(name: &str, rows: &[&str]) -> Result<LevelDef, LevelFormatError> {
    parse_level(name, &rows.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_grid_parses() {
        let def = parse_level("box", "1111\n1@+1\n1111").unwrap();
        assert_eq!(def.coin_count(), 1);
        assert_eq!(def.spawn, Rect::new(40.0, 40.0, 40.0, 40.0));
        assert_eq!(def.entities.len(), 9); // 8 platforms + 1 coin
        assert!(def.door.is_none());
        assert!(def.enemies.is_empty());
    }

    #[test]
    fn parsing_is_repeatable() {
        let text = "1111\n1@+1\n1..1\n1111";
        let a = parse_level("twice", text).unwrap();
        let b = parse_level("twice", text).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn trailing_comments_are_stripped() {
        let with = parse_level("c", "111   # the roof\n1@+1\n1111").unwrap();
        let without = parse_level("c", "111\n1@+1\n1111").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn whole_line_comment_is_a_blank_row() {
        // the comment line shifts the grid down by one row
        let def = parse_level("c", "# header\n@").unwrap();
        assert_eq!(def.spawn, Rect::new(0.0, 40.0, 40.0, 40.0));
        // a '#' inside the comment introduces nothing
        assert!(def.entities.is_empty());
    }

    #[test]
    fn duplicate_spawn_is_fatal() {
        let err = parse_level("dup", "1111\n1@@1\n1111").unwrap_err();
        match err {
            LevelFormatError::DuplicateSpawn { row, col, .. } => {
                assert_eq!((row, col), (1, 2));
            }
            other => panic!("wrong error: {other}"),
        }
    }

    #[test]
    fn duplicate_door_is_fatal() {
        let err = parse_level("dup", "@.D.D").unwrap_err();
        assert!(matches!(err, LevelFormatError::DuplicateDoor { row: 0, col: 4, .. }));
    }

    #[test]
    fn missing_spawn_is_fatal() {
        let err = parse_level("empty", "1111\n1..1\n1111").unwrap_err();
        assert!(matches!(err, LevelFormatError::NoSpawn { .. }));
    }

    #[test]
    fn door_spans_two_tiles_above_its_base() {
        let def = parse_level("door", "@....\n...D.").unwrap();
        assert_eq!(def.door, Some(Rect::new(120.0, 0.0, 40.0, 80.0)));
    }

    #[test]
    fn enemy_markers_pair_within_a_row() {
        // markers at columns 2, 5, 9: one enemy from 2 to 5, the 9 is dropped
        let def = parse_level("pairs", "@\n..$..$...$").unwrap();
        assert_eq!(def.enemies.len(), 1);
        let e = &def.enemies[0];
        assert_eq!(e.rect, Rect::new(80.0, 50.0, 30.0, 30.0));
        assert_eq!(e.path, Rect::new(80.0, 50.0, 120.0, 30.0));
    }

    #[test]
    fn enemy_markers_do_not_pair_across_rows() {
        let def = parse_level("rows", "@..$\n...$").unwrap();
        assert!(def.enemies.is_empty());
    }

    #[test]
    fn lone_marker_spawns_nothing() {
        let def = parse_level("lone", "@.$").unwrap();
        assert!(def.enemies.is_empty());
    }

    #[test]
    fn enemy_body_sits_on_the_tile_floor() {
        let def = parse_level("floor", "@\n$.$").unwrap();
        let e = &def.enemies[0];
        // 30 px body bottom-aligned inside the 40 px tile row
        assert_eq!(e.rect.bottom(), 80.0);
        assert_eq!(e.rect.h, ENEMY_SIZE);
    }

    #[test]
    fn cells_outside_the_playfield_are_ignored() {
        let wide = "1".repeat(30);
        let mut rows: Vec<String> = (0..20).map(|_| wide.clone()).collect();
        rows[1] = "1@".into();
        let def = parse_level("big", &rows.join("\n")).unwrap();
        let platforms = def
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::Platform)
            .count();
        // 15 usable rows, 20 usable columns, minus the spawn cell
        assert_eq!(platforms, 14 * GRID_W + 1);
    }

    #[test]
    fn vine_and_life_codes_parse() {
        let def = parse_level("kinds", "@/^").unwrap();
        let kinds: Vec<EntityKind> = def.entities.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Vine, EntityKind::Life]);
    }

    #[test]
    fn embedded_set_is_well_formed() {
        let levels = embedded_levels().unwrap();
        assert_eq!(levels.len(), 3);
        for def in &levels {
            assert!(def.coin_count() > 0, "{} has no coins", def.name);
        }
        assert!(levels[0].door.is_none());
        assert!(levels[1].door.is_some());
        assert!(levels[2].door.is_some());
        assert!(!levels[2].enemies.is_empty());
    }
}
