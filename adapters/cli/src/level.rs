use std::{fs, path::Path};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use hiding_wumpus_core::CellCoord;
use hiding_wumpus_system_simulation::Level;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SHARE_DOMAIN: &str = "wumpus";
const SHARE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const SHARE_HEADER: &str = "wumpus:v1";
/// Delimiter used to separate the prefix, grid size and payload.
const FIELD_DELIMITER: char = ':';

/// Level contents carried by a share code; the grid size travels in the header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SharePayload {
    walls: Vec<[u32; 2]>,
    npc_position: [f32; 2],
    target_position: Option<[u32; 2]>,
}

/// Errors that can occur while reading, writing or transferring levels.
#[derive(Debug, Error)]
pub(crate) enum LevelError {
    /// The level file could not be read or written.
    #[error("could not access level file: {0}")]
    Io(#[from] std::io::Error),
    /// The level JSON could not be parsed or produced.
    #[error("could not parse level JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The level declares an empty grid.
    #[error("level grid size must be at least 1")]
    EmptyGrid,
    /// A wall or target lies outside the declared grid.
    #[error("cell ({}, {}) lies outside the {size}x{size} grid", .cell.column(), .cell.row())]
    OutsideGrid {
        /// Offending cell.
        cell: CellCoord,
        /// Declared grid size.
        size: u32,
    },
    /// The share code was empty or contained only whitespace.
    #[error("share code was empty")]
    EmptyCode,
    /// A segment of the share code was missing.
    #[error("share code is missing the {0}")]
    MissingSegment(&'static str),
    /// The share code used an unexpected prefix segment.
    #[error("share code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The share code used an unsupported version identifier.
    #[error("share code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid size could not be parsed from the share code.
    #[error("could not parse grid size '{0}'")]
    InvalidSize(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode share code payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
}

/// Reads and validates a JSON level file.
pub(crate) fn read_level(path: &Path) -> Result<Level, LevelError> {
    let contents = fs::read_to_string(path)?;
    let level: Level = serde_json::from_str(&contents)?;
    validate(&level)?;
    Ok(level)
}

/// Writes a level as JSON.
pub(crate) fn write_level(path: &Path, level: &Level) -> Result<(), LevelError> {
    let json = serde_json::to_string_pretty(level)?;
    fs::write(path, json)?;
    Ok(())
}

/// Encodes the level into a single-line string suitable for clipboard transfer.
pub(crate) fn encode_share_code(level: &Level) -> Result<String, LevelError> {
    let payload = SharePayload {
        walls: level.walls.clone(),
        npc_position: level.npc_position,
        target_position: level.target_position,
    };
    let json = serde_json::to_vec(&payload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SHARE_HEADER}:{}:{encoded}", level.grid_size))
}

/// Decodes and validates a level from a share code.
pub(crate) fn decode_share_code(value: &str) -> Result<Level, LevelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LevelError::EmptyCode);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LevelError::MissingSegment("prefix"))?;
    let version = parts.next().ok_or(LevelError::MissingSegment("version"))?;
    let size = parts.next().ok_or(LevelError::MissingSegment("grid size"))?;
    let payload = parts.next().ok_or(LevelError::MissingSegment("payload"))?;

    if domain != SHARE_DOMAIN {
        return Err(LevelError::InvalidPrefix(domain.to_owned()));
    }
    if version != SHARE_VERSION {
        return Err(LevelError::UnsupportedVersion(version.to_owned()));
    }
    let grid_size = size
        .trim()
        .parse::<u32>()
        .map_err(|_| LevelError::InvalidSize(size.to_owned()))?;

    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let decoded: SharePayload = serde_json::from_slice(&bytes)?;
    let level = Level {
        grid_size,
        walls: decoded.walls,
        npc_position: decoded.npc_position,
        target_position: decoded.target_position,
    };
    validate(&level)?;
    Ok(level)
}

fn validate(level: &Level) -> Result<(), LevelError> {
    if level.grid_size == 0 {
        return Err(LevelError::EmptyGrid);
    }
    match level.first_cell_outside_grid() {
        Some(cell) => Err(LevelError::OutsideGrid {
            cell,
            size: level.grid_size,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Level {
        Level {
            grid_size: 20,
            walls: vec![[3, 4], [3, 5], [12, 0]],
            npc_position: [0.5, 0.5],
            target_position: Some([19, 19]),
        }
    }

    #[test]
    fn share_code_round_trips_a_level() {
        let level = sample();

        let encoded = encode_share_code(&level).expect("level encodes");
        assert!(encoded.starts_with(&format!("{SHARE_HEADER}:20:")));

        let decoded = decode_share_code(&encoded).expect("share code decodes");
        assert_eq!(decoded, level);
    }

    #[test]
    fn share_code_rejects_foreign_prefix_and_version() {
        assert!(matches!(
            decode_share_code("maze:v1:20:e30"),
            Err(LevelError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            decode_share_code("wumpus:v9:20:e30"),
            Err(LevelError::UnsupportedVersion(version)) if version == "v9"
        ));
        assert!(matches!(
            decode_share_code("wumpus:v1"),
            Err(LevelError::MissingSegment("grid size"))
        ));
        assert!(matches!(decode_share_code("   "), Err(LevelError::EmptyCode)));
    }

    #[test]
    fn share_code_rejects_cells_outside_the_grid() {
        let mut level = sample();
        level.walls.push([20, 1]);
        let encoded = encode_share_code(&level).expect("level encodes");

        assert!(matches!(
            decode_share_code(&encoded),
            Err(LevelError::OutsideGrid { size: 20, .. })
        ));
    }

    #[test]
    fn saved_level_json_is_accepted() {
        let level: Level = serde_json::from_str(
            r#"{"grid_size": 20, "walls": [[1, 2], [1, 3]], "npc_position": [10.5, 4.25], "target_position": null}"#,
        )
        .expect("level parses");

        assert!(validate(&level).is_ok());
        assert_eq!(level.target(), None);
        assert_eq!(level.wall_cells().count(), 2);
    }
}
