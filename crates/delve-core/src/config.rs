//! Generator configuration and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::RoomTemplate;

/// Configuration errors that abort a generation pass before any state is
/// touched. Shortfalls during generation are warnings, never errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("room catalog is empty")]
    EmptyCatalog,

    #[error("room catalog total weight is zero")]
    ZeroTotalWeight,

    #[error("board size must be positive, got {0}")]
    InvalidBoardSize(i32),

    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),

    #[error("spatial cell size must be positive, got {0}")]
    InvalidSpatialCellSize(f32),

    #[error("template '{name}' has invalid footprint {width}x{height}")]
    InvalidTemplateSize {
        name: String,
        width: i32,
        height: i32,
    },

    #[error("template '{name}' footprint {width}x{height} does not fit board of size {board}")]
    TemplateTooLarge {
        name: String,
        width: i32,
        height: i32,
        board: i32,
    },
}

/// Full configuration for one generator instance.
///
/// Immutable while a pass runs; `Generator::generate` validates it up
/// front and aborts on the first hard error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    /// Placeable room templates.
    pub catalog: Vec<RoomTemplate>,
    /// Board is `board_size x board_size` cells.
    pub board_size: i32,
    /// Stop weighted placement once this many rooms exist.
    pub target_room_count: usize,
    /// Padding in cells around each room's bounding box for overlap tests.
    pub min_room_spacing: i32,
    /// Upper bound of the random jitter added to pathfinder priorities.
    pub variation: f32,
    /// World-space edge length of one board cell.
    pub tile_size: f32,
    /// Number of collectible markers to scatter over carved tiles.
    pub marker_count: usize,
    /// Square bucket size of the spatial index, in world units.
    pub spatial_cell_size: f32,
    /// Seed for the first pass; 0 keeps the entropy-seeded stream.
    pub seed: u64,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            catalog: Vec::new(),
            board_size: 50,
            target_room_count: 8,
            min_room_spacing: 2,
            variation: 0.5,
            tile_size: 15.0,
            marker_count: 25,
            spatial_cell_size: 50.0,
            seed: 0,
        }
    }
}

impl GenConfig {
    /// Check the configuration.
    ///
    /// Hard problems come back as `Err` and must abort generation. Soft
    /// problems (a target count the board can't plausibly hold, guaranteed
    /// footprints crowding the board) are logged as warnings only.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size <= 0 {
            return Err(ConfigError::InvalidBoardSize(self.board_size));
        }
        if self.tile_size <= 0.0 {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        if self.spatial_cell_size <= 0.0 {
            return Err(ConfigError::InvalidSpatialCellSize(self.spatial_cell_size));
        }
        if self.catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for template in &self.catalog {
            if template.width <= 0 || template.height <= 0 {
                return Err(ConfigError::InvalidTemplateSize {
                    name: template.name.clone(),
                    width: template.width,
                    height: template.height,
                });
            }
            if template.width > self.board_size || template.height > self.board_size {
                return Err(ConfigError::TemplateTooLarge {
                    name: template.name.clone(),
                    width: template.width,
                    height: template.height,
                    board: self.board_size,
                });
            }
            if template.weight == 0 {
                log::warn!("template '{}' has weight 0 and will never be picked", template.name);
            }
        }
        let total_weight: u64 = self.catalog.iter().map(|t| t.weight as u64).sum();
        if total_weight == 0 {
            return Err(ConfigError::ZeroTotalWeight);
        }

        let board_area = self.board_size as i64 * self.board_size as i64;
        if self.target_room_count as i64 > board_area / 100 {
            log::warn!(
                "target of {} rooms is high for a {}x{} board; placement may fall short",
                self.target_room_count,
                self.board_size,
                self.board_size
            );
        }
        let guaranteed_area: i64 = self
            .catalog
            .iter()
            .filter(|t| t.guaranteed_spawn)
            .map(|t| t.area())
            .sum();
        if guaranteed_area * 2 > board_area {
            log::warn!(
                "guaranteed rooms cover {guaranteed_area} of {board_area} cells; placement may fail"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_room_config() -> GenConfig {
        GenConfig {
            catalog: vec![RoomTemplate::new("cell", 3, 3)],
            ..GenConfig::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(one_room_config().validate().is_ok());
    }

    #[test]
    fn test_empty_catalog() {
        let cfg = GenConfig::default();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyCatalog));
    }

    #[test]
    fn test_zero_total_weight() {
        let mut cfg = one_room_config();
        cfg.catalog[0].weight = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTotalWeight));
    }

    #[test]
    fn test_bad_board_size() {
        let mut cfg = one_room_config();
        cfg.board_size = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidBoardSize(0)));
    }

    #[test]
    fn test_bad_tile_size() {
        let mut cfg = one_room_config();
        cfg.tile_size = -1.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidTileSize(_))
        ));
    }

    #[test]
    fn test_degenerate_template() {
        let mut cfg = one_room_config();
        cfg.catalog[0].width = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidTemplateSize { .. })
        ));
    }

    #[test]
    fn test_oversized_template() {
        let mut cfg = one_room_config();
        cfg.catalog[0].width = 200;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::TemplateTooLarge { .. })
        ));
    }

    #[test]
    fn test_config_roundtrip_json() {
        let cfg = one_room_config();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: GenConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.board_size, cfg.board_size);
        assert_eq!(back.catalog.len(), 1);
    }
}
