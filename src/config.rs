use alloc::vec::Vec;

use crate::common::GameError;
use crate::ship::ShipKind;
use crate::skill::{SkillKind, SkillSpec};

pub const DEFAULT_BOARD_SIZE: usize = 10;
pub const MAX_BOARD_SIZE: usize = 26;
pub const CLASSIC_FLEET: [ShipKind; 5] = ShipKind::ALL;
pub const DEFAULT_SKILL_POINTS: u32 = 5;

/// Whether ships may touch each other when placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AdjacencyRule {
    /// Ships may touch; only overlap is forbidden.
    #[default]
    Allowed,
    /// Ships may touch diagonally but not along an edge.
    NoEdgeContact,
    /// Ships may not touch at all, corners included.
    NoContact,
}

/// Rules for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "camelCase", default))]
pub struct GameConfig {
    pub board_size: usize,
    /// Ships each side places. Kinds may repeat.
    pub fleet: Vec<ShipKind>,
    /// Skills on offer with their cost and uses per acquisition.
    pub skills: Vec<SkillSpec>,
    /// Point budget each side starts with.
    pub skill_points: u32,
    pub adjacency: AdjacencyRule,
    pub player_first: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            fleet: CLASSIC_FLEET.to_vec(),
            skills: SkillKind::ALL.iter().map(|&k| SkillSpec::standard(k)).collect(),
            skill_points: DEFAULT_SKILL_POINTS,
            adjacency: AdjacencyRule::default(),
            player_first: true,
        }
    }
}

impl GameConfig {
    /// Classic rules on a board of `board_size`.
    pub fn with_board_size(board_size: usize) -> Self {
        Self {
            board_size,
            ..Self::default()
        }
    }

    /// Check that a game can be played under these rules.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.board_size == 0 || self.board_size > MAX_BOARD_SIZE {
            return Err(GameError::InvalidConfig {
                reason: "board size must be between 1 and 26",
            });
        }
        if self.fleet.is_empty() {
            return Err(GameError::InvalidConfig {
                reason: "fleet is empty",
            });
        }
        if self.fleet.iter().any(|k| k.length() > self.board_size) {
            return Err(GameError::InvalidConfig {
                reason: "a ship is longer than the board",
            });
        }
        let cells: usize = self.fleet.iter().map(|k| k.length()).sum();
        if cells > self.board_size * self.board_size {
            return Err(GameError::InvalidConfig {
                reason: "fleet does not fit on the board",
            });
        }
        for (i, spec) in self.skills.iter().enumerate() {
            if spec.cost == 0 || spec.uses == 0 {
                return Err(GameError::InvalidConfig {
                    reason: "skill cost and uses must be positive",
                });
            }
            if self.skills[..i].iter().any(|s| s.skill == spec.skill) {
                return Err(GameError::InvalidConfig {
                    reason: "skill listed twice in the catalogue",
                });
            }
        }
        Ok(())
    }

    /// Catalogue entry for `skill`.
    pub fn skill_spec(&self, skill: SkillKind) -> Option<&SkillSpec> {
        self.skills.iter().find(|s| s.skill == skill)
    }

    /// Load rules from a JSON file. Missing fields take their defaults.
    #[cfg(feature = "std")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening config {}", path.display()))?;
        let config: GameConfig = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}
