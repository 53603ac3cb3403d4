//! Commonly used types for driving a game.

pub use crate::{
    Actor, AiPlayer, Coordinate, CpuTurn, GameConfig, GameError, GameSession, Orientation, Phase,
    Player, ShipKind, ShotResult, SkillKind, SkillParams, SkillResult,
};

#[cfg(feature = "std")]
pub use crate::persistence::{load_from_path, save_to_path, SaveFormat};
