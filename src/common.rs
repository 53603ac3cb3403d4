//! Common types for the engine: errors and shot results.

use alloc::string::String;
use core::fmt;

use crate::coordinate::Coordinate;
use crate::game::{Actor, Phase};
use crate::ship::{Orientation, ShipKind};
use crate::skill::SkillKind;

/// Result of a shot against a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ShotResult {
    /// Shot landed in open water.
    Miss,
    /// Shot hit a ship that is still afloat.
    Hit,
    /// Shot sank a ship, carrying its kind.
    Sunk(ShipKind),
    /// Shot sank the last ship afloat on the board.
    FleetDestroyed(ShipKind),
}

impl ShotResult {
    /// Any outcome that struck a ship.
    pub fn is_hit(&self) -> bool {
        !matches!(self, ShotResult::Miss)
    }

    /// Kind of the ship sunk by this shot, if any.
    pub fn sunk_kind(&self) -> Option<ShipKind> {
        match self {
            ShotResult::Sunk(kind) | ShotResult::FleetDestroyed(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Why a ship could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementViolation {
    /// Part of the run falls outside the board.
    OutOfBounds,
    /// The run overlaps a ship already placed.
    Overlap,
    /// The run touches a ship in a way the adjacency rule forbids.
    Adjacent,
    /// The fleet has no unplaced ship of this kind.
    NotInFleet,
    /// No valid position could be found for a random placement.
    NoRoom,
    /// Stored cells do not form a straight run of the kind's length.
    Malformed,
}

impl fmt::Display for PlacementViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PlacementViolation::OutOfBounds => "ship extends beyond the board",
            PlacementViolation::Overlap => "ship overlaps another ship",
            PlacementViolation::Adjacent => "ship touches another ship",
            PlacementViolation::NotInFleet => "no unplaced ship of this kind in the fleet",
            PlacementViolation::NoRoom => "no room left for this ship",
            PlacementViolation::Malformed => "ship cells are not a straight contiguous run",
        };
        f.write_str(msg)
    }
}

/// Errors returned by engine operations. A failed operation never leaves a
/// partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    InvalidPlacement {
        kind: ShipKind,
        anchor: Coordinate,
        orientation: Orientation,
        violation: PlacementViolation,
    },
    OutOfBounds {
        coordinate: Coordinate,
        size: usize,
    },
    AlreadyTargeted {
        coordinate: Coordinate,
    },
    NotYourTurn {
        expected: Actor,
        actual: Actor,
    },
    GameOver {
        phase: Phase,
    },
    /// The action is not available in the current phase.
    WrongPhase {
        expected: Phase,
        actual: Phase,
    },
    /// `start` was called before every ship of a fleet was placed.
    FleetIncomplete {
        actor: Actor,
        placed: usize,
        required: usize,
    },
    InsufficientPoints {
        skill: SkillKind,
        cost: u32,
        available: u32,
    },
    SkillNotOffered {
        skill: SkillKind,
    },
    SkillNotOwned {
        skill: SkillKind,
    },
    NoUsesRemaining {
        skill: SkillKind,
    },
    InvalidSkillTarget {
        skill: SkillKind,
        reason: &'static str,
    },
    InvalidConfig {
        reason: &'static str,
    },
    UnsupportedVersion {
        found: String,
        supported: &'static str,
    },
    CorruptSave {
        reason: String,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidPlacement {
                kind,
                anchor,
                orientation,
                violation,
            } => write!(
                f,
                "Cannot place {} at {} ({:?}): {}",
                kind, anchor, orientation, violation
            ),
            GameError::OutOfBounds { coordinate, size } => {
                write!(f, "Coordinate {} is outside the {}x{} board", coordinate, size, size)
            }
            GameError::AlreadyTargeted { coordinate } => {
                write!(f, "Coordinate {} was already targeted", coordinate)
            }
            GameError::NotYourTurn { expected, actual } => {
                write!(f, "It is {:?}'s turn, not {:?}'s", expected, actual)
            }
            GameError::GameOver { phase } => write!(f, "Game is over ({:?})", phase),
            GameError::WrongPhase { expected, actual } => {
                write!(f, "Action requires phase {:?}, game is in {:?}", expected, actual)
            }
            GameError::FleetIncomplete {
                actor,
                placed,
                required,
            } => write!(
                f,
                "{:?} fleet incomplete: {} of {} ships placed",
                actor, placed, required
            ),
            GameError::InsufficientPoints {
                skill,
                cost,
                available,
            } => write!(
                f,
                "{} costs {} points, only {} available",
                skill, cost, available
            ),
            GameError::SkillNotOffered { skill } => {
                write!(f, "{} is not part of this game's skill catalogue", skill)
            }
            GameError::SkillNotOwned { skill } => write!(f, "{} has not been acquired", skill),
            GameError::NoUsesRemaining { skill } => write!(f, "{} has no uses remaining", skill),
            GameError::InvalidSkillTarget { skill, reason } => {
                write!(f, "Invalid target for {}: {}", skill, reason)
            }
            GameError::InvalidConfig { reason } => write!(f, "Invalid game configuration: {}", reason),
            GameError::UnsupportedVersion { found, supported } => write!(
                f,
                "Save version {} is not supported (this build reads {})",
                found, supported
            ),
            GameError::CorruptSave { reason } => write!(f, "Corrupt save: {}", reason),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GameError {}
