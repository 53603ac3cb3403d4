//! Special abilities: catalogue, point budget and remaining uses.
//!
//! A [`SkillSet`] only gates eligibility and tracks consumption. The effect
//! of a skill is carried out by the game session against the boards.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use crate::common::{GameError, ShotResult};
use crate::coordinate::Coordinate;
use crate::ship::ShipKind;

/// Most shots a single barrage may fire.
pub const BARRAGE_MAX_SHOTS: usize = 3;

/// The closed set of skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SkillKind {
    /// Reveals un-hit enemy ship cells in a 3×3 area.
    Sonar,
    /// Fires up to three shots in one turn.
    Barrage,
    /// Patches one hit cell of an own ship that is still afloat.
    Repair,
}

impl SkillKind {
    pub const ALL: [SkillKind; 3] = [SkillKind::Sonar, SkillKind::Barrage, SkillKind::Repair];

    pub const fn name(self) -> &'static str {
        match self {
            SkillKind::Sonar => "Sonar",
            SkillKind::Barrage => "Barrage",
            SkillKind::Repair => "Repair",
        }
    }

    pub const fn default_cost(self) -> u32 {
        match self {
            SkillKind::Sonar => 3,
            SkillKind::Barrage => 4,
            SkillKind::Repair => 2,
        }
    }

    pub const fn default_uses(self) -> u32 {
        1
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Catalogue entry: what a skill costs and how many uses one purchase grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "camelCase"))]
pub struct SkillSpec {
    pub skill: SkillKind,
    pub cost: u32,
    pub uses: u32,
}

impl SkillSpec {
    pub const fn standard(skill: SkillKind) -> Self {
        Self {
            skill,
            cost: skill.default_cost(),
            uses: skill.default_uses(),
        }
    }
}

/// Target cells for a skill invocation. Sonar and Repair take exactly one,
/// Barrage takes one to [`BARRAGE_MAX_SHOTS`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkillParams {
    targets: Vec<Coordinate>,
}

impl SkillParams {
    pub fn new(targets: Vec<Coordinate>) -> Self {
        Self { targets }
    }

    /// A single target cell.
    pub fn at(target: Coordinate) -> Self {
        let mut targets = Vec::with_capacity(1);
        targets.push(target);
        Self { targets }
    }

    pub fn targets(&self) -> &[Coordinate] {
        &self.targets
    }

    /// The one target of a single-cell skill.
    pub(crate) fn single(&self, skill: SkillKind) -> Result<Coordinate, GameError> {
        match self.targets.as_slice() {
            [only] => Ok(*only),
            _ => Err(GameError::InvalidSkillTarget {
                skill,
                reason: "exactly one target cell is required",
            }),
        }
    }
}

/// What a skill did.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SkillResult {
    /// Un-hit enemy ship cells found around `center`.
    Sonar {
        center: Coordinate,
        contacts: Vec<Coordinate>,
    },
    /// Each shot fired, in order.
    Barrage { shots: Vec<(Coordinate, ShotResult)> },
    /// The repaired cell and the ship it belongs to.
    Repair { target: Coordinate, kind: ShipKind },
}

impl SkillResult {
    /// True when a shot of this skill sank the last enemy ship.
    pub fn destroyed_fleet(&self) -> bool {
        match self {
            SkillResult::Barrage { shots } => shots
                .iter()
                .any(|(_, r)| matches!(r, ShotResult::FleetDestroyed(_))),
            _ => false,
        }
    }
}

/// One side's skill points, the catalogue on offer and uses remaining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillSet {
    points: u32,
    catalogue: BTreeMap<SkillKind, SkillSpec>,
    uses: BTreeMap<SkillKind, u32>,
}

impl SkillSet {
    /// A fresh set with `points` to spend on `catalogue`.
    pub fn new(points: u32, catalogue: &[SkillSpec]) -> Self {
        Self {
            points,
            catalogue: catalogue.iter().map(|s| (s.skill, *s)).collect(),
            uses: BTreeMap::new(),
        }
    }

    /// Rebuild a set from stored parts. Uses for skills outside the
    /// catalogue are rejected by the caller.
    pub(crate) fn from_parts(
        points: u32,
        catalogue: &[SkillSpec],
        uses: BTreeMap<SkillKind, u32>,
    ) -> Self {
        Self {
            points,
            catalogue: catalogue.iter().map(|s| (s.skill, *s)).collect(),
            uses,
        }
    }

    /// Points left to spend.
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Cost of `skill`, if it is on offer.
    pub fn cost(&self, skill: SkillKind) -> Option<u32> {
        self.catalogue.get(&skill).map(|s| s.cost)
    }

    /// Catalogue entries in skill order.
    pub fn catalogue(&self) -> impl Iterator<Item = &SkillSpec> {
        self.catalogue.values()
    }

    /// Remaining uses of `skill`; `None` if never acquired.
    pub fn uses(&self, skill: SkillKind) -> Option<u32> {
        self.uses.get(&skill).copied()
    }

    /// Acquired skills with their remaining uses.
    pub fn owned(&self) -> impl Iterator<Item = (SkillKind, u32)> + '_ {
        self.uses.iter().map(|(k, v)| (*k, *v))
    }

    /// True when `skill` has been acquired and still has a use left.
    pub fn can_use(&self, skill: SkillKind) -> bool {
        self.check(skill).is_ok()
    }

    /// Spend points on `skill`, adding its uses. Returns the new use count.
    pub fn acquire(&mut self, skill: SkillKind) -> Result<u32, GameError> {
        let spec = *self
            .catalogue
            .get(&skill)
            .ok_or(GameError::SkillNotOffered { skill })?;
        if spec.cost > self.points {
            return Err(GameError::InsufficientPoints {
                skill,
                cost: spec.cost,
                available: self.points,
            });
        }
        self.points -= spec.cost;
        let uses = self.uses.entry(skill).or_insert(0);
        *uses += spec.uses;
        Ok(*uses)
    }

    /// Eligibility check without consuming a use.
    pub fn check(&self, skill: SkillKind) -> Result<(), GameError> {
        match self.uses.get(&skill) {
            None => Err(GameError::SkillNotOwned { skill }),
            Some(0) => Err(GameError::NoUsesRemaining { skill }),
            Some(_) => Ok(()),
        }
    }

    /// Consume one use of `skill`. Returns the uses left.
    pub fn consume(&mut self, skill: SkillKind) -> Result<u32, GameError> {
        self.check(skill)?;
        let uses = self
            .uses
            .get_mut(&skill)
            .ok_or(GameError::SkillNotOwned { skill })?;
        *uses -= 1;
        Ok(*uses)
    }

    /// Points needed to have bought `uses` uses of `skill`, or `None` when
    /// the skill is not in the catalogue.
    pub fn purchase_cost(&self, skill: SkillKind, uses: u32) -> Option<u64> {
        let spec = self.catalogue.get(&skill)?;
        let purchases = uses.div_ceil(spec.uses.max(1));
        Some(u64::from(purchases) * u64::from(spec.cost))
    }
}
