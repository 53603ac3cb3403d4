//! Ship kinds and placed ships.

use alloc::vec::Vec;
use core::fmt;

use crate::bitboard::BitGrid;
use crate::common::PlacementViolation;
use crate::coordinate::{Coordinate, Direction};

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Orientation {
    /// Columns increase from the anchor.
    Horizontal,
    /// Rows increase from the anchor.
    Vertical,
}

impl Orientation {
    fn direction(self) -> Direction {
        match self {
            Orientation::Horizontal => Direction::Right,
            Orientation::Vertical => Direction::Down,
        }
    }
}

/// The fixed set of ship types. Length is determined by the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ShipKind {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipKind {
    pub const ALL: [ShipKind; 5] = [
        ShipKind::Carrier,
        ShipKind::Battleship,
        ShipKind::Cruiser,
        ShipKind::Submarine,
        ShipKind::Destroyer,
    ];

    /// Number of cells the ship occupies.
    pub const fn length(self) -> usize {
        match self {
            ShipKind::Carrier => 5,
            ShipKind::Battleship => 4,
            ShipKind::Cruiser => 3,
            ShipKind::Submarine => 3,
            ShipKind::Destroyer => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShipKind::Carrier => "Carrier",
            ShipKind::Battleship => "Battleship",
            ShipKind::Cruiser => "Cruiser",
            ShipKind::Submarine => "Submarine",
            ShipKind::Destroyer => "Destroyer",
        }
    }
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ship placed on a board. Impacts are counted, the cells that took them
/// are tracked by the owning board.
#[derive(Clone, PartialEq, Eq)]
pub struct Ship {
    kind: ShipKind,
    orientation: Orientation,
    positions: Vec<Coordinate>,
    impacts: usize,
}

impl Ship {
    /// Lay out a ship of `kind` from `anchor` towards `orientation`.
    /// Fails when any cell of the run falls outside a `size`×`size` board.
    pub fn new(
        kind: ShipKind,
        anchor: Coordinate,
        orientation: Orientation,
        size: usize,
    ) -> Result<Self, PlacementViolation> {
        if !anchor.in_bounds(size) {
            return Err(PlacementViolation::OutOfBounds);
        }
        let mut positions = Vec::with_capacity(kind.length());
        let mut cell = anchor;
        positions.push(cell);
        for _ in 1..kind.length() {
            cell = cell
                .step(orientation.direction(), size)
                .ok_or(PlacementViolation::OutOfBounds)?;
            positions.push(cell);
        }
        Ok(Ship {
            kind,
            orientation,
            positions,
            impacts: 0,
        })
    }

    /// Rebuild a ship from stored cells. The cells may come in any order but
    /// must form one straight, contiguous run of the kind's length.
    pub fn from_positions(
        kind: ShipKind,
        mut positions: Vec<Coordinate>,
        impacts: usize,
        size: usize,
    ) -> Result<Self, PlacementViolation> {
        if positions.len() != kind.length() {
            return Err(PlacementViolation::Malformed);
        }
        positions.sort();
        let anchor = positions[0];
        let orientation = match positions.get(1) {
            Some(next) if next.row() == anchor.row() => Orientation::Horizontal,
            Some(_) => Orientation::Vertical,
            None => Orientation::Horizontal,
        };
        let mut ship = Ship::new(kind, anchor, orientation, size)?;
        if ship.positions != positions || impacts > kind.length() {
            return Err(PlacementViolation::Malformed);
        }
        ship.impacts = impacts;
        Ok(ship)
    }

    pub fn kind(&self) -> ShipKind {
        self.kind
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// First cell of the run.
    pub fn anchor(&self) -> Coordinate {
        self.positions[0]
    }

    pub fn positions(&self) -> &[Coordinate] {
        &self.positions
    }

    pub fn length(&self) -> usize {
        self.kind.length()
    }

    pub fn impacts(&self) -> usize {
        self.impacts
    }

    /// Sunk once every segment has been hit.
    pub fn is_sunk(&self) -> bool {
        self.impacts >= self.length()
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        self.positions.contains(&coord)
    }

    /// Occupancy of this ship on a `size`×`size` grid.
    pub fn mask(&self, size: usize) -> BitGrid {
        let mut mask = BitGrid::new(size);
        for &cell in &self.positions {
            let _ = mask.set(cell);
        }
        mask
    }

    /// Occupied cells plus every cell touching them, edges only or corners
    /// too depending on `corners`.
    pub fn halo(&self, size: usize, corners: bool) -> BitGrid {
        let mut halo = BitGrid::new(size);
        for &cell in &self.positions {
            let _ = halo.set(cell);
            if corners {
                for near in cell.surrounding(size) {
                    let _ = halo.set(near);
                }
            } else {
                for near in cell.neighbors(size) {
                    let _ = halo.set(near);
                }
            }
        }
        halo
    }

    pub(crate) fn register_hit(&mut self) {
        self.impacts = (self.impacts + 1).min(self.length());
    }

    pub(crate) fn repair(&mut self) {
        self.impacts = self.impacts.saturating_sub(1);
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ kind: {}, anchor: {}, orientation: {:?}, impacts: {} }}",
            self.kind,
            self.anchor(),
            self.orientation,
            self.impacts,
        )
    }
}
