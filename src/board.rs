//! One side's grid of cells and the fleet placed on it.

use alloc::format;
use alloc::vec::Vec;
use core::fmt;
use rand::Rng;

use crate::bitboard::BitGrid;
use crate::common::{GameError, PlacementViolation, ShotResult};
use crate::config::AdjacencyRule;
use crate::coordinate::Coordinate;
use crate::ship::{Orientation, Ship, ShipKind};
use crate::skill::SkillKind;

/// State of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CellState {
    Empty,
    Ship,
    Hit,
    Miss,
    Sunk,
}

impl CellState {
    /// True once a shot has landed on the cell.
    pub fn is_targeted(self) -> bool {
        matches!(self, CellState::Hit | CellState::Miss | CellState::Sunk)
    }
}

/// Whether un-hit ship cells are shown in a [`BoardView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Full,
    Hidden,
}

/// A read-only copy of a board's cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    size: usize,
    cells: Vec<CellState>,
}

impl BoardView {
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell at `coord`, `None` when out of bounds.
    pub fn get(&self, coord: Coordinate) -> Option<CellState> {
        coord
            .in_bounds(self.size)
            .then(|| self.cells[coord.index(self.size)])
    }

    /// True if `coord` is on the board and has not been shot at.
    pub fn is_open(&self, coord: Coordinate) -> bool {
        self.get(coord).is_some_and(|c| !c.is_targeted())
    }

    /// Cells row by row.
    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Coordinates in `state`, row-major.
    pub fn cells_in(&self, state: CellState) -> impl Iterator<Item = Coordinate> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, c)| **c == state)
            .map(move |(i, _)| Coordinate::from_index(i, self.size))
    }
}

impl fmt::Display for BoardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.rows().enumerate() {
            for cell in row {
                let ch = match cell {
                    CellState::Empty => '.',
                    CellState::Ship => 'S',
                    CellState::Hit => 'X',
                    CellState::Miss => 'o',
                    CellState::Sunk => '#',
                };
                write!(f, "{} ", ch)?;
            }
            if r + 1 < self.size {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Cells, ships and occupancy of one side.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    adjacency: AdjacencyRule,
    cells: Vec<CellState>,
    ships: Vec<Ship>,
    occupied: BitGrid,
}

impl Board {
    /// Create an empty `size`×`size` board enforcing `adjacency` on placement.
    pub fn new(size: usize, adjacency: AdjacencyRule) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        cells.resize(size * size, CellState::Empty);
        Board {
            size,
            adjacency,
            cells,
            ships: Vec::new(),
            occupied: BitGrid::new(size),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn adjacency(&self) -> AdjacencyRule {
        self.adjacency
    }

    /// Ships in placement order.
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship_kinds(&self) -> impl Iterator<Item = ShipKind> + '_ {
        self.ships.iter().map(|s| s.kind())
    }

    /// Occupancy of all ships.
    pub fn occupied(&self) -> &BitGrid {
        &self.occupied
    }

    /// State of the cell at `coord`.
    pub fn cell(&self, coord: Coordinate) -> Result<CellState, GameError> {
        self.check_bounds(coord)?;
        Ok(self.cells[coord.index(self.size)])
    }

    /// Place a ship of `kind` with its first cell at `anchor`.
    pub fn place_ship(
        &mut self,
        kind: ShipKind,
        anchor: Coordinate,
        orientation: Orientation,
    ) -> Result<(), GameError> {
        let invalid = |violation| GameError::InvalidPlacement {
            kind,
            anchor,
            orientation,
            violation,
        };
        let ship = Ship::new(kind, anchor, orientation, self.size).map_err(invalid)?;
        self.check_placement(&ship).map_err(invalid)?;
        log::trace!("placed {} at {} {:?}", kind, anchor, orientation);
        self.register(ship);
        Ok(())
    }

    /// Validate `ship` against the ships already on the board.
    pub fn check_placement(&self, ship: &Ship) -> Result<(), PlacementViolation> {
        if ship.positions().iter().any(|c| !c.in_bounds(self.size)) {
            return Err(PlacementViolation::OutOfBounds);
        }
        let mask = ship.mask(self.size);
        if mask.intersects(&self.occupied) {
            return Err(PlacementViolation::Overlap);
        }
        let corners = match self.adjacency {
            AdjacencyRule::Allowed => return Ok(()),
            AdjacencyRule::NoEdgeContact => false,
            AdjacencyRule::NoContact => true,
        };
        let blocked = self
            .ships
            .iter()
            .fold(BitGrid::new(self.size), |acc, other| {
                &acc | &other.halo(self.size, corners)
            });
        if blocked.intersects(&mask) {
            return Err(PlacementViolation::Adjacent);
        }
        Ok(())
    }

    /// A random valid `(anchor, orientation)` for `kind`, drawn uniformly
    /// from every legal position.
    pub fn random_placement<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        kind: ShipKind,
    ) -> Result<(Coordinate, Orientation), GameError> {
        let mut options = Vec::new();
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            for idx in 0..self.size * self.size {
                let anchor = Coordinate::from_index(idx, self.size);
                let fits = Ship::new(kind, anchor, orientation, self.size)
                    .ok()
                    .is_some_and(|ship| self.check_placement(&ship).is_ok());
                if fits {
                    options.push((anchor, orientation));
                }
            }
        }
        if options.is_empty() {
            return Err(GameError::InvalidPlacement {
                kind,
                anchor: Coordinate::new(0, 0),
                orientation: Orientation::Horizontal,
                violation: PlacementViolation::NoRoom,
            });
        }
        Ok(options[rng.random_range(0..options.len())])
    }

    /// Resolve a shot at `coord`.
    pub fn receive_shot(&mut self, coord: Coordinate) -> Result<ShotResult, GameError> {
        self.check_bounds(coord)?;
        let idx = coord.index(self.size);
        match self.cells[idx] {
            CellState::Hit | CellState::Miss | CellState::Sunk => {
                Err(GameError::AlreadyTargeted { coordinate: coord })
            }
            CellState::Empty => {
                self.cells[idx] = CellState::Miss;
                Ok(ShotResult::Miss)
            }
            CellState::Ship => {
                let ship_idx = self.ship_at(coord).ok_or_else(|| GameError::CorruptSave {
                    reason: format!("ship cell {} has no ship", coord),
                })?;
                self.cells[idx] = CellState::Hit;
                let ship = &mut self.ships[ship_idx];
                ship.register_hit();
                if !ship.is_sunk() {
                    return Ok(ShotResult::Hit);
                }
                let kind = ship.kind();
                let size = self.size;
                for cell in self.ships[ship_idx].positions() {
                    self.cells[cell.index(size)] = CellState::Sunk;
                }
                if self.is_fleet_destroyed() {
                    Ok(ShotResult::FleetDestroyed(kind))
                } else {
                    Ok(ShotResult::Sunk(kind))
                }
            }
        }
    }

    /// True when the board holds ships and every one of them is sunk.
    pub fn is_fleet_destroyed(&self) -> bool {
        !self.ships.is_empty() && self.ships.iter().all(Ship::is_sunk)
    }

    /// Kinds of sunk ships, in placement order.
    pub fn sunk_ship_kinds(&self) -> Vec<ShipKind> {
        self.ships
            .iter()
            .filter(|s| s.is_sunk())
            .map(Ship::kind)
            .collect()
    }

    /// Lengths of ships still afloat.
    pub fn remaining_ship_lengths(&self) -> Vec<usize> {
        self.ships
            .iter()
            .filter(|s| !s.is_sunk())
            .map(Ship::length)
            .collect()
    }

    /// Copy of the cells, with un-hit ships hidden when `reveal` is `Hidden`.
    pub fn view(&self, reveal: Reveal) -> BoardView {
        let cells = self
            .cells
            .iter()
            .map(|&c| match (reveal, c) {
                (Reveal::Hidden, CellState::Ship) => CellState::Empty,
                (_, c) => c,
            })
            .collect();
        BoardView {
            size: self.size,
            cells,
        }
    }

    /// Un-hit ship cells in the 3×3 square around `center`.
    pub fn sonar(&self, center: Coordinate) -> Result<Vec<Coordinate>, GameError> {
        if !center.in_bounds(self.size) {
            return Err(GameError::InvalidSkillTarget {
                skill: SkillKind::Sonar,
                reason: "centre is outside the board",
            });
        }
        Ok(center
            .surrounding(self.size)
            .filter(|c| self.cells[c.index(self.size)] == CellState::Ship)
            .collect())
    }

    /// Hit cells on ships still afloat, row-major.
    pub fn repairable_cells(&self) -> Vec<Coordinate> {
        (0..self.cells.len())
            .filter(|&i| self.cells[i] == CellState::Hit)
            .map(|i| Coordinate::from_index(i, self.size))
            .collect()
    }

    /// Undo the hit at `coord`. Only hit cells of ships still afloat qualify.
    pub fn repair(&mut self, coord: Coordinate) -> Result<ShipKind, GameError> {
        let invalid = |reason| GameError::InvalidSkillTarget {
            skill: SkillKind::Repair,
            reason,
        };
        if !coord.in_bounds(self.size) {
            return Err(invalid("cell is outside the board"));
        }
        let idx = coord.index(self.size);
        if self.cells[idx] != CellState::Hit {
            return Err(invalid("cell is not a damaged ship segment"));
        }
        let ship_idx = self
            .ship_at(coord)
            .ok_or(invalid("cell is not a damaged ship segment"))?;
        self.cells[idx] = CellState::Ship;
        self.ships[ship_idx].repair();
        Ok(self.ships[ship_idx].kind())
    }

    /// Rebuild a board from stored ships and cells, checking that they agree.
    pub fn restore(
        size: usize,
        adjacency: AdjacencyRule,
        ships: Vec<Ship>,
        cells: Vec<CellState>,
    ) -> Result<Self, GameError> {
        if cells.len() != size * size {
            return Err(GameError::CorruptSave {
                reason: format!("expected {} cells, found {}", size * size, cells.len()),
            });
        }
        let mut board = Board::new(size, adjacency);
        for ship in ships {
            board
                .check_placement(&ship)
                .map_err(|violation| GameError::InvalidPlacement {
                    kind: ship.kind(),
                    anchor: ship.anchor(),
                    orientation: ship.orientation(),
                    violation,
                })?;
            let mut impacts = 0;
            for cell in ship.positions() {
                let state = cells[cell.index(size)];
                let consistent = match state {
                    CellState::Ship | CellState::Hit => !ship.is_sunk(),
                    CellState::Sunk => ship.is_sunk(),
                    CellState::Empty | CellState::Miss => false,
                };
                if !consistent {
                    return Err(GameError::CorruptSave {
                        reason: format!("cell {} reads {:?} under {:?}", cell, state, ship),
                    });
                }
                if state != CellState::Ship {
                    impacts += 1;
                }
            }
            if impacts != ship.impacts() {
                return Err(GameError::CorruptSave {
                    reason: format!(
                        "{} records {} impacts but {} cells are hit",
                        ship.kind(),
                        ship.impacts(),
                        impacts
                    ),
                });
            }
            board.register(ship);
        }
        for (i, state) in cells.iter().enumerate() {
            let coord = Coordinate::from_index(i, size);
            let on_ship = board.occupied.get(coord).unwrap_or(false);
            if !on_ship && !matches!(state, CellState::Empty | CellState::Miss) {
                return Err(GameError::CorruptSave {
                    reason: format!("cell {} reads {:?} but holds no ship", coord, state),
                });
            }
        }
        board.cells = cells;
        Ok(board)
    }

    fn register(&mut self, ship: Ship) {
        self.occupied |= &ship.mask(self.size);
        for &cell in ship.positions() {
            self.cells[cell.index(self.size)] = CellState::Ship;
        }
        self.ships.push(ship);
    }

    fn ship_at(&self, coord: Coordinate) -> Option<usize> {
        self.ships.iter().position(|s| s.contains(coord))
    }

    fn check_bounds(&self, coord: Coordinate) -> Result<(), GameError> {
        if coord.in_bounds(self.size) {
            Ok(())
        } else {
            Err(GameError::OutOfBounds {
                coordinate: coord,
                size: self.size,
            })
        }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board {{\n  size: {},\n  adjacency: {:?},\n  ships: {:?},\n  cells:\n{}\n}}",
            self.size,
            self.adjacency,
            self.ships,
            self.view(Reveal::Full)
        )
    }
}
