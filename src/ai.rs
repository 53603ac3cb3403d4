// Hunt/target guessing against the opponent board.
//
// Hunt mode scores open cells by how many ways a remaining ship could cover
// them, restricted to a parity lattice of the smallest remaining ship. Target
// mode works outwards from unresolved hits. Every random choice comes from
// the caller's generator, so a fixed seed replays the same shots.

use alloc::vec::Vec;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::{
    board::{Board, BoardView, CellState},
    common::{GameError, ShotResult},
    coordinate::{Coordinate, Direction},
    player::Player,
    ship::ShipKind,
};

/// Placements covering more observed hits weigh this much more per hit, so
/// cells next to confirmed hits stand out.
const HIT_BIAS: u64 = 10;

/// For every cell, the weighted number of ways a remaining ship could cover
/// it without crossing a miss or a sunk ship. Targeted cells score zero.
pub fn placement_density(view: &BoardView, remaining: &[usize]) -> Vec<u64> {
    let size = view.size();
    let mut density = Vec::with_capacity(size * size);
    density.resize(size * size, 0u64);

    for &len in remaining.iter() {
        if len == 0 || len > size {
            continue;
        }
        for dir in [Direction::Right, Direction::Down] {
            for idx in 0..size * size {
                let start = Coordinate::from_index(idx, size);
                let mut run = Vec::with_capacity(len);
                let mut cell = Some(start);
                for _ in 0..len {
                    match cell {
                        Some(c) => {
                            run.push(c);
                            cell = c.step(dir, size);
                        }
                        None => break,
                    }
                }
                if run.len() < len {
                    continue;
                }
                let blocked = run.iter().any(|c| {
                    matches!(view.get(*c), Some(CellState::Miss | CellState::Sunk))
                });
                if blocked {
                    continue;
                }
                let n_hits = run
                    .iter()
                    .filter(|c| view.get(**c) == Some(CellState::Hit))
                    .count();
                let weight = HIT_BIAS.saturating_pow(n_hits as u32);
                for c in run.iter().filter(|c| view.is_open(**c)) {
                    let slot = &mut density[c.index(size)];
                    *slot = slot.saturating_add(weight);
                }
            }
        }
    }
    density
}

/// Computer opponent with a hunt mode and a target mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiPlayer {
    /// Hits not yet resolved into a sunk ship, most recent last.
    unresolved: Vec<Coordinate>,
    /// Ship cells reported by sonar and not yet fired at.
    contacts: Vec<Coordinate>,
}

impl AiPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a hit or a sonar contact is waiting to be followed up.
    pub fn is_targeting(&self) -> bool {
        !self.unresolved.is_empty() || !self.contacts.is_empty()
    }

    /// Remember ship cells revealed by a sonar sweep.
    pub fn handle_contacts(&mut self, contacts: &[Coordinate]) {
        for c in contacts {
            if !self.contacts.contains(c) {
                self.contacts.push(*c);
            }
        }
    }

    /// Syncs the unresolved hits with the board: drops cells that are no
    /// longer hits (sunk or repaired) and adopts hits it did not record,
    /// as after a restore, ahead of its own in row-major order.
    fn refresh(&mut self, view: &BoardView) {
        self.unresolved
            .retain(|c| view.get(*c) == Some(CellState::Hit));
        self.contacts.retain(|c| view.is_open(*c));
        let mut merged: Vec<Coordinate> = view
            .cells_in(CellState::Hit)
            .filter(|c| !self.unresolved.contains(c))
            .collect();
        if !merged.is_empty() {
            merged.append(&mut self.unresolved);
            self.unresolved = merged;
        }
    }

    fn target(&self, view: &BoardView) -> Option<Coordinate> {
        let size = view.size();
        let is_hit = |c: Option<Coordinate>| c.and_then(|c| view.get(c)) == Some(CellState::Hit);

        for &latest in self.unresolved.iter().rev() {
            // A neighbouring hit fixes the line: keep going the way we came,
            // then try the far end.
            let line = Direction::ALL
                .into_iter()
                .find(|dir| is_hit(latest.step(dir.reverse(), size)));
            if let Some(dir) = line {
                for way in [dir, dir.reverse()] {
                    let mut cell = latest.step(way, size);
                    while is_hit(cell) {
                        cell = cell.and_then(|c| c.step(way, size));
                    }
                    if let Some(c) = cell.filter(|c| view.is_open(*c)) {
                        return Some(c);
                    }
                }
            }
            if let Some(c) = latest.neighbors(size).find(|c| view.is_open(*c)) {
                return Some(c);
            }
        }
        None
    }

    fn hunt(
        &self,
        rng: &mut SmallRng,
        view: &BoardView,
        remaining: &[usize],
    ) -> Option<Coordinate> {
        let size = view.size();
        let open: Vec<Coordinate> = (0..size * size)
            .map(|i| Coordinate::from_index(i, size))
            .filter(|c| view.is_open(*c))
            .collect();
        if open.is_empty() {
            return None;
        }

        let smallest = remaining
            .iter()
            .copied()
            .filter(|&l| l > 0)
            .min()
            .unwrap_or(1);
        let lattice: Vec<Coordinate> = open
            .iter()
            .copied()
            .filter(|c| (c.row() + c.col()) % smallest == 0)
            .collect();
        let candidates = if lattice.is_empty() { open } else { lattice };

        let density = placement_density(view, remaining);
        let best = candidates
            .iter()
            .map(|c| density[c.index(size)])
            .max()
            .unwrap_or(0);
        let tied: Vec<Coordinate> = candidates
            .into_iter()
            .filter(|c| density[c.index(size)] == best)
            .collect();
        Some(tied[rng.random_range(0..tied.len())])
    }
}

impl Player for AiPlayer {
    fn place_fleet(
        &mut self,
        rng: &mut SmallRng,
        board: &mut Board,
        fleet: &[ShipKind],
    ) -> Result<(), GameError> {
        for &kind in fleet {
            let (anchor, orientation) = board.random_placement(rng, kind)?;
            board.place_ship(kind, anchor, orientation)?;
        }
        Ok(())
    }

    fn select_target(
        &mut self,
        rng: &mut SmallRng,
        view: &BoardView,
        remaining: &[usize],
    ) -> Option<Coordinate> {
        self.refresh(view);
        if let Some(&c) = self.contacts.first() {
            log::trace!("firing at sonar contact {}", c);
            return Some(c);
        }
        match self.target(view) {
            Some(c) => {
                log::trace!("target mode picks {}", c);
                Some(c)
            }
            None => self.hunt(rng, view, remaining),
        }
    }

    fn handle_shot_result(&mut self, coord: Coordinate, result: ShotResult) {
        if result == ShotResult::Hit && !self.unresolved.contains(&coord) {
            self.unresolved.push(coord);
        }
    }
}
