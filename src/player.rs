use rand::rngs::SmallRng;

use crate::{
    board::{Board, BoardView},
    common::{GameError, ShotResult},
    coordinate::Coordinate,
    ship::ShipKind,
};

/// Interface implemented by automated players.
pub trait Player {
    /// Place every ship of `fleet` onto the provided board.
    fn place_fleet(
        &mut self,
        rng: &mut SmallRng,
        board: &mut Board,
        fleet: &[ShipKind],
    ) -> Result<(), GameError>;

    /// Choose the next target given the visible enemy board and the lengths
    /// of enemy ships still afloat. `None` when no cell is left to shoot.
    fn select_target(
        &mut self,
        rng: &mut SmallRng,
        view: &BoardView,
        remaining: &[usize],
    ) -> Option<Coordinate>;

    /// Inform the player of the result of its last shot.
    fn handle_shot_result(&mut self, _coord: Coordinate, _result: ShotResult) {}
}
