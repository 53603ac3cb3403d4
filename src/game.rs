//! The game session: both sides, the phase machine and turn alternation.
//!
//! Every operation validates completely before it mutates anything, so a
//! rejected call leaves the session exactly as it was.

use alloc::vec::Vec;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::{
    ai::AiPlayer,
    board::{Board, BoardView, Reveal},
    common::{GameError, PlacementViolation, ShotResult},
    config::GameConfig,
    coordinate::Coordinate,
    player::Player,
    ship::{Orientation, ShipKind},
    skill::{SkillKind, SkillParams, SkillResult, SkillSet, BARRAGE_MAX_SHOTS},
};

/// Top-level stage of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Phase {
    Setup,
    InProgress,
    PlayerWon,
    CpuWon,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::PlayerWon | Phase::CpuWon)
    }
}

/// Which side acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Actor {
    Player,
    Cpu,
}

impl Actor {
    pub fn opponent(self) -> Self {
        match self {
            Actor::Player => Actor::Cpu,
            Actor::Cpu => Actor::Player,
        }
    }

    /// Terminal phase reached when this actor destroys the opposing fleet.
    pub fn victory(self) -> Phase {
        match self {
            Actor::Player => Phase::PlayerWon,
            Actor::Cpu => Phase::CpuWon,
        }
    }
}

/// What the computer did with its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
#[cfg_attr(feature = "std", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CpuTurn {
    Fired {
        target: Coordinate,
        result: ShotResult,
    },
    Skill {
        skill: SkillKind,
        result: SkillResult,
    },
}

#[derive(Debug, Clone)]
struct Side {
    board: Board,
    skills: SkillSet,
}

/// A single game between the player and the computer.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    seed: u64,
    rng: SmallRng,
    phase: Phase,
    player_turn: bool,
    turns_elapsed: u32,
    player: Side,
    cpu: Side,
    ai: AiPlayer,
}

impl GameSession {
    /// Start a game in `Setup` with a generator seeded from `seed`. The
    /// computer's fleet is placed and its skills bought straight away.
    pub fn new_game(config: GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(config, seed, SmallRng::seed_from_u64(seed))
    }

    /// Like [`GameSession::new_game`] with a caller-supplied generator.
    /// `seed` is only recorded so saves can re-seed on load.
    pub fn with_rng(config: GameConfig, seed: u64, mut rng: SmallRng) -> Result<Self, GameError> {
        config.validate()?;
        let player = Side {
            board: Board::new(config.board_size, config.adjacency),
            skills: SkillSet::new(config.skill_points, &config.skills),
        };
        let mut cpu = player.clone();
        let mut ai = AiPlayer::new();
        ai.place_fleet(&mut rng, &mut cpu.board, &config.fleet)?;
        // Greedy, in catalogue order.
        for spec in &config.skills {
            if spec.cost <= cpu.skills.points() {
                cpu.skills.acquire(spec.skill)?;
            }
        }
        log::info!(
            "new game: {0}x{0} board, {1} ships, seed {2}",
            config.board_size,
            config.fleet.len(),
            seed
        );
        Ok(Self {
            config,
            seed,
            rng,
            phase: Phase::Setup,
            player_turn: true,
            turns_elapsed: 0,
            player,
            cpu,
            ai,
        })
    }

    /// Reassemble a session from validated parts.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        config: GameConfig,
        seed: u64,
        phase: Phase,
        player_turn: bool,
        turns_elapsed: u32,
        player: (Board, SkillSet),
        cpu: (Board, SkillSet),
    ) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed.wrapping_add(u64::from(turns_elapsed))),
            config,
            seed,
            phase,
            player_turn,
            turns_elapsed,
            player: Side {
                board: player.0,
                skills: player.1,
            },
            cpu: Side {
                board: cpu.0,
                skills: cpu.1,
            },
            ai: AiPlayer::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_player_turn(&self) -> bool {
        self.player_turn
    }

    pub fn turns_elapsed(&self) -> u32 {
        self.turns_elapsed
    }

    /// The actor whose turn it is.
    pub fn current_actor(&self) -> Actor {
        if self.player_turn {
            Actor::Player
        } else {
            Actor::Cpu
        }
    }

    pub fn winner(&self) -> Option<Actor> {
        match self.phase {
            Phase::PlayerWon => Some(Actor::Player),
            Phase::CpuWon => Some(Actor::Cpu),
            _ => None,
        }
    }

    pub fn board(&self, actor: Actor) -> &Board {
        &self.side(actor).board
    }

    pub fn skills(&self, actor: Actor) -> &SkillSet {
        &self.side(actor).skills
    }

    /// Kinds of `actor`'s ships that have been sunk.
    pub fn sunk_ships(&self, actor: Actor) -> Vec<ShipKind> {
        self.side(actor).board.sunk_ship_kinds()
    }

    /// The computer's board as the player may see it.
    pub fn enemy_view(&self) -> BoardView {
        self.cpu.board.view(Reveal::Hidden)
    }

    /// Ships of `actor`'s fleet not yet on the board.
    pub fn unplaced(&self, actor: Actor) -> Vec<ShipKind> {
        let mut left = self.config.fleet.clone();
        for kind in self.side(actor).board.ship_kinds() {
            if let Some(i) = left.iter().position(|k| *k == kind) {
                left.remove(i);
            }
        }
        left
    }

    /// Place one of the player's ships.
    pub fn place_ship(
        &mut self,
        kind: ShipKind,
        anchor: Coordinate,
        orientation: Orientation,
    ) -> Result<(), GameError> {
        self.require_setup()?;
        if !self.unplaced(Actor::Player).contains(&kind) {
            return Err(GameError::InvalidPlacement {
                kind,
                anchor,
                orientation,
                violation: PlacementViolation::NotInFleet,
            });
        }
        self.player.board.place_ship(kind, anchor, orientation)
    }

    /// Place every remaining ship of the player's fleet at random.
    pub fn place_player_fleet_randomly(&mut self) -> Result<(), GameError> {
        self.require_setup()?;
        let unplaced = self.unplaced(Actor::Player);
        let mut board = self.player.board.clone();
        let mut rng = self.rng.clone();
        AiPlayer::new().place_fleet(&mut rng, &mut board, &unplaced)?;
        self.player.board = board;
        self.rng = rng;
        Ok(())
    }

    /// Buy `skill` for `actor`. Does not use up a turn.
    pub fn acquire_skill(&mut self, actor: Actor, skill: SkillKind) -> Result<u32, GameError> {
        if self.phase.is_terminal() {
            return Err(GameError::GameOver { phase: self.phase });
        }
        let uses = self.side_mut(actor).skills.acquire(skill)?;
        log::debug!("{:?} acquired {} ({} uses)", actor, skill, uses);
        Ok(uses)
    }

    /// Leave `Setup` once both fleets are complete.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.require_setup()?;
        for actor in [Actor::Player, Actor::Cpu] {
            let missing = self.unplaced(actor).len();
            if missing > 0 {
                let required = self.config.fleet.len();
                return Err(GameError::FleetIncomplete {
                    actor,
                    placed: required - missing,
                    required,
                });
            }
        }
        self.phase = Phase::InProgress;
        self.player_turn = self.config.player_first;
        log::info!("battle started, {:?} moves first", self.current_actor());
        Ok(())
    }

    /// `actor` fires at `coord` on the opposing board.
    pub fn fire(&mut self, actor: Actor, coord: Coordinate) -> Result<ShotResult, GameError> {
        self.require_turn(actor)?;
        let result = self.side_mut(actor.opponent()).board.receive_shot(coord)?;
        if actor == Actor::Cpu {
            self.ai.handle_shot_result(coord, result);
        }
        log::debug!("{:?} fires at {}: {:?}", actor, coord, result);
        self.finish_action(actor);
        Ok(result)
    }

    /// `actor` spends one use of `skill`.
    pub fn use_skill(
        &mut self,
        actor: Actor,
        skill: SkillKind,
        params: SkillParams,
    ) -> Result<SkillResult, GameError> {
        self.require_turn(actor)?;
        self.side(actor).skills.check(skill)?;

        let result = match skill {
            SkillKind::Sonar => {
                let center = params.single(skill)?;
                let contacts = self.side(actor.opponent()).board.sonar(center)?;
                SkillResult::Sonar { center, contacts }
            }
            SkillKind::Barrage => {
                let targets = params.targets();
                self.check_barrage(actor, targets)?;
                let mut shots = Vec::with_capacity(targets.len());
                for &target in targets {
                    let result = self.side_mut(actor.opponent()).board.receive_shot(target)?;
                    if actor == Actor::Cpu {
                        self.ai.handle_shot_result(target, result);
                    }
                    shots.push((target, result));
                    if matches!(result, ShotResult::FleetDestroyed(_)) {
                        break;
                    }
                }
                SkillResult::Barrage { shots }
            }
            SkillKind::Repair => {
                let target = params.single(skill)?;
                let kind = self.side_mut(actor).board.repair(target)?;
                SkillResult::Repair { target, kind }
            }
        };
        if let SkillResult::Sonar { contacts, .. } = &result {
            if actor == Actor::Cpu {
                self.ai.handle_contacts(contacts);
            }
        }
        let left = self.side_mut(actor).skills.consume(skill)?;
        log::debug!("{:?} used {} ({} left): {:?}", actor, skill, left, result);
        self.finish_action(actor);
        Ok(result)
    }

    /// The computer's next shot, chosen from what it can see of the player's
    /// board. Only available on the computer's turn.
    pub fn choose_cpu_target(&mut self) -> Result<Coordinate, GameError> {
        self.require_turn(Actor::Cpu)?;
        let view = self.player.board.view(Reveal::Hidden);
        let remaining = self.player.board.remaining_ship_lengths();
        self.ai
            .select_target(&mut self.rng, &view, &remaining)
            .ok_or(GameError::GameOver { phase: self.phase })
    }

    /// Play the computer's turn: repair a damaged ship if it can, sweep with
    /// sonar while it has nothing to chase, otherwise fire.
    pub fn play_cpu_turn(&mut self) -> Result<CpuTurn, GameError> {
        self.require_turn(Actor::Cpu)?;

        if self.cpu.skills.can_use(SkillKind::Repair) {
            if let Some(&cell) = self.cpu.board.repairable_cells().first() {
                let result = self.use_skill(Actor::Cpu, SkillKind::Repair, SkillParams::at(cell))?;
                return Ok(CpuTurn::Skill {
                    skill: SkillKind::Repair,
                    result,
                });
            }
        }

        let target = self.choose_cpu_target()?;
        if self.cpu.skills.can_use(SkillKind::Sonar) && !self.ai.is_targeting() {
            let result = self.use_skill(Actor::Cpu, SkillKind::Sonar, SkillParams::at(target))?;
            return Ok(CpuTurn::Skill {
                skill: SkillKind::Sonar,
                result,
            });
        }

        let result = self.fire(Actor::Cpu, target)?;
        Ok(CpuTurn::Fired { target, result })
    }

    fn check_barrage(&self, actor: Actor, targets: &[Coordinate]) -> Result<(), GameError> {
        if targets.is_empty() || targets.len() > BARRAGE_MAX_SHOTS {
            return Err(GameError::InvalidSkillTarget {
                skill: SkillKind::Barrage,
                reason: "a barrage fires between one and three shots",
            });
        }
        let board = &self.side(actor.opponent()).board;
        for (i, &target) in targets.iter().enumerate() {
            if targets[..i].contains(&target) {
                return Err(GameError::InvalidSkillTarget {
                    skill: SkillKind::Barrage,
                    reason: "barrage targets must be distinct",
                });
            }
            if board.cell(target)?.is_targeted() {
                return Err(GameError::AlreadyTargeted { coordinate: target });
            }
        }
        Ok(())
    }

    fn finish_action(&mut self, actor: Actor) {
        self.turns_elapsed = self.turns_elapsed.saturating_add(1);
        if self.side(actor.opponent()).board.is_fleet_destroyed() {
            self.phase = actor.victory();
            log::info!(
                "{:?} destroyed the enemy fleet after {} turns",
                actor,
                self.turns_elapsed
            );
        } else {
            self.player_turn = !self.player_turn;
        }
    }

    fn require_setup(&self) -> Result<(), GameError> {
        match self.phase {
            Phase::Setup => Ok(()),
            phase if phase.is_terminal() => Err(GameError::GameOver { phase }),
            actual => Err(GameError::WrongPhase {
                expected: Phase::Setup,
                actual,
            }),
        }
    }

    fn require_turn(&self, actor: Actor) -> Result<(), GameError> {
        match self.phase {
            Phase::InProgress => {
                let expected = self.current_actor();
                if expected == actor {
                    Ok(())
                } else {
                    Err(GameError::NotYourTurn {
                        expected,
                        actual: actor,
                    })
                }
            }
            Phase::Setup => Err(GameError::WrongPhase {
                expected: Phase::InProgress,
                actual: Phase::Setup,
            }),
            phase => Err(GameError::GameOver { phase }),
        }
    }

    fn side(&self, actor: Actor) -> &Side {
        match actor {
            Actor::Player => &self.player,
            Actor::Cpu => &self.cpu,
        }
    }

    fn side_mut(&mut self, actor: Actor) -> &mut Side {
        match actor {
            Actor::Player => &mut self.player,
            Actor::Cpu => &mut self.cpu,
        }
    }
}
