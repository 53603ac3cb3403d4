use broadside::{
    Actor, CellState, Coordinate, CpuTurn, GameConfig, GameError, GameSession, Orientation, Phase,
    PlacementViolation, ShipKind, ShotResult, SkillKind, SkillParams, SkillResult, SkillSpec,
};

fn c(row: usize, col: usize) -> Coordinate {
    Coordinate::new(row, col)
}

/// One destroyer each on a small board, no skills.
fn duel_config() -> GameConfig {
    GameConfig {
        board_size: 4,
        fleet: vec![ShipKind::Destroyer],
        skills: Vec::new(),
        skill_points: 0,
        ..GameConfig::default()
    }
}

fn started(config: GameConfig, seed: u64) -> GameSession {
    let mut session = GameSession::new_game(config, seed).unwrap();
    session.place_player_fleet_randomly().unwrap();
    session.start().unwrap();
    session
}

fn cpu_cells(session: &GameSession) -> Vec<Coordinate> {
    session.board(Actor::Cpu).ships()[0].positions().to_vec()
}

/// Some cell of the CPU board nobody has shot at yet, away from ships.
fn open_water(session: &GameSession) -> Coordinate {
    let board = session.board(Actor::Cpu);
    (0..board.size() * board.size())
        .map(|i| Coordinate::from_index(i, board.size()))
        .find(|c| board.cell(*c).unwrap() == CellState::Empty)
        .unwrap()
}

#[test]
fn new_game_sets_up_cpu_side() {
    let session = GameSession::new_game(GameConfig::default(), 7).unwrap();
    assert_eq!(session.phase(), Phase::Setup);
    assert_eq!(session.turns_elapsed(), 0);
    assert_eq!(session.seed(), 7);
    assert!(session.unplaced(Actor::Cpu).is_empty());
    assert_eq!(session.unplaced(Actor::Player).len(), 5);
    assert_eq!(session.board(Actor::Cpu).occupied().count_ones(), 17);

    // Greedy in catalogue order with five points: sonar, then repair.
    let cpu = session.skills(Actor::Cpu);
    assert_eq!(cpu.uses(SkillKind::Sonar), Some(1));
    assert_eq!(cpu.uses(SkillKind::Barrage), None);
    assert_eq!(cpu.uses(SkillKind::Repair), Some(1));
    assert_eq!(cpu.points(), 0);
    assert_eq!(session.skills(Actor::Player).points(), 5);
}

#[test]
fn same_seed_places_same_cpu_fleet() {
    let a = GameSession::new_game(GameConfig::default(), 99).unwrap();
    let b = GameSession::new_game(GameConfig::default(), 99).unwrap();
    assert_eq!(a.board(Actor::Cpu), b.board(Actor::Cpu));
}

#[test]
fn invalid_config_is_rejected() {
    let config = GameConfig::with_board_size(0);
    assert!(matches!(
        GameSession::new_game(config, 1),
        Err(GameError::InvalidConfig { .. })
    ));
    let config = GameConfig {
        fleet: Vec::new(),
        ..GameConfig::default()
    };
    assert!(matches!(
        GameSession::new_game(config, 1),
        Err(GameError::InvalidConfig { .. })
    ));
}

#[test]
fn setup_rules() {
    let mut session = GameSession::new_game(duel_config(), 3).unwrap();
    assert_eq!(
        session.fire(Actor::Player, c(0, 0)).unwrap_err(),
        GameError::WrongPhase {
            expected: Phase::InProgress,
            actual: Phase::Setup
        }
    );
    assert_eq!(
        session.start().unwrap_err(),
        GameError::FleetIncomplete {
            actor: Actor::Player,
            placed: 0,
            required: 1
        }
    );

    session
        .place_ship(ShipKind::Destroyer, c(0, 0), Orientation::Horizontal)
        .unwrap();
    let err = session
        .place_ship(ShipKind::Destroyer, c(2, 0), Orientation::Horizontal)
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::InvalidPlacement {
            violation: PlacementViolation::NotInFleet,
            ..
        }
    ));
    let err = session
        .place_ship(ShipKind::Cruiser, c(2, 0), Orientation::Horizontal)
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::InvalidPlacement {
            violation: PlacementViolation::NotInFleet,
            ..
        }
    ));

    session.start().unwrap();
    assert_eq!(session.phase(), Phase::InProgress);
    assert!(session.is_player_turn());
    assert_eq!(
        session
            .place_ship(ShipKind::Destroyer, c(3, 0), Orientation::Horizontal)
            .unwrap_err(),
        GameError::WrongPhase {
            expected: Phase::Setup,
            actual: Phase::InProgress
        }
    );
}

#[test]
fn random_player_fleet_fills_what_is_left() {
    let mut session = GameSession::new_game(GameConfig::default(), 11).unwrap();
    session
        .place_ship(ShipKind::Carrier, c(0, 0), Orientation::Horizontal)
        .unwrap();
    session.place_player_fleet_randomly().unwrap();
    assert!(session.unplaced(Actor::Player).is_empty());
    let kinds: Vec<_> = session.board(Actor::Player).ship_kinds().collect();
    assert_eq!(kinds.len(), 5);
    assert_eq!(kinds[0], ShipKind::Carrier);
    assert_eq!(session.board(Actor::Player).occupied().count_ones(), 17);
}

#[test]
fn cpu_may_move_first() {
    let config = GameConfig {
        player_first: false,
        ..duel_config()
    };
    let mut session = started(config, 5);
    assert!(!session.is_player_turn());
    assert_eq!(
        session.fire(Actor::Player, c(0, 0)).unwrap_err(),
        GameError::NotYourTurn {
            expected: Actor::Cpu,
            actual: Actor::Player
        }
    );
    session.play_cpu_turn().unwrap();
    assert!(session.is_player_turn());
}

#[test]
fn two_cell_ship_scenario() {
    let mut session = GameSession::new_game(duel_config(), 21).unwrap();
    session
        .place_ship(ShipKind::Destroyer, c(3, 2), Orientation::Horizontal)
        .unwrap();
    session.start().unwrap();
    let targets = cpu_cells(&session);

    assert_eq!(session.fire(Actor::Player, targets[0]).unwrap(), ShotResult::Hit);
    assert!(!session.is_player_turn());
    assert_eq!(session.turns_elapsed(), 1);

    let before_turns = session.turns_elapsed();
    assert_eq!(
        session.fire(Actor::Player, targets[1]).unwrap_err(),
        GameError::NotYourTurn {
            expected: Actor::Cpu,
            actual: Actor::Player
        }
    );
    assert_eq!(session.turns_elapsed(), before_turns);

    let turn = session.play_cpu_turn().unwrap();
    assert!(matches!(turn, CpuTurn::Fired { .. }));
    assert!(session.is_player_turn());

    assert_eq!(
        session.fire(Actor::Player, targets[1]).unwrap(),
        ShotResult::FleetDestroyed(ShipKind::Destroyer)
    );
    assert_eq!(session.phase(), Phase::PlayerWon);
    assert_eq!(session.winner(), Some(Actor::Player));
    assert_eq!(session.turns_elapsed(), 3);
    assert!(session.is_player_turn());
    assert_eq!(session.sunk_ships(Actor::Cpu), vec![ShipKind::Destroyer]);

    assert_eq!(
        session.fire(Actor::Player, c(0, 0)).unwrap_err(),
        GameError::GameOver {
            phase: Phase::PlayerWon
        }
    );
    assert_eq!(
        session.play_cpu_turn().unwrap_err(),
        GameError::GameOver {
            phase: Phase::PlayerWon
        }
    );
    assert_eq!(
        session
            .acquire_skill(Actor::Player, SkillKind::Sonar)
            .unwrap_err(),
        GameError::GameOver {
            phase: Phase::PlayerWon
        }
    );
}

#[test]
fn repeated_shot_keeps_the_turn() {
    let mut session = started(duel_config(), 8);
    let water = open_water(&session);
    session.fire(Actor::Player, water).unwrap();
    session.play_cpu_turn().unwrap();
    let turns = session.turns_elapsed();
    assert_eq!(
        session.fire(Actor::Player, water).unwrap_err(),
        GameError::AlreadyTargeted { coordinate: water }
    );
    assert!(session.is_player_turn());
    assert_eq!(session.turns_elapsed(), turns);
    assert!(matches!(
        session.fire(Actor::Player, c(9, 9)),
        Err(GameError::OutOfBounds { .. })
    ));
}

#[test]
fn acquiring_does_not_use_a_turn() {
    let mut session = started(GameConfig::default(), 4);
    assert_eq!(session.acquire_skill(Actor::Player, SkillKind::Barrage).unwrap(), 1);
    assert!(session.is_player_turn());
    assert_eq!(session.turns_elapsed(), 0);

    let before = session.skills(Actor::Player).clone();
    assert_eq!(
        session
            .acquire_skill(Actor::Player, SkillKind::Sonar)
            .unwrap_err(),
        GameError::InsufficientPoints {
            skill: SkillKind::Sonar,
            cost: 3,
            available: 1
        }
    );
    assert_eq!(session.skills(Actor::Player), &before);
}

#[test]
fn skill_must_be_owned_and_have_uses() {
    let mut session = started(GameConfig::default(), 12);
    assert_eq!(
        session
            .use_skill(Actor::Player, SkillKind::Sonar, SkillParams::at(c(4, 4)))
            .unwrap_err(),
        GameError::SkillNotOwned {
            skill: SkillKind::Sonar
        }
    );
    assert!(session.is_player_turn());
}

#[test]
fn sonar_reveals_contacts_and_spends_the_turn() {
    let mut session = started(GameConfig::default(), 13);
    session.acquire_skill(Actor::Player, SkillKind::Sonar).unwrap();
    let ship_cell = session.board(Actor::Cpu).ships()[0].positions()[0];

    let err = session
        .use_skill(
            Actor::Player,
            SkillKind::Sonar,
            SkillParams::new(vec![ship_cell, c(0, 0)]),
        )
        .unwrap_err();
    assert!(matches!(err, GameError::InvalidSkillTarget { .. }));
    assert_eq!(session.skills(Actor::Player).uses(SkillKind::Sonar), Some(1));

    let result = session
        .use_skill(Actor::Player, SkillKind::Sonar, SkillParams::at(ship_cell))
        .unwrap();
    match result {
        SkillResult::Sonar { center, contacts } => {
            assert_eq!(center, ship_cell);
            assert!(contacts.contains(&ship_cell));
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(session.skills(Actor::Player).uses(SkillKind::Sonar), Some(0));
    assert!(!session.is_player_turn());
    assert_eq!(session.turns_elapsed(), 1);
    // The sweep does not touch the board.
    assert_eq!(
        session.board(Actor::Cpu).cell(ship_cell).unwrap(),
        CellState::Ship
    );

    session.play_cpu_turn().unwrap();
    assert_eq!(
        session
            .use_skill(Actor::Player, SkillKind::Sonar, SkillParams::at(ship_cell))
            .unwrap_err(),
        GameError::NoUsesRemaining {
            skill: SkillKind::Sonar
        }
    );
}

#[test]
fn barrage_validates_every_target_first() {
    let mut session = started(GameConfig::default(), 14);
    session.acquire_skill(Actor::Player, SkillKind::Barrage).unwrap();
    let water = open_water(&session);
    let before = session.board(Actor::Cpu).clone();

    let dup = SkillParams::new(vec![c(0, 0), c(0, 0)]);
    assert!(matches!(
        session.use_skill(Actor::Player, SkillKind::Barrage, dup),
        Err(GameError::InvalidSkillTarget { .. })
    ));
    let too_many = SkillParams::new(vec![c(0, 0), c(0, 1), c(0, 2), c(0, 3)]);
    assert!(matches!(
        session.use_skill(Actor::Player, SkillKind::Barrage, too_many),
        Err(GameError::InvalidSkillTarget { .. })
    ));
    let outside = SkillParams::new(vec![c(0, 0), c(10, 0)]);
    assert!(matches!(
        session.use_skill(Actor::Player, SkillKind::Barrage, outside),
        Err(GameError::OutOfBounds { .. })
    ));
    assert_eq!(session.board(Actor::Cpu), &before);
    assert_eq!(session.skills(Actor::Player).uses(SkillKind::Barrage), Some(1));
    assert!(session.is_player_turn());

    let result = session
        .use_skill(Actor::Player, SkillKind::Barrage, SkillParams::at(water))
        .unwrap();
    assert_eq!(
        result,
        SkillResult::Barrage {
            shots: vec![(water, ShotResult::Miss)]
        }
    );
    assert!(!session.is_player_turn());
}

#[test]
fn barrage_rejects_targeted_cells() {
    let mut session = started(GameConfig::default(), 15);
    session.acquire_skill(Actor::Player, SkillKind::Barrage).unwrap();
    let water = open_water(&session);
    session.fire(Actor::Player, water).unwrap();
    session.play_cpu_turn().unwrap();
    let other = open_water(&session);
    assert_eq!(
        session
            .use_skill(
                Actor::Player,
                SkillKind::Barrage,
                SkillParams::new(vec![other, water])
            )
            .unwrap_err(),
        GameError::AlreadyTargeted { coordinate: water }
    );
    assert_eq!(
        session.board(Actor::Cpu).cell(other).unwrap(),
        CellState::Empty
    );
}

#[test]
fn barrage_can_end_the_game() {
    let config = GameConfig {
        skills: vec![SkillSpec::standard(SkillKind::Barrage)],
        skill_points: 4,
        ..duel_config()
    };
    let mut session = GameSession::new_game(config, 16).unwrap();
    session.place_player_fleet_randomly().unwrap();
    session.acquire_skill(Actor::Player, SkillKind::Barrage).unwrap();
    session.start().unwrap();

    let mut targets = cpu_cells(&session);
    targets.push(open_water(&session));
    let result = session
        .use_skill(Actor::Player, SkillKind::Barrage, SkillParams::new(targets.clone()))
        .unwrap();
    assert!(result.destroyed_fleet());
    match result {
        SkillResult::Barrage { shots } => {
            // The third shot is never fired.
            assert_eq!(shots.len(), 2);
            assert_eq!(shots[0], (targets[0], ShotResult::Hit));
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(session.phase(), Phase::PlayerWon);
    assert_eq!(
        session.board(Actor::Cpu).cell(targets[2]).unwrap(),
        CellState::Empty
    );
}

#[test]
fn repair_needs_a_damaged_ship() {
    let mut session = started(GameConfig::default(), 17);
    session.acquire_skill(Actor::Player, SkillKind::Repair).unwrap();
    let own = session.board(Actor::Player).ships()[0].positions()[0];
    assert!(matches!(
        session.use_skill(Actor::Player, SkillKind::Repair, SkillParams::at(own)),
        Err(GameError::InvalidSkillTarget {
            skill: SkillKind::Repair,
            ..
        })
    ));
    assert_eq!(session.skills(Actor::Player).uses(SkillKind::Repair), Some(1));
    assert!(session.is_player_turn());
    assert_eq!(session.turns_elapsed(), 0);
}

#[test]
fn cpu_repairs_before_firing() {
    let config = GameConfig {
        skills: vec![SkillSpec::standard(SkillKind::Repair)],
        skill_points: 2,
        ..GameConfig::default()
    };
    let mut session = started(config, 18);
    let target = session.board(Actor::Cpu).ships()[0].positions()[0];
    assert_eq!(session.fire(Actor::Player, target).unwrap(), ShotResult::Hit);

    let turn = session.play_cpu_turn().unwrap();
    assert_eq!(
        turn,
        CpuTurn::Skill {
            skill: SkillKind::Repair,
            result: SkillResult::Repair {
                target,
                kind: session.board(Actor::Cpu).ships()[0].kind()
            }
        }
    );
    assert_eq!(session.board(Actor::Cpu).cell(target).unwrap(), CellState::Ship);
    assert_eq!(session.skills(Actor::Cpu).uses(SkillKind::Repair), Some(0));
    assert!(session.is_player_turn());
}

#[test]
fn cpu_target_only_on_its_turn() {
    let mut session = started(GameConfig::default(), 19);
    assert_eq!(
        session.choose_cpu_target().unwrap_err(),
        GameError::NotYourTurn {
            expected: Actor::Player,
            actual: Actor::Cpu
        }
    );
    let water = open_water(&session);
    session.fire(Actor::Player, water).unwrap();
    let target = session.choose_cpu_target().unwrap();
    assert!(target.in_bounds(10));
    assert!(!session
        .board(Actor::Player)
        .cell(target)
        .unwrap()
        .is_targeted());
}
