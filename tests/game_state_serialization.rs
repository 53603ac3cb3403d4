use broadside::persistence::{decode, encode, load, to_document, SaveFormat};
use broadside::{Actor, Coordinate, GameConfig, GameSession, Phase};
use chrono::DateTime;
use proptest::prelude::*;

/// Play at most `turns` turns. The player sweeps the board with a fixed
/// stride; the computer plays its own turns.
fn autoplay(seed: u64, turns: u32) -> GameSession {
    let mut session = GameSession::new_game(GameConfig::default(), seed).unwrap();
    session.place_player_fleet_randomly().unwrap();
    session.start().unwrap();
    let offset = (seed % 100) as usize;
    while session.phase() == Phase::InProgress && session.turns_elapsed() < turns {
        if session.is_player_turn() {
            let target = (0..100)
                .map(|i| Coordinate::from_index((i * 37 + offset) % 100, 10))
                .find(|c| !session.board(Actor::Cpu).cell(*c).unwrap().is_targeted())
                .unwrap();
            session.fire(Actor::Player, target).unwrap();
        } else {
            session.play_cpu_turn().unwrap();
        }
    }
    session
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn save_load_round_trip(seed in any::<u64>(), turns in 0u32..120, binary in any::<bool>()) {
        let stamp = DateTime::from_timestamp(1_650_000_000, 0).unwrap();
        let session = autoplay(seed, turns);
        let doc = to_document(&session, stamp);
        let format = if binary { SaveFormat::Binary } else { SaveFormat::Json };
        let bytes = encode(&doc, format).unwrap();
        let decoded = decode(&bytes).unwrap();
        prop_assert_eq!(&decoded, &doc);
        let restored = load(decoded).unwrap();
        prop_assert_eq!(to_document(&restored, stamp), doc);
    }
}
