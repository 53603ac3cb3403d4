//! Versioned save documents.
//!
//! A session is written as a [`SaveDocument`], encoded either as pretty JSON
//! or compactly with bincode. Loading checks the version tag before anything
//! else and then rebuilds the session, rejecting any document whose parts
//! disagree with each other.

#![cfg(feature = "std")]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    board::{Board, BoardView, CellState, Reveal},
    common::GameError,
    config::{AdjacencyRule, GameConfig},
    coordinate::Coordinate,
    game::{Actor, GameSession, Phase},
    ship::{Ship, ShipKind},
    skill::{SkillKind, SkillSet, SkillSpec},
};

/// Version tag written into every document.
pub const SAVE_VERSION: &str = "1.0";

const SUPPORTED: (u32, u32) = (1, 0);

/// On-disk encoding of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Json,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDoc {
    pub size: usize,
    pub cell_states: Vec<Vec<CellState>>,
}

impl From<BoardView> for BoardDoc {
    fn from(view: BoardView) -> Self {
        Self {
            size: view.size(),
            cell_states: view.rows().map(<[CellState]>::to_vec).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipDoc {
    #[serde(rename = "type")]
    pub kind: ShipKind,
    pub impacts_received: usize,
    pub positions: Vec<Coordinate>,
    pub sunk: bool,
}

impl From<&Ship> for ShipDoc {
    fn from(ship: &Ship) -> Self {
        Self {
            kind: ship.kind(),
            impacts_received: ship.impacts(),
            positions: ship.positions().to_vec(),
            sunk: ship.is_sunk(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsDoc {
    pub skill_points: u32,
    /// Catalogue: skill to cost.
    pub available: BTreeMap<SkillKind, u32>,
    pub uses_remaining: BTreeMap<SkillKind, u32>,
}

impl From<&SkillSet> for SkillsDoc {
    fn from(skills: &SkillSet) -> Self {
        Self {
            skill_points: skills.points(),
            available: skills.catalogue().map(|s| (s.skill, s.cost)).collect(),
            uses_remaining: skills.owned().collect(),
        }
    }
}

/// Snapshot of a whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocument {
    pub version: String,
    pub saved_date: DateTime<Utc>,
    pub turns_elapsed: u32,
    pub is_player_turn: bool,
    pub game_state: Phase,
    pub player_board: BoardDoc,
    pub cpu_board: BoardDoc,
    pub player_ships: Vec<ShipDoc>,
    pub cpu_ships: Vec<ShipDoc>,
    pub player_skills: SkillsDoc,
    pub cpu_skills: SkillsDoc,
    pub player_sunken_ships: Vec<ShipKind>,
    pub cpu_sunken_ships: Vec<ShipKind>,
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default)]
    pub rules: Option<GameConfig>,
}

/// What the player is allowed to see: the computer's un-hit ships are
/// exported as empty water.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub turns_elapsed: u32,
    pub is_player_turn: bool,
    pub game_state: Phase,
    pub player_board: BoardDoc,
    pub cpu_board: BoardDoc,
    pub player_ships: Vec<ShipDoc>,
    pub player_skills: SkillsDoc,
    pub player_sunken_ships: Vec<ShipKind>,
    pub cpu_sunken_ships: Vec<ShipKind>,
}

#[derive(Deserialize)]
struct VersionTag {
    version: String,
}

/// Snapshot `session` with an explicit timestamp.
pub fn to_document(session: &GameSession, saved_at: DateTime<Utc>) -> SaveDocument {
    let player = session.board(Actor::Player);
    let cpu = session.board(Actor::Cpu);
    SaveDocument {
        version: SAVE_VERSION.to_owned(),
        saved_date: saved_at,
        turns_elapsed: session.turns_elapsed(),
        is_player_turn: session.is_player_turn(),
        game_state: session.phase(),
        player_board: player.view(Reveal::Full).into(),
        cpu_board: cpu.view(Reveal::Full).into(),
        player_ships: player.ships().iter().map(ShipDoc::from).collect(),
        cpu_ships: cpu.ships().iter().map(ShipDoc::from).collect(),
        player_skills: session.skills(Actor::Player).into(),
        cpu_skills: session.skills(Actor::Cpu).into(),
        player_sunken_ships: session.sunk_ships(Actor::Player),
        cpu_sunken_ships: session.sunk_ships(Actor::Cpu),
        rng_seed: Some(session.seed()),
        rules: Some(session.config().clone()),
    }
}

/// Snapshot `session`, stamped with the current time.
pub fn save(session: &GameSession) -> SaveDocument {
    to_document(session, Utc::now())
}

/// Player-facing snapshot of `session`.
pub fn player_view(session: &GameSession) -> PlayerView {
    let player = session.board(Actor::Player);
    PlayerView {
        turns_elapsed: session.turns_elapsed(),
        is_player_turn: session.is_player_turn(),
        game_state: session.phase(),
        player_board: player.view(Reveal::Full).into(),
        cpu_board: session.enemy_view().into(),
        player_ships: player.ships().iter().map(ShipDoc::from).collect(),
        player_skills: session.skills(Actor::Player).into(),
        player_sunken_ships: session.sunk_ships(Actor::Player),
        cpu_sunken_ships: session.sunk_ships(Actor::Cpu),
    }
}

/// Rebuild a session from `doc`. Nothing is returned unless every part of
/// the document is consistent.
pub fn load(doc: SaveDocument) -> Result<GameSession, GameError> {
    check_version(&doc.version)?;
    restore(doc).inspect_err(|e| log::warn!("rejected save: {}", e))
}

/// Serialize `doc` in `format`.
pub fn encode(doc: &SaveDocument, format: SaveFormat) -> anyhow::Result<Vec<u8>> {
    let bytes = match format {
        SaveFormat::Json => serde_json::to_vec_pretty(doc).context("encoding save as JSON")?,
        SaveFormat::Binary => bincode::serialize(doc).context("encoding save as binary")?,
    };
    Ok(bytes)
}

/// Guess the encoding of `bytes`: JSON documents open with a brace.
pub fn detect_format(bytes: &[u8]) -> SaveFormat {
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => SaveFormat::Json,
        _ => SaveFormat::Binary,
    }
}

/// Decode a document, checking its version tag before the full decode.
pub fn decode(bytes: &[u8]) -> Result<SaveDocument, GameError> {
    match detect_format(bytes) {
        SaveFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(bytes).map_err(corrupt)?;
            let version = value
                .get("version")
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| GameError::CorruptSave {
                    reason: "missing version".to_owned(),
                })?;
            check_version(version)?;
            serde_json::from_value(value).map_err(corrupt)
        }
        SaveFormat::Binary => {
            let tag: VersionTag = bincode::deserialize(bytes).map_err(corrupt)?;
            check_version(&tag.version)?;
            bincode::deserialize(bytes).map_err(corrupt)
        }
    }
}

/// Write `session` to `path`. The document goes to a sibling temporary file
/// first and is renamed into place.
pub fn save_to_path(
    session: &GameSession,
    path: impl AsRef<Path>,
    format: SaveFormat,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let bytes = encode(&save(session), format)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, bytes).with_context(|| format!("writing {}", Path::new(&tmp).display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    log::info!("saved game to {}", path.display());
    Ok(())
}

/// Read and rebuild a session from `path`, in either format.
pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<GameSession> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let doc = decode(&bytes).with_context(|| format!("decoding {}", path.display()))?;
    let session = load(doc).with_context(|| format!("restoring {}", path.display()))?;
    log::info!("loaded game from {}", path.display());
    Ok(session)
}

fn corrupt(e: impl std::fmt::Display) -> GameError {
    GameError::CorruptSave {
        reason: e.to_string(),
    }
}

fn check_version(found: &str) -> Result<(), GameError> {
    let parsed = found
        .split_once('.')
        .and_then(|(major, minor)| Some((major.parse::<u32>().ok()?, minor.parse::<u32>().ok()?)));
    match parsed {
        None => Err(GameError::CorruptSave {
            reason: format!("unreadable version {:?}", found),
        }),
        Some(v) if v == SUPPORTED => Ok(()),
        Some(_) => Err(GameError::UnsupportedVersion {
            found: found.to_owned(),
            supported: SAVE_VERSION,
        }),
    }
}

fn restore(doc: SaveDocument) -> Result<GameSession, GameError> {
    let rules = match doc.rules.clone() {
        Some(rules) => rules,
        None => infer_rules(&doc),
    };
    rules.validate().map_err(|e| GameError::CorruptSave {
        reason: format!("rules: {}", e),
    })?;

    let player_board = restore_board(&rules, &doc.player_board, &doc.player_ships)?;
    let cpu_board = restore_board(&rules, &doc.cpu_board, &doc.cpu_ships)?;
    check_fleet(&rules, &player_board, doc.game_state == Phase::Setup, "player")?;
    check_fleet(&rules, &cpu_board, false, "cpu")?;
    check_sunk_list(&player_board, &doc.player_sunken_ships, "player")?;
    check_sunk_list(&cpu_board, &doc.cpu_sunken_ships, "cpu")?;
    check_phase(&doc, &player_board, &cpu_board)?;
    check_turns(&rules, doc.turns_elapsed)?;

    let player_skills = restore_skills(&rules, &doc.player_skills, "player")?;
    let cpu_skills = restore_skills(&rules, &doc.cpu_skills, "cpu")?;

    Ok(GameSession::restore(
        rules,
        doc.rng_seed.unwrap_or_default(),
        doc.game_state,
        doc.is_player_turn,
        doc.turns_elapsed,
        (player_board, player_skills),
        (cpu_board, cpu_skills),
    ))
}

/// Rules for documents written without them: the board size and fleet as
/// stored, the catalogue with its stored costs and one use per purchase.
fn infer_rules(doc: &SaveDocument) -> GameConfig {
    let fleet = if doc.cpu_ships.is_empty() {
        &doc.player_ships
    } else {
        &doc.cpu_ships
    };
    GameConfig {
        board_size: doc.player_board.size,
        fleet: fleet.iter().map(|s| s.kind).collect(),
        skills: doc
            .player_skills
            .available
            .iter()
            .map(|(&skill, &cost)| SkillSpec {
                skill,
                cost,
                uses: skill.default_uses(),
            })
            .collect(),
        skill_points: GameConfig::default()
            .skill_points
            .max(stored_budget(&doc.player_skills))
            .max(stored_budget(&doc.cpu_skills)),
        adjacency: AdjacencyRule::default(),
        player_first: true,
    }
}

/// Points a side holds plus what its remaining uses cost at the stored
/// prices, one use per purchase.
fn stored_budget(doc: &SkillsDoc) -> u32 {
    let owned = doc
        .uses_remaining
        .iter()
        .map(|(skill, &uses)| {
            doc.available
                .get(skill)
                .map_or(0, |&cost| cost.saturating_mul(uses))
        })
        .fold(0u32, u32::saturating_add);
    doc.skill_points.saturating_add(owned)
}

fn restore_board(rules: &GameConfig, doc: &BoardDoc, ships: &[ShipDoc]) -> Result<Board, GameError> {
    let size = rules.board_size;
    if doc.size != size {
        return Err(GameError::CorruptSave {
            reason: format!("board size {} does not match the rules ({})", doc.size, size),
        });
    }
    if doc.cell_states.len() != size || doc.cell_states.iter().any(|row| row.len() != size) {
        return Err(GameError::CorruptSave {
            reason: format!("cell grid is not {0}x{0}", size),
        });
    }
    let mut fleet = Vec::with_capacity(ships.len());
    for ship in ships {
        if let Some(&outside) = ship.positions.iter().find(|c| !c.in_bounds(size)) {
            return Err(GameError::CorruptSave {
                reason: format!(
                    "{} at {} lies outside the {}x{} board",
                    ship.kind, outside, size, size
                ),
            });
        }
        let rebuilt = Ship::from_positions(
            ship.kind,
            ship.positions.clone(),
            ship.impacts_received,
            size,
        )
        .map_err(|_| GameError::CorruptSave {
            reason: format!("{} cells do not form a straight run", ship.kind),
        })?;
        if rebuilt.is_sunk() != ship.sunk {
            return Err(GameError::CorruptSave {
                reason: format!("{} sunk flag disagrees with its impacts", ship.kind),
            });
        }
        fleet.push(rebuilt);
    }
    let cells = doc.cell_states.iter().flatten().copied().collect();
    Board::restore(size, rules.adjacency, fleet, cells)
}

fn check_fleet(rules: &GameConfig, board: &Board, partial: bool, side: &str) -> Result<(), GameError> {
    let mut left = rules.fleet.clone();
    for kind in board.ship_kinds() {
        match left.iter().position(|k| *k == kind) {
            Some(i) => {
                left.remove(i);
            }
            None => {
                return Err(GameError::CorruptSave {
                    reason: format!("{} fleet has an extra {}", side, kind),
                })
            }
        }
    }
    if !partial && !left.is_empty() {
        return Err(GameError::CorruptSave {
            reason: format!("{} fleet is missing {} ships", side, left.len()),
        });
    }
    Ok(())
}

fn check_sunk_list(board: &Board, listed: &[ShipKind], side: &str) -> Result<(), GameError> {
    let mut expected = board.sunk_ship_kinds();
    let mut listed = listed.to_vec();
    expected.sort();
    listed.sort();
    if expected != listed {
        return Err(GameError::CorruptSave {
            reason: format!("{} sunk list disagrees with the fleet", side),
        });
    }
    Ok(())
}

fn check_phase(doc: &SaveDocument, player: &Board, cpu: &Board) -> Result<(), GameError> {
    let touched = |b: &Board| b.view(Reveal::Full).rows().flatten().any(|c| c.is_targeted());
    let consistent = match doc.game_state {
        Phase::Setup => doc.turns_elapsed == 0 && !touched(player) && !touched(cpu),
        Phase::InProgress => !player.is_fleet_destroyed() && !cpu.is_fleet_destroyed(),
        Phase::PlayerWon => cpu.is_fleet_destroyed() && !player.is_fleet_destroyed(),
        Phase::CpuWon => player.is_fleet_destroyed() && !cpu.is_fleet_destroyed(),
    };
    if consistent {
        Ok(())
    } else {
        Err(GameError::CorruptSave {
            reason: format!("game state {:?} does not match the boards", doc.game_state),
        })
    }
}

/// A side fires at most once per cell, plus once more per repair it
/// suffered, and uses at most one skill per point of budget times the most
/// generous catalogue entry.
fn check_turns(rules: &GameConfig, turns: u32) -> Result<(), GameError> {
    let cells = (rules.board_size as u64).saturating_mul(rules.board_size as u64);
    let most_uses = rules.skills.iter().map(|s| s.uses).max().unwrap_or(0);
    let skill_uses = u64::from(rules.skill_points).saturating_mul(u64::from(most_uses));
    let per_side = cells.saturating_add(skill_uses.saturating_mul(2));
    let limit = per_side.saturating_mul(2);
    if u64::from(turns) > limit {
        return Err(GameError::CorruptSave {
            reason: format!("{} turns cannot fit on a {}x{} board", turns, rules.board_size, rules.board_size),
        });
    }
    Ok(())
}

fn restore_skills(rules: &GameConfig, doc: &SkillsDoc, side: &str) -> Result<SkillSet, GameError> {
    for (skill, cost) in &doc.available {
        if rules.skill_spec(*skill).map(|s| s.cost) != Some(*cost) {
            return Err(GameError::CorruptSave {
                reason: format!("{} catalogue lists {} at {}", side, skill, cost),
            });
        }
    }
    if doc.skill_points > rules.skill_points {
        return Err(GameError::CorruptSave {
            reason: format!("{} has more skill points than the budget", side),
        });
    }
    let set = SkillSet::from_parts(doc.skill_points, &rules.skills, doc.uses_remaining.clone());
    let mut owed: u64 = 0;
    for (skill, uses) in &doc.uses_remaining {
        let cost = set.purchase_cost(*skill, *uses).ok_or_else(|| GameError::CorruptSave {
            reason: format!("{} owns {} which is not on offer", side, skill),
        })?;
        owed = owed.saturating_add(cost);
    }
    let spent = rules.skill_points - doc.skill_points;
    if owed > u64::from(spent) {
        return Err(GameError::CorruptSave {
            reason: format!(
                "{} holds skills worth {} points but spent only {}",
                side, owed, spent
            ),
        });
    }
    Ok(set)
}
