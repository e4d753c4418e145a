use rkyv::{Archive, Deserialize, Serialize};

use crate::codec::Versioned;
use crate::game::{Settings, N_MAX, N_MIN, RANK_MAX, RANK_MIN};
use crate::matrix::BitMatrix;
use crate::state::PlayerState;

pub const GAME_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    pub settings: Settings,
    pub target: BitMatrix,
    pub player: PlayerState,
    pub elapsed_seconds: u32,
    pub was_solved: bool,
}

impl Versioned for GameSnapshot {
    const VERSION: u32 = GAME_SNAPSHOT_VERSION;

    fn version(&self) -> u32 {
        self.version
    }
}

/// Shape check for restored snapshots; any mismatch means the save is
/// discarded and the caller starts a fresh puzzle.
pub fn validate_snapshot(snapshot: &GameSnapshot) -> Result<(), String> {
    let settings = &snapshot.settings;
    if !(N_MIN..=N_MAX).contains(&settings.n) {
        return Err(format!("n={} out of range", settings.n));
    }
    if !(RANK_MIN..=RANK_MAX).contains(&settings.r) {
        return Err(format!("r={} out of range", settings.r));
    }
    if snapshot.target.n() != settings.n {
        return Err(format!(
            "target is {}x{}, settings say {}",
            snapshot.target.n(),
            snapshot.target.n(),
            settings.n
        ));
    }
    if snapshot.target.cells().iter().any(|&cell| cell > 1) {
        return Err("target holds non-bit cells".to_string());
    }
    if !snapshot.player.matches_shape(settings) {
        return Err("player selectors do not match settings".to_string());
    }
    let selector_bits_valid = snapshot
        .player
        .u
        .iter()
        .chain(snapshot.player.v.iter())
        .all(|vector| vector.iter().all(|&bit| bit <= 1));
    if !selector_bits_valid {
        return Err("player selectors hold non-bit values".to_string());
    }
    Ok(())
}

pub fn snapshot_from_parts(
    settings: Settings,
    target: BitMatrix,
    player: PlayerState,
    elapsed_seconds: u32,
    was_solved: bool,
) -> GameSnapshot {
    GameSnapshot {
        version: GAME_SNAPSHOT_VERSION,
        settings,
        target,
        player,
        elapsed_seconds,
        was_solved,
    }
}
