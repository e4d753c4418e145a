use rkyv::{Archive, Deserialize, Serialize};

use crate::game::Settings;
use crate::matrix::BitMatrix;

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct PlayerState {
    pub u: Vec<Vec<u8>>,
    pub v: Vec<Vec<u8>>,
    pub cur: usize,
}

impl PlayerState {
    pub fn zeroed(settings: &Settings) -> Self {
        Self {
            u: vec![vec![0; settings.n]; settings.r],
            v: vec![vec![0; settings.n]; settings.r],
            cur: 0,
        }
    }

    pub fn reset(&mut self, settings: &Settings) {
        *self = Self::zeroed(settings);
    }

    pub fn toggle_row(&mut self, index: usize) -> bool {
        let Some(row) = self.u.get_mut(self.cur) else {
            return false;
        };
        let Some(bit) = row.get_mut(index) else {
            return false;
        };
        *bit ^= 1;
        true
    }

    pub fn toggle_col(&mut self, index: usize) -> bool {
        let Some(col) = self.v.get_mut(self.cur) else {
            return false;
        };
        let Some(bit) = col.get_mut(index) else {
            return false;
        };
        *bit ^= 1;
        true
    }

    pub fn switch_slot(&mut self, slot: usize) -> bool {
        if slot >= self.u.len() || slot == self.cur {
            return false;
        }
        self.cur = slot;
        true
    }

    pub fn clear(&mut self) {
        for row in &mut self.u {
            row.fill(0);
        }
        for col in &mut self.v {
            col.fill(0);
        }
    }

    pub fn matches_shape(&self, settings: &Settings) -> bool {
        self.u.len() == settings.r
            && self.v.len() == settings.r
            && self.u.iter().all(|row| row.len() == settings.n)
            && self.v.iter().all(|col| col.len() == settings.n)
            && self.cur < settings.r
    }
}

#[derive(Debug, Clone)]
pub struct CoreState {
    pub settings: Settings,
    pub target: BitMatrix,
    pub player: PlayerState,
    pub solved: bool,
    pub was_solved: bool,
    pub nonce: u32,
}

impl CoreState {
    pub fn new() -> Self {
        let settings = Settings::default();
        let target = BitMatrix::zeroed(settings.n);
        let player = PlayerState::zeroed(&settings);
        Self {
            settings,
            target,
            player,
            solved: false,
            was_solved: false,
            nonce: 0,
        }
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}
