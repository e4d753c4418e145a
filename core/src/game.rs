use rkyv::{Archive, Deserialize, Serialize};

use crate::matrix::BitMatrix;
use crate::state::PlayerState;

pub const N_MIN: usize = 2;
pub const N_MAX: usize = 10;
pub const RANK_MIN: usize = 1;
pub const RANK_MAX: usize = 6;

pub const DEFAULT_N: usize = 5;
pub const DEFAULT_RANK: usize = 3;

pub const GENERATOR_SEED: u32 = 0xB17F_AC70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[repr(u8)]
pub enum Mode {
    Or,
    Xor,
}

impl Mode {
    pub fn wire_flag(self) -> u32 {
        match self {
            Mode::Or => 0,
            Mode::Xor => 1,
        }
    }

    pub fn from_wire_flag(flag: u32) -> Option<Self> {
        match flag {
            0 => Some(Mode::Or),
            1 => Some(Mode::Xor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct Settings {
    pub n: usize,
    pub r: usize,
    pub mode: Mode,
}

impl Settings {
    pub fn new(n: usize, r: usize, mode: Mode) -> Option<Self> {
        if !(N_MIN..=N_MAX).contains(&n) || !(RANK_MIN..=RANK_MAX).contains(&r) {
            return None;
        }
        Some(Self { n, r, mode })
    }

    pub fn step_n(&mut self, delta: i32) -> bool {
        let next = step_bounded(self.n, delta, N_MIN, N_MAX);
        if next == self.n {
            return false;
        }
        self.n = next;
        true
    }

    pub fn step_r(&mut self, delta: i32) -> bool {
        let next = step_bounded(self.r, delta, RANK_MIN, RANK_MAX);
        if next == self.r {
            return false;
        }
        self.r = next;
        true
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            n: DEFAULT_N,
            r: DEFAULT_RANK,
            mode: Mode::Xor,
        }
    }
}

fn step_bounded(value: usize, delta: i32, min: usize, max: usize) -> usize {
    let stepped = value as i64 + delta as i64;
    stepped.clamp(min as i64, max as i64) as usize
}

pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

pub fn rand_unit(seed: u32, salt: u32) -> f32 {
    let mixed = splitmix32(seed ^ salt);
    let top = mixed >> 8;
    top as f32 / ((1u32 << 24) as f32)
}

fn coin(seed: u32, salt: u32) -> u8 {
    if rand_unit(seed, salt) < 0.5 {
        1
    } else {
        0
    }
}

pub fn puzzle_seed(base: u32, nonce: u32, n: usize, r: usize) -> u32 {
    let shape = ((n as u32) << 16) ^ (r as u32);
    base ^ nonce.wrapping_mul(0x9E37_79B9) ^ shape ^ 0xFAC7_012D
}

fn accumulate_outer(target: &mut BitMatrix, row: &[u8], col: &[u8], mode: Mode) {
    let n = target.n();
    for i in 0..n {
        if row.get(i).copied().unwrap_or(0) == 0 {
            continue;
        }
        for j in 0..n {
            if col.get(j).copied().unwrap_or(0) == 0 {
                continue;
            }
            match mode {
                Mode::Or => target.set(i, j, 1),
                Mode::Xor => target.flip(i, j),
            }
        }
    }
}

pub fn generate_target(settings: &Settings, seed: u32) -> BitMatrix {
    let n = settings.n;
    let mut target = BitMatrix::zeroed(n);
    let mut row = vec![0u8; n];
    let mut col = vec![0u8; n];
    for k in 0..settings.r {
        for i in 0..n {
            let salt = ((k * n + i) as u32) << 1;
            row[i] = coin(seed, salt);
            col[i] = coin(seed, salt | 1);
        }
        accumulate_outer(&mut target, &row, &col, settings.mode);
    }
    target
}

pub fn player_matrix(state: &PlayerState, settings: &Settings) -> BitMatrix {
    let mut derived = BitMatrix::zeroed(settings.n);
    for k in 0..settings.r {
        let (Some(row), Some(col)) = (state.u.get(k), state.v.get(k)) else {
            continue;
        };
        accumulate_outer(&mut derived, row, col, settings.mode);
    }
    derived
}

pub fn matrices_equal(a: &BitMatrix, b: &BitMatrix) -> bool {
    a.n() == b.n() && a.cells() == b.cells()
}
