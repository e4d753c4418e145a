use std::fmt;

use crate::bits::{bits_to_hex, hex_to_bits};
use crate::game::{Mode, Settings, N_MAX, N_MIN, RANK_MAX, RANK_MIN};
use crate::matrix::BitMatrix;

// Share-code layout, bit offsets from the start: [0:4) n, [4:8) r,
// [8:12) mode flag (value 0 or 1 in a 4-bit field), [12:12+n*n) target
// cells row-major. Hex length is ceil((12 + n*n) / 4).
pub const CODE_HEADER_BITS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeError {
    InvalidFormat,
    TooShort { bits: usize },
    OutOfRange { n: usize, r: usize, mode_field: u32 },
}

impl fmt::Display for CodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeError::InvalidFormat => {
                write!(f, "code contains characters outside [0-9A-Fa-f]")
            }
            CodeError::TooShort { bits } => {
                write!(f, "code holds {bits} bits, header needs {CODE_HEADER_BITS}")
            }
            CodeError::OutOfRange { n, r, mode_field } => {
                write!(f, "header out of range: n={n}, r={r}, mode field={mode_field}")
            }
        }
    }
}

impl std::error::Error for CodeError {}

pub fn encode_code(settings: &Settings, target: &BitMatrix) -> String {
    let n = settings.n;
    let mut bits = Vec::with_capacity(CODE_HEADER_BITS + n * n);
    push_field(&mut bits, settings.n as u32, 4);
    push_field(&mut bits, settings.r as u32, 4);
    push_field(&mut bits, settings.mode.wire_flag(), 4);
    for i in 0..n {
        for j in 0..n {
            bits.push(target.get(i, j));
        }
    }
    bits_to_hex(&bits)
}

pub fn decode_code(code: &str) -> Result<(Settings, BitMatrix), CodeError> {
    if code.is_empty() || !code.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(CodeError::InvalidFormat);
    }
    let bits = hex_to_bits(code).ok_or(CodeError::InvalidFormat)?;
    if bits.len() < CODE_HEADER_BITS {
        return Err(CodeError::TooShort { bits: bits.len() });
    }
    let n = read_field(&bits, 0, 4) as usize;
    let r = read_field(&bits, 4, 4) as usize;
    let mode_field = read_field(&bits, 8, 4);
    if !(N_MIN..=N_MAX).contains(&n) || !(RANK_MIN..=RANK_MAX).contains(&r) {
        return Err(CodeError::OutOfRange { n, r, mode_field });
    }
    let mode =
        Mode::from_wire_flag(mode_field).ok_or(CodeError::OutOfRange { n, r, mode_field })?;
    let mut target = BitMatrix::zeroed(n);
    for i in 0..n {
        for j in 0..n {
            // Missing tail bits read as zero cells so truncated codes still load.
            let bit = bits
                .get(CODE_HEADER_BITS + i * n + j)
                .copied()
                .unwrap_or(0);
            target.set(i, j, bit);
        }
    }
    Ok((Settings { n, r, mode }, target))
}

fn push_field(bits: &mut Vec<u8>, value: u32, width: usize) {
    for shift in (0..width).rev() {
        bits.push(((value >> shift) & 1) as u8);
    }
}

fn read_field(bits: &[u8], start: usize, width: usize) -> u32 {
    let mut value = 0u32;
    for offset in 0..width {
        value <<= 1;
        value |= bits.get(start + offset).map(|bit| (bit & 1) as u32).unwrap_or(0);
    }
    value
}
