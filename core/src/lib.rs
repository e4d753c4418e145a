pub mod bits;
pub mod code;
pub mod codec;
pub mod game;
pub mod matrix;
pub mod snapshot;
pub mod state;

pub use bits::{bits_to_hex, hex_to_bits};
pub use code::{decode_code, encode_code, CodeError, CODE_HEADER_BITS};
pub use codec::{decode, decode_versioned, encode, Versioned};
pub use game::{
    generate_target, matrices_equal, player_matrix, puzzle_seed, rand_unit, splitmix32, Mode,
    Settings, DEFAULT_N, DEFAULT_RANK, GENERATOR_SEED, N_MAX, N_MIN, RANK_MAX, RANK_MIN,
};
pub use matrix::BitMatrix;
pub use snapshot::{
    snapshot_from_parts, validate_snapshot, GameSnapshot, GAME_SNAPSHOT_VERSION,
};
pub use state::{CoreState, PlayerState};
