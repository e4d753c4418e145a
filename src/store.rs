#[cfg(target_arch = "wasm32")]
use base64::engine::general_purpose::STANDARD;
#[cfg(target_arch = "wasm32")]
use base64::Engine;

#[cfg(target_arch = "wasm32")]
use crate::persisted::{GAME_KEY, SETTINGS_KEY, SOLVED_KEY};
use crate::persisted::{SettingsBlob, SolvedLedger};
use bitrank_core::GameSnapshot;
#[cfg(target_arch = "wasm32")]
use bitrank_core::{decode_versioned, encode, validate_snapshot};

pub fn load_game_snapshot() -> Option<GameSnapshot> {
    #[cfg(target_arch = "wasm32")]
    {
        let bytes = read_record(GAME_KEY)?;
        let snapshot = decode_versioned::<GameSnapshot>(&bytes)?;
        if let Err(reason) = validate_snapshot(&snapshot) {
            gloo::console::warn!("saved game rejected:", reason);
            return None;
        }
        return Some(snapshot);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

pub fn save_game_snapshot(snapshot: &GameSnapshot) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(bytes) = encode(snapshot) else {
            gloo::console::warn!("saved game: encode failed");
            return;
        };
        write_record(GAME_KEY, &bytes);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = snapshot;
    }
}

pub fn clear_game_snapshot() {
    #[cfg(target_arch = "wasm32")]
    {
        remove_raw(GAME_KEY);
    }
}

pub fn load_settings_blob() -> SettingsBlob {
    #[cfg(target_arch = "wasm32")]
    {
        let blob = read_record(SETTINGS_KEY)
            .and_then(|bytes| decode_versioned::<SettingsBlob>(&bytes));
        return blob.unwrap_or_default();
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        SettingsBlob::default()
    }
}

pub fn save_settings_blob(settings: &SettingsBlob) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(bytes) = encode(settings) {
            write_record(SETTINGS_KEY, &bytes);
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = settings;
    }
}

pub fn load_solved_ledger() -> SolvedLedger {
    #[cfg(target_arch = "wasm32")]
    {
        let ledger = read_record(SOLVED_KEY)
            .and_then(|bytes| decode_versioned::<SolvedLedger>(&bytes));
        return ledger.unwrap_or_default();
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        SolvedLedger::default()
    }
}

pub fn save_solved_ledger(ledger: &SolvedLedger) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(bytes) = encode(ledger) {
            write_record(SOLVED_KEY, &bytes);
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = ledger;
    }
}

#[cfg(target_arch = "wasm32")]
fn read_record(key: &str) -> Option<Vec<u8>> {
    let raw = read_raw(key)?;
    STANDARD.decode(raw.as_bytes()).ok()
}

#[cfg(target_arch = "wasm32")]
fn write_record(key: &str, bytes: &[u8]) {
    write_raw(key, &STANDARD.encode(bytes));
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn read_raw(key: &str) -> Option<String> {
    let window = web_sys::window()?;
    let storage = window.local_storage().ok()??;
    let raw = storage.get_item(key).ok()??;
    if raw.is_empty() {
        return None;
    }
    Some(raw)
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn write_raw(key: &str, value: &str) {
    let Some(storage) = web_sys::window().and_then(|window| window.local_storage().ok().flatten())
    else {
        gloo::console::warn!("local storage unavailable");
        return;
    };
    if storage.set_item(key, value).is_err() {
        gloo::console::warn!("local storage write failed:", key);
    }
}

#[cfg(target_arch = "wasm32")]
fn remove_raw(key: &str) {
    let Some(storage) = web_sys::window().and_then(|window| window.local_storage().ok().flatten())
    else {
        return;
    };
    let _ = storage.remove_item(key);
}
