use bitrank_core::Versioned;

pub const SETTINGS_VERSION: u32 = 1;
pub const SOLVED_LEDGER_VERSION: u32 = 1;

pub const GAME_KEY: &str = "bitrank.game.v1";
pub const SETTINGS_KEY: &str = "bitrank.settings.v1";
pub const SOLVED_KEY: &str = "bitrank.solved.v1";
pub const USER_ID_KEY: &str = "bitrank.user.v1";

pub const ZOOM_PERCENT_MIN: u32 = 50;
pub const ZOOM_PERCENT_MAX: u32 = 100;
pub const ZOOM_PERCENT_DEFAULT: u32 = 100;

#[derive(Clone, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub struct SettingsBlob {
    pub version: u32,
    pub zoom_percent: u32,
    pub show_preview: bool,
    pub show_timer: bool,
}

impl Default for SettingsBlob {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            zoom_percent: ZOOM_PERCENT_DEFAULT,
            show_preview: true,
            show_timer: true,
        }
    }
}

impl Versioned for SettingsBlob {
    const VERSION: u32 = SETTINGS_VERSION;

    fn version(&self) -> u32 {
        self.version
    }
}

impl SettingsBlob {
    pub fn step_zoom(&mut self, delta_percent: i32) -> bool {
        let stepped = (self.zoom_percent as i64 + delta_percent as i64)
            .clamp(ZOOM_PERCENT_MIN as i64, ZOOM_PERCENT_MAX as i64) as u32;
        if stepped == self.zoom_percent {
            return false;
        }
        self.zoom_percent = stepped;
        true
    }
}

#[derive(Clone, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub struct SolvedEntry {
    pub code: String,
    pub solved_at_ms: u64,
    pub starred: bool,
}

#[derive(Clone, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub struct SolvedLedger {
    pub version: u32,
    pub entries: Vec<SolvedEntry>,
}

impl Default for SolvedLedger {
    fn default() -> Self {
        Self {
            version: SOLVED_LEDGER_VERSION,
            entries: Vec::new(),
        }
    }
}

impl Versioned for SolvedLedger {
    const VERSION: u32 = SOLVED_LEDGER_VERSION;

    fn version(&self) -> u32 {
        self.version
    }
}

impl SolvedLedger {
    pub fn entry(&self, code: &str) -> Option<&SolvedEntry> {
        self.entries.iter().find(|entry| entry.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entry(code).is_some()
    }

    pub fn is_starred(&self, code: &str) -> bool {
        self.entry(code).map(|entry| entry.starred).unwrap_or(false)
    }

    /// Records a solve once; repeat solves keep the first timestamp.
    pub fn mark_solved(&mut self, code: &str, solved_at_ms: u64) -> bool {
        if self.contains(code) {
            return false;
        }
        self.entries.push(SolvedEntry {
            code: code.to_string(),
            solved_at_ms,
            starred: false,
        });
        true
    }

    /// Stars are only recorded for puzzles already in the ledger.
    pub fn mark_starred(&mut self, code: &str) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.code == code) else {
            return false;
        };
        if entry.starred {
            return false;
        }
        entry.starred = true;
        true
    }
}
