use std::cell::RefCell;
use std::rc::Rc;

use bitrank_core::{
    decode_code, encode_code, generate_target, matrices_equal, player_matrix, puzzle_seed,
    snapshot_from_parts, splitmix32, validate_snapshot, BitMatrix, CodeError, CoreState,
    GameSnapshot, Mode, PlayerState, Settings, GENERATOR_SEED,
};

pub type SessionSubscriber = Rc<dyn Fn()>;

pub struct PuzzleSession {
    state: RefCell<CoreState>,
    subscribers: Rc<RefCell<Vec<SessionSubscriber>>>,
}

#[derive(Clone)]
pub struct SessionSnapshot {
    pub settings: Settings,
    pub target: BitMatrix,
    pub player: PlayerState,
    pub player_matrix: BitMatrix,
    pub solved: bool,
    pub was_solved: bool,
    pub code: String,
}

pub enum ApplySnapshotResult {
    Applied,
    Mismatch,
}

impl PuzzleSession {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(CoreState::new()),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        })
    }

    pub fn subscribe(&self, subscriber: SessionSubscriber) -> SessionSubscription {
        self.subscribers.borrow_mut().push(subscriber.clone());
        SessionSubscription {
            subscriber,
            subscribers: Rc::clone(&self.subscribers),
        }
    }

    fn notify(&self) {
        let subscribers = self.subscribers.borrow().clone();
        for subscriber in subscribers {
            (subscriber)();
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.borrow();
        SessionSnapshot {
            settings: state.settings,
            target: state.target.clone(),
            player: state.player.clone(),
            player_matrix: player_matrix(&state.player, &state.settings),
            solved: state.solved,
            was_solved: state.was_solved,
            code: encode_code(&state.settings, &state.target),
        }
    }

    pub fn new_game(&self) {
        let nonce = {
            let state = self.state.borrow();
            time_nonce(state.nonce)
        };
        self.new_game_with_nonce(nonce);
    }

    pub fn new_game_with_nonce(&self, nonce: u32) {
        let mut state = self.state.borrow_mut();
        let settings = state.settings;
        let seed = puzzle_seed(GENERATOR_SEED, nonce, settings.n, settings.r);
        state.target = generate_target(&settings, seed);
        state.player = PlayerState::zeroed(&settings);
        state.solved = false;
        state.was_solved = false;
        state.nonce = nonce;
        drop(state);
        self.notify();
    }

    pub fn toggle_row(&self, index: usize) {
        let mut state = self.state.borrow_mut();
        if !state.player.toggle_row(index) {
            return;
        }
        refresh_solved(&mut state);
        drop(state);
        self.notify();
    }

    pub fn toggle_col(&self, index: usize) {
        let mut state = self.state.borrow_mut();
        if !state.player.toggle_col(index) {
            return;
        }
        refresh_solved(&mut state);
        drop(state);
        self.notify();
    }

    pub fn switch_slot(&self, slot: usize) {
        let mut state = self.state.borrow_mut();
        if !state.player.switch_slot(slot) {
            return;
        }
        drop(state);
        self.notify();
    }

    pub fn clear_selectors(&self) {
        let mut state = self.state.borrow_mut();
        state.player.clear();
        refresh_solved(&mut state);
        drop(state);
        self.notify();
    }

    pub fn step_n(&self, delta: i32) {
        let changed = {
            let mut state = self.state.borrow_mut();
            state.settings.step_n(delta)
        };
        if changed {
            self.new_game();
        }
    }

    pub fn step_r(&self, delta: i32) {
        let changed = {
            let mut state = self.state.borrow_mut();
            state.settings.step_r(delta)
        };
        if changed {
            self.new_game();
        }
    }

    pub fn set_mode(&self, mode: Mode) {
        {
            let mut state = self.state.borrow_mut();
            if state.settings.mode == mode {
                return;
            }
            state.settings.mode = mode;
        }
        self.new_game();
    }

    pub fn load_from_code(&self, code: &str) -> Result<(), CodeError> {
        let (settings, target) = decode_code(code.trim())?;
        let mut state = self.state.borrow_mut();
        state.settings = settings;
        state.target = target;
        state.player = PlayerState::zeroed(&settings);
        state.solved = false;
        state.was_solved = false;
        drop(state);
        self.notify();
        Ok(())
    }

    pub fn apply_snapshot(&self, snapshot: &GameSnapshot) -> ApplySnapshotResult {
        if validate_snapshot(snapshot).is_err() {
            return ApplySnapshotResult::Mismatch;
        }
        let mut state = self.state.borrow_mut();
        state.settings = snapshot.settings;
        state.target = snapshot.target.clone();
        state.player = snapshot.player.clone();
        state.was_solved = snapshot.was_solved;
        let derived = player_matrix(&state.player, &state.settings);
        state.solved = matrices_equal(&derived, &state.target);
        if state.solved {
            state.was_solved = true;
        }
        drop(state);
        self.notify();
        ApplySnapshotResult::Applied
    }

    pub fn build_snapshot(&self, elapsed_seconds: u32) -> GameSnapshot {
        let state = self.state.borrow();
        snapshot_from_parts(
            state.settings,
            state.target.clone(),
            state.player.clone(),
            elapsed_seconds,
            state.was_solved,
        )
    }
}

fn refresh_solved(state: &mut CoreState) {
    let derived = player_matrix(&state.player, &state.settings);
    state.solved = matrices_equal(&derived, &state.target);
    if state.solved {
        state.was_solved = true;
    }
}

fn time_nonce(previous: u32) -> u32 {
    #[cfg(target_arch = "wasm32")]
    {
        let now = js_sys::Date::now() as u32;
        return splitmix32(now ^ previous.wrapping_add(0x9E37_79B9));
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|duration| duration.as_millis() as u32)
            .unwrap_or(0);
        return splitmix32(now ^ previous.wrapping_add(0x9E37_79B9));
    }
}

pub struct SessionSubscription {
    subscriber: SessionSubscriber,
    subscribers: Rc<RefCell<Vec<SessionSubscriber>>>,
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|item| !Rc::ptr_eq(item, &self.subscriber));
    }
}
