use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use bitrank_core::{snapshot_from_parts, GameSnapshot};

use crate::identity;
use crate::persisted::SolvedLedger;
use crate::report::ReportClient;
use crate::session::{ApplySnapshotResult, PuzzleSession, SessionSnapshot, SessionSubscription};
use crate::store;
use crate::timer::SolveTimer;

pub trait GameStore {
    fn take_pending(&mut self) -> Option<GameSnapshot>;
    fn save_if_changed(&mut self, snapshot: &SessionSnapshot, elapsed_seconds: u32);
    fn save_progress(&mut self, snapshot: &SessionSnapshot, elapsed_seconds: u32);
    fn clear(&mut self);
}

pub trait SolveTracker {
    fn record_solve(&mut self, code: &str, elapsed_seconds: u32);
    fn record_star(&mut self, code: &str) -> bool;
    fn was_solved(&self, code: &str) -> bool;
    fn is_starred(&self, code: &str) -> bool;
}

pub struct LocalStoreAdapter {
    pending: Option<GameSnapshot>,
    pending_loaded: bool,
    last_saved_fingerprint: Option<u64>,
}

impl LocalStoreAdapter {
    pub fn new() -> Self {
        Self {
            pending: None,
            pending_loaded: false,
            last_saved_fingerprint: None,
        }
    }
}

impl Default for LocalStoreAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStore for LocalStoreAdapter {
    fn take_pending(&mut self) -> Option<GameSnapshot> {
        if !self.pending_loaded {
            self.pending = store::load_game_snapshot();
            self.pending_loaded = true;
        }
        self.pending.take()
    }

    fn save_if_changed(&mut self, snapshot: &SessionSnapshot, elapsed_seconds: u32) {
        let fingerprint = session_fingerprint(snapshot);
        if self.last_saved_fingerprint == Some(fingerprint) {
            return;
        }
        store::save_game_snapshot(&build_game_snapshot(snapshot, elapsed_seconds));
        self.last_saved_fingerprint = Some(fingerprint);
    }

    fn save_progress(&mut self, snapshot: &SessionSnapshot, elapsed_seconds: u32) {
        store::save_game_snapshot(&build_game_snapshot(snapshot, elapsed_seconds));
        self.last_saved_fingerprint = Some(session_fingerprint(snapshot));
    }

    fn clear(&mut self) {
        store::clear_game_snapshot();
        self.pending = None;
        self.pending_loaded = true;
        self.last_saved_fingerprint = None;
    }
}

pub struct RemoteSolveTracker {
    client: ReportClient,
    ledger: SolvedLedger,
}

impl RemoteSolveTracker {
    pub fn new(client: ReportClient) -> Self {
        Self {
            client,
            ledger: store::load_solved_ledger(),
        }
    }
}

impl SolveTracker for RemoteSolveTracker {
    fn record_solve(&mut self, code: &str, elapsed_seconds: u32) {
        // Local ledger first: solved state never waits on the server.
        if self.ledger.mark_solved(code, now_ms()) {
            store::save_solved_ledger(&self.ledger);
        }
        self.client
            .report_solve(code, elapsed_seconds, &identity::user_id());
    }

    fn record_star(&mut self, code: &str) -> bool {
        if !self.ledger.mark_starred(code) {
            return false;
        }
        store::save_solved_ledger(&self.ledger);
        self.client.report_star(code, &identity::user_id());
        true
    }

    fn was_solved(&self, code: &str) -> bool {
        self.ledger.contains(code)
    }

    fn is_starred(&self, code: &str) -> bool {
        self.ledger.is_starred(code)
    }
}

struct DriverState {
    timer: SolveTimer,
    store: Box<dyn GameStore>,
    tracker: Box<dyn SolveTracker>,
    last_code: String,
    last_solved: bool,
}

/// Subscribes to a session and dispatches the side effects around it: the
/// solve timer, save-on-change persistence, and solve/star reporting. The
/// session itself stays synchronous and pure.
pub struct SessionDriver {
    session: Rc<PuzzleSession>,
    state: Rc<RefCell<DriverState>>,
    _subscription: SessionSubscription,
}

impl SessionDriver {
    pub fn attach(
        session: Rc<PuzzleSession>,
        store: Box<dyn GameStore>,
        tracker: Box<dyn SolveTracker>,
    ) -> Self {
        let state = Rc::new(RefCell::new(DriverState {
            timer: SolveTimer::new(),
            store,
            tracker,
            last_code: String::new(),
            last_solved: false,
        }));
        let subscriber: Rc<dyn Fn()> = {
            let session = Rc::clone(&session);
            let state = Rc::clone(&state);
            Rc::new(move || {
                let snapshot = session.snapshot();
                handle_snapshot(&state, &snapshot);
            })
        };
        let subscription = session.subscribe(subscriber);
        Self {
            session,
            state,
            _subscription: subscription,
        }
    }

    /// Restores the saved game if one validates, otherwise starts fresh.
    pub fn boot(&self) {
        let pending = self.state.borrow_mut().store.take_pending();
        let Some(saved) = pending else {
            self.session.new_game();
            return;
        };
        let elapsed = saved.elapsed_seconds;
        match self.session.apply_snapshot(&saved) {
            ApplySnapshotResult::Applied => {
                self.state.borrow_mut().timer.set_elapsed(elapsed);
            }
            ApplySnapshotResult::Mismatch => {
                self.state.borrow_mut().store.clear();
                self.session.new_game();
            }
        }
    }

    /// Periodic save so timer progress survives a reload mid-solve.
    pub fn tick(&self) {
        let snapshot = self.session.snapshot();
        let mut state = self.state.borrow_mut();
        let elapsed = state.timer.elapsed_seconds();
        state.store.save_progress(&snapshot, elapsed);
    }

    pub fn star_current(&self) -> bool {
        let snapshot = self.session.snapshot();
        let mut state = self.state.borrow_mut();
        let eligible =
            snapshot.solved || snapshot.was_solved || state.tracker.was_solved(&snapshot.code);
        if !eligible {
            return false;
        }
        state.tracker.record_star(&snapshot.code)
    }

    pub fn current_starred(&self) -> bool {
        let snapshot = self.session.snapshot();
        self.state.borrow().tracker.is_starred(&snapshot.code)
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.state.borrow().timer.elapsed_seconds()
    }

    pub fn timer_running(&self) -> bool {
        self.state.borrow().timer.is_running()
    }

    pub fn session(&self) -> &Rc<PuzzleSession> {
        &self.session
    }
}

fn handle_snapshot(state: &RefCell<DriverState>, snapshot: &SessionSnapshot) {
    let mut state = state.borrow_mut();
    let state = &mut *state;
    if snapshot.code != state.last_code {
        // New puzzle instance: the first snapshot is a baseline, not a
        // solved transition.
        state.last_code = snapshot.code.clone();
        state.last_solved = snapshot.solved;
        state.timer.reset();
        let previously_solved = snapshot.was_solved || state.tracker.was_solved(&snapshot.code);
        if !snapshot.solved && !previously_solved {
            state.timer.start();
        }
    } else {
        let newly_solved = snapshot.solved && !state.last_solved;
        state.last_solved = snapshot.solved;
        if newly_solved {
            state.timer.stop();
            let elapsed = state.timer.elapsed_seconds();
            state.tracker.record_solve(&snapshot.code, elapsed);
        } else if !snapshot.solved
            && !snapshot.was_solved
            && !state.tracker.was_solved(&snapshot.code)
            && !state.timer.is_running()
        {
            state.timer.start();
        }
    }
    let elapsed = state.timer.elapsed_seconds();
    state.store.save_if_changed(snapshot, elapsed);
}

fn build_game_snapshot(snapshot: &SessionSnapshot, elapsed_seconds: u32) -> GameSnapshot {
    snapshot_from_parts(
        snapshot.settings,
        snapshot.target.clone(),
        snapshot.player.clone(),
        elapsed_seconds,
        snapshot.was_solved,
    )
}

fn session_fingerprint(snapshot: &SessionSnapshot) -> u64 {
    let mut hasher = DefaultHasher::new();
    snapshot.settings.n.hash(&mut hasher);
    snapshot.settings.r.hash(&mut hasher);
    snapshot.settings.mode.wire_flag().hash(&mut hasher);
    snapshot.target.cells().hash(&mut hasher);
    snapshot.player.u.hash(&mut hasher);
    snapshot.player.v.hash(&mut hasher);
    snapshot.player.cur.hash(&mut hasher);
    snapshot.was_solved.hash(&mut hasher);
    hasher.finish()
}

fn now_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        return js_sys::Date::now() as u64;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        return std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|duration| duration.as_millis() as u64)
            .unwrap_or(0);
    }
}
