use std::cell::RefCell;
use std::rc::Rc;

use bitrank::runtime::{GameStore, SessionDriver, SolveTracker};
use bitrank::session::{ApplySnapshotResult, PuzzleSession, SessionSnapshot};
use bitrank_core::{
    decode_code, generate_target, matrices_equal, puzzle_seed, snapshot_from_parts, BitMatrix,
    GameSnapshot, Mode, PlayerState, Settings, GENERATOR_SEED,
};

struct MemoryStore {
    pending: Option<GameSnapshot>,
    cleared: Rc<RefCell<bool>>,
    saves: Rc<RefCell<Vec<GameSnapshot>>>,
}

impl MemoryStore {
    fn new(
        pending: Option<GameSnapshot>,
        cleared: Rc<RefCell<bool>>,
        saves: Rc<RefCell<Vec<GameSnapshot>>>,
    ) -> Self {
        Self {
            pending,
            cleared,
            saves,
        }
    }

    fn push_save(&self, snapshot: &SessionSnapshot, elapsed_seconds: u32) {
        self.saves.borrow_mut().push(snapshot_from_parts(
            snapshot.settings,
            snapshot.target.clone(),
            snapshot.player.clone(),
            elapsed_seconds,
            snapshot.was_solved,
        ));
    }
}

impl GameStore for MemoryStore {
    fn take_pending(&mut self) -> Option<GameSnapshot> {
        self.pending.take()
    }

    fn save_if_changed(&mut self, snapshot: &SessionSnapshot, elapsed_seconds: u32) {
        self.push_save(snapshot, elapsed_seconds);
    }

    fn save_progress(&mut self, snapshot: &SessionSnapshot, elapsed_seconds: u32) {
        self.push_save(snapshot, elapsed_seconds);
    }

    fn clear(&mut self) {
        *self.cleared.borrow_mut() = true;
        self.pending = None;
    }
}

#[derive(Default)]
struct MemoryTracker {
    solves: Rc<RefCell<Vec<(String, u32)>>>,
    stars: Rc<RefCell<Vec<String>>>,
}

impl SolveTracker for MemoryTracker {
    fn record_solve(&mut self, code: &str, elapsed_seconds: u32) {
        self.solves
            .borrow_mut()
            .push((code.to_string(), elapsed_seconds));
    }

    fn record_star(&mut self, code: &str) -> bool {
        if self.stars.borrow().iter().any(|starred| starred == code) {
            return false;
        }
        self.stars.borrow_mut().push(code.to_string());
        true
    }

    fn was_solved(&self, code: &str) -> bool {
        self.solves.borrow().iter().any(|(solved, _)| solved == code)
    }

    fn is_starred(&self, code: &str) -> bool {
        self.stars.borrow().iter().any(|starred| starred == code)
    }
}

struct Harness {
    session: Rc<PuzzleSession>,
    driver: SessionDriver,
    saves: Rc<RefCell<Vec<GameSnapshot>>>,
    cleared: Rc<RefCell<bool>>,
    solves: Rc<RefCell<Vec<(String, u32)>>>,
    stars: Rc<RefCell<Vec<String>>>,
}

fn build_harness(pending: Option<GameSnapshot>) -> Harness {
    let session = PuzzleSession::new();
    let saves = Rc::new(RefCell::new(Vec::new()));
    let cleared = Rc::new(RefCell::new(false));
    let solves = Rc::new(RefCell::new(Vec::new()));
    let stars = Rc::new(RefCell::new(Vec::new()));
    let store = MemoryStore::new(pending, Rc::clone(&cleared), Rc::clone(&saves));
    let tracker = MemoryTracker {
        solves: Rc::clone(&solves),
        stars: Rc::clone(&stars),
    };
    let driver = SessionDriver::attach(Rc::clone(&session), Box::new(store), Box::new(tracker));
    Harness {
        session,
        driver,
        saves,
        cleared,
        solves,
        stars,
    }
}

fn build_settings(n: usize, r: usize, mode: Mode) -> Settings {
    Settings::new(n, r, mode).expect("settings in range")
}

#[test]
fn new_game_is_deterministic_per_nonce() {
    let session = PuzzleSession::new();
    session.new_game_with_nonce(42);
    let snapshot = session.snapshot();
    let settings = snapshot.settings;
    let expected = generate_target(
        &settings,
        puzzle_seed(GENERATOR_SEED, 42, settings.n, settings.r),
    );
    assert!(matrices_equal(&snapshot.target, &expected));
    assert!(snapshot.player_matrix.is_zero());
    assert!(!snapshot.solved);
    assert!(!snapshot.was_solved);

    let (decoded_settings, decoded_target) = decode_code(&snapshot.code).unwrap();
    assert_eq!(decoded_settings, settings);
    assert!(matrices_equal(&decoded_target, &snapshot.target));
}

#[test]
fn solving_stops_the_timer_and_reports_once() {
    let harness = build_harness(None);
    harness.session.load_from_code("2108").unwrap();
    assert!(harness.driver.timer_running());

    harness.session.toggle_row(0);
    assert!(!harness.session.snapshot().solved);
    harness.session.toggle_col(0);

    let snapshot = harness.session.snapshot();
    assert!(snapshot.solved);
    assert!(snapshot.was_solved);
    assert!(!harness.driver.timer_running());

    let solves = harness.solves.borrow();
    assert_eq!(solves.len(), 1);
    assert_eq!(solves[0].0, "2108");
}

#[test]
fn perturbing_a_solved_board_keeps_the_timer_stopped() {
    let harness = build_harness(None);
    harness.session.load_from_code("2108").unwrap();
    harness.session.toggle_row(0);
    harness.session.toggle_col(0);
    assert!(harness.session.snapshot().solved);

    harness.session.toggle_col(1);
    let snapshot = harness.session.snapshot();
    assert!(!snapshot.solved);
    assert!(snapshot.was_solved);
    assert!(!harness.driver.timer_running());

    // Re-solving the same board fires another report; only the ledger dedups.
    harness.session.toggle_col(1);
    assert!(harness.session.snapshot().solved);
    assert_eq!(harness.solves.borrow().len(), 2);
}

#[test]
fn starring_requires_a_solved_puzzle() {
    let harness = build_harness(None);
    harness.session.load_from_code("2108").unwrap();
    assert!(!harness.driver.star_current());
    assert!(harness.stars.borrow().is_empty());

    harness.session.toggle_row(0);
    harness.session.toggle_col(0);
    assert!(harness.driver.star_current());
    assert!(harness.driver.current_starred());
    assert!(!harness.driver.star_current());
    assert_eq!(harness.stars.borrow().as_slice(), &["2108".to_string()]);
}

#[test]
fn every_state_change_reaches_the_store() {
    let harness = build_harness(None);
    harness.session.load_from_code("2108").unwrap();
    let before = harness.saves.borrow().len();
    harness.session.toggle_row(1);
    harness.session.switch_slot(0);
    harness.session.toggle_row(1);
    assert_eq!(harness.saves.borrow().len(), before + 2);

    let last = harness.saves.borrow().last().cloned().unwrap();
    assert_eq!(last.settings.n, 2);
    assert_eq!(last.player.u[0], vec![0, 0]);
}

#[test]
fn boot_restores_a_valid_save() {
    let settings = build_settings(2, 1, Mode::Or);
    let target = BitMatrix::from_cells(2, vec![1, 0, 0, 0]).unwrap();
    let mut player = PlayerState::zeroed(&settings);
    player.toggle_row(0);
    let saved = snapshot_from_parts(settings, target, player, 42, false);

    let harness = build_harness(Some(saved));
    harness.driver.boot();

    let snapshot = harness.session.snapshot();
    assert_eq!(snapshot.code, "2108");
    assert_eq!(snapshot.player.u[0], vec![1, 0]);
    assert!(!snapshot.solved);
    assert!(harness.driver.timer_running());
    assert!(harness.driver.elapsed_seconds() >= 42);
}

#[test]
fn boot_restore_of_a_solved_save_stays_quiet() {
    let settings = build_settings(2, 1, Mode::Or);
    let target = BitMatrix::from_cells(2, vec![1, 0, 0, 0]).unwrap();
    let mut player = PlayerState::zeroed(&settings);
    player.toggle_row(0);
    player.toggle_col(0);
    let saved = snapshot_from_parts(settings, target, player, 90, true);

    let harness = build_harness(Some(saved));
    harness.driver.boot();

    let snapshot = harness.session.snapshot();
    assert!(snapshot.solved);
    assert!(snapshot.was_solved);
    assert!(!harness.driver.timer_running());
    assert_eq!(harness.driver.elapsed_seconds(), 90);
    // Restoring a solved board is a baseline, not a new solve event.
    assert!(harness.solves.borrow().is_empty());
}

#[test]
fn boot_discards_a_malformed_save() {
    let settings = build_settings(2, 1, Mode::Or);
    let target = BitMatrix::from_cells(2, vec![1, 0, 0, 0]).unwrap();
    let mut player = PlayerState::zeroed(&settings);
    player.cur = 3;
    let saved = snapshot_from_parts(settings, target, player, 5, false);

    let harness = build_harness(Some(saved));
    harness.driver.boot();

    assert!(*harness.cleared.borrow());
    let snapshot = harness.session.snapshot();
    assert_eq!(snapshot.settings, Settings::default());
    assert!(!snapshot.solved);
}

#[test]
fn boot_without_a_save_starts_fresh() {
    let harness = build_harness(None);
    harness.driver.boot();
    let snapshot = harness.session.snapshot();
    assert_eq!(snapshot.settings, Settings::default());
    assert!(snapshot.player_matrix.is_zero());
    assert!(harness.driver.timer_running());
}

#[test]
fn settings_steps_regenerate_the_puzzle() {
    let session = PuzzleSession::new();
    session.load_from_code("2108").unwrap();

    session.step_r(1);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.settings.r, 2);
    assert_eq!(snapshot.player.u.len(), 2);
    assert!(snapshot.player_matrix.is_zero());
    assert!(!snapshot.was_solved);

    session.step_n(100);
    assert_eq!(session.snapshot().settings.n, 10);
    let code_at_max = session.snapshot().code.clone();
    session.step_n(1);
    assert_eq!(session.snapshot().code, code_at_max);

    session.set_mode(Mode::Xor);
    assert_eq!(session.snapshot().settings.mode, Mode::Xor);
    session.set_mode(Mode::Xor);
    assert_eq!(session.snapshot().settings.mode, Mode::Xor);
}

#[test]
fn invalid_codes_leave_the_session_untouched() {
    let session = PuzzleSession::new();
    session.new_game_with_nonce(7);
    let before = session.snapshot();
    assert!(session.load_from_code("GG").is_err());
    assert!(session.load_from_code("B10").is_err());
    let after = session.snapshot();
    assert_eq!(after.code, before.code);
    assert_eq!(after.player, before.player);
}

#[test]
fn load_from_code_trims_surrounding_whitespace() {
    let session = PuzzleSession::new();
    session.load_from_code("  2109\n").unwrap();
    assert_eq!(session.snapshot().code, "2109");
}

#[test]
fn snapshots_round_trip_between_sessions() {
    let source = PuzzleSession::new();
    source.load_from_code("2119").unwrap();
    source.toggle_row(0);
    source.toggle_col(1);
    let saved = source.build_snapshot(17);
    assert_eq!(saved.elapsed_seconds, 17);

    let restored = PuzzleSession::new();
    assert!(matches!(
        restored.apply_snapshot(&saved),
        ApplySnapshotResult::Applied
    ));
    let snapshot = restored.snapshot();
    assert_eq!(snapshot.code, "2119");
    assert_eq!(snapshot.player, source.snapshot().player);
    assert_eq!(snapshot.solved, source.snapshot().solved);
}
