//! Wheel engine: the context object behind every spin
//!
//! Owns the prize set, settings, current rotation, history, RNG and the
//! animation driver, and talks to the outside world only through injected
//! collaborators (scheduler, persistence, observer, audio sink).

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioCue, AudioSink, Silent};
use crate::error::{Result, SpinError};
use crate::history::SpinHistoryLog;
use crate::persistence::Persistence;
use crate::platform::{Scheduler, wall_clock_ms};
use crate::settings::{SpinConfiguration, WheelSettings};
use crate::sim::prize::{DEFAULT_PRIZE_COLOR, DEFAULT_PRIZE_ICON};
use crate::sim::{
    AnimationDriver, AnimationState, CompletionHandler, FrameHandler, PrizeSet, Segment, SegmentId,
    SpinPlan,
};

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// UI-side hooks: redraw, winner display, notices and confirmations
///
/// All methods but `frame` have no-op defaults; `confirm` approves.
pub trait WheelObserver {
    /// Redraw the wheel at `rotation_deg`
    fn frame(&self, rotation_deg: f64, prizes: &PrizeSet);

    /// A spin finished on `segment`
    fn winner(&self, _segment: &Segment) {}

    fn notify(&self, _level: NoticeLevel, _message: &str) {}

    /// Ask the user before a destructive action
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl WheelObserver for Headless {
    fn frame(&self, _rotation_deg: f64, _prizes: &PrizeSet) {}
}

/// Prize wheel context
pub struct WheelEngine {
    prizes: PrizeSet,
    settings: WheelSettings,
    rotation: Rc<Cell<f64>>,
    history: Rc<RefCell<SpinHistoryLog>>,
    last_winner: Rc<RefCell<Option<Segment>>>,
    store: Rc<Persistence>,
    observer: Rc<dyn WheelObserver>,
    audio: Rc<dyn AudioSink>,
    driver: AnimationDriver,
    rng: Pcg32,
}

impl WheelEngine {
    /// Load prizes, settings and history from `store`, seeding defaults on first run
    pub fn new(scheduler: Rc<dyn Scheduler>, store: Persistence, seed: u64) -> Self {
        let prizes = match store.load_prizes() {
            Ok(Some(prizes)) => prizes,
            Ok(None) => {
                log::info!("No stored prizes, seeding defaults");
                let prizes = PrizeSet::with_defaults();
                if let Err(e) = store.save_prizes(&prizes) {
                    log::warn!("Could not save default prizes: {}", e);
                }
                prizes
            }
            Err(e) => {
                log::warn!("Stored prizes unreadable ({}), using defaults", e);
                PrizeSet::with_defaults()
            }
        };

        let settings = store.load_settings().unwrap_or_else(|e| {
            log::warn!("Stored settings unreadable ({}), using defaults", e);
            None
        });
        let settings = settings.unwrap_or_default();

        let history = store.load_history().unwrap_or_else(|e| {
            log::warn!("Stored history unreadable ({}), starting fresh", e);
            SpinHistoryLog::new()
        });

        log::info!(
            "Wheel ready: {} prizes, {} past spins, seed {}",
            prizes.len(),
            history.len(),
            seed
        );

        Self {
            prizes,
            settings,
            rotation: Rc::new(Cell::new(0.0)),
            history: Rc::new(RefCell::new(history)),
            last_winner: Rc::new(RefCell::new(None)),
            store: Rc::new(store),
            observer: Rc::new(Headless),
            audio: Rc::new(Silent),
            driver: AnimationDriver::new(scheduler),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn with_observer(mut self, observer: Rc<dyn WheelObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_audio(self, audio: Rc<dyn AudioSink>) -> Self {
        audio.configure(&self.settings.audio);
        Self { audio, ..self }
    }

    // === Accessors ===

    pub fn prizes(&self) -> &PrizeSet {
        &self.prizes
    }

    pub fn settings(&self) -> &WheelSettings {
        &self.settings
    }

    pub fn config(&self) -> &SpinConfiguration {
        &self.settings.spin
    }

    /// Accumulated wheel rotation in degrees
    pub fn rotation_deg(&self) -> f64 {
        self.rotation.get()
    }

    pub fn is_spinning(&self) -> bool {
        self.driver.is_running()
    }

    pub fn animation_state(&self) -> AnimationState {
        self.driver.state()
    }

    pub fn history(&self) -> Ref<'_, SpinHistoryLog> {
        self.history.borrow()
    }

    /// Winner of the most recent completed spin
    pub fn last_winner(&self) -> Option<Segment> {
        self.last_winner.borrow().clone()
    }

    /// Redraw at the current rotation (after edits or a resize)
    pub fn redraw(&self) {
        self.observer.frame(self.rotation.get(), &self.prizes);
    }

    // === Spinning ===

    /// Spin the wheel
    ///
    /// Returns the plan being animated, `Ok(None)` if a spin is already
    /// running (ignored), or `InvalidState` when there is nothing to spin.
    pub fn request_spin(&mut self) -> Result<Option<SpinPlan>> {
        if self.driver.is_running() {
            log::debug!("Spin request ignored: already spinning");
            return Ok(None);
        }
        let plan = match self.plan_spin() {
            Ok(plan) => plan,
            Err(e) => {
                log::warn!("Spin refused: {}", e);
                self.observer.notify(NoticeLevel::Error, &e.to_string());
                return Err(e);
            }
        };

        let (on_frame, on_complete) = self.spin_handlers();
        match self.driver.start(plan.clone(), on_frame, on_complete) {
            Ok(()) => {
                self.audio.cue(AudioCue::SpinStarted);
                Ok(Some(plan))
            }
            Err(e) if e.is_benign() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Abandon the running spin and start a fresh one from where the wheel is now
    pub fn respin(&mut self) -> Result<SpinPlan> {
        let plan = self.plan_spin()?;
        let (on_frame, on_complete) = self.spin_handlers();
        if let Some(old) = self.driver.replace(plan.clone(), on_frame, on_complete) {
            log::info!("Respin superseded plan toward {:?}", old.winning_segment.name);
        } else {
            self.audio.cue(AudioCue::SpinStarted);
        }
        Ok(plan)
    }

    /// Stop the running spin where it is; no winner is recorded
    pub fn cancel_spin(&mut self) -> bool {
        let cancelled = self.driver.cancel().is_some();
        if cancelled {
            self.audio.cue(AudioCue::SpinEnded);
        }
        cancelled
    }

    fn plan_spin(&mut self) -> Result<SpinPlan> {
        // Snapshot: later settings edits never touch this plan
        let config = self.settings.spin.clone();
        crate::sim::plan(&self.prizes, &config, self.rotation.get(), &mut self.rng)
    }

    fn spin_handlers(&self) -> (FrameHandler, CompletionHandler) {
        // Prizes cannot change while a spin runs, so a snapshot is exact
        let prizes = self.prizes.clone();
        let rotation = Rc::clone(&self.rotation);
        let observer = Rc::clone(&self.observer);
        let on_frame: FrameHandler = Box::new(move |deg: f64| {
            rotation.set(deg);
            observer.frame(deg, &prizes);
        });

        let history = Rc::clone(&self.history);
        let store = Rc::clone(&self.store);
        let audio = Rc::clone(&self.audio);
        let observer = Rc::clone(&self.observer);
        let last_winner = Rc::clone(&self.last_winner);
        let on_complete: CompletionHandler = Box::new(move |segment: Segment| {
            audio.cue(AudioCue::SpinEnded);

            history.borrow_mut().record_spin(&segment, wall_clock_ms());
            // The in-memory log is authoritative; this also replaces an unreadable document
            if let Err(e) = store.save_history(&history.borrow()) {
                log::warn!("Could not persist spin result: {}", e);
            }

            audio.cue(AudioCue::WinnerDecided);
            *last_winner.borrow_mut() = Some(segment.clone());
            observer.winner(&segment);
        });

        (on_frame, on_complete)
    }

    // === Prize management (between spins only) ===

    fn ensure_idle(&self) -> Result<()> {
        if self.driver.is_running() {
            Err(SpinError::AlreadySpinning)
        } else {
            Ok(())
        }
    }

    fn persist_prizes(&self) {
        if let Err(e) = self.store.save_prizes(&self.prizes) {
            log::warn!("Could not save prizes: {}", e);
        }
        self.redraw();
    }

    /// Add a prize at the end of the wheel
    ///
    /// A blank or default-gold color gets a random color instead.
    pub fn add_prize(&mut self, name: &str, color: &str, icon: &str, removable: bool) -> Result<SegmentId> {
        self.ensure_idle()?;
        let name = name.trim();
        if name.is_empty() {
            self.observer.notify(NoticeLevel::Error, "Prize name is required");
            return Err(SpinError::InvalidPrize("name is required".into()));
        }

        let color = color.trim().to_uppercase();
        let color = if color.is_empty() || color == DEFAULT_PRIZE_COLOR {
            crate::sim::random_hex_color(&mut self.rng)
        } else {
            color
        };
        let icon = match icon.trim() {
            "" => DEFAULT_PRIZE_ICON,
            icon => icon,
        };

        let id = self.prizes.push(name, &color, icon, removable);
        self.persist_prizes();
        self.observer
            .notify(NoticeLevel::Success, &format!("Prize \"{}\" added", name));
        Ok(id)
    }

    /// Duplicate the prize at `index`, placing the copy right after it
    pub fn duplicate_prize(&mut self, index: usize) -> Result<SegmentId> {
        self.ensure_idle()?;
        let id = self
            .prizes
            .duplicate(index)
            .ok_or_else(|| SpinError::InvalidPrize(format!("no prize at position {}", index)))?;
        self.persist_prizes();
        Ok(id)
    }

    /// Remove the prize at `index` after the user confirms
    ///
    /// Returns `Ok(false)` when the user declines.
    pub fn remove_prize(&mut self, index: usize) -> Result<bool> {
        self.ensure_idle()?;
        let name = match self.prizes.get(index) {
            Some(prize) => prize.name.clone(),
            None => return Err(SpinError::InvalidPrize(format!("no prize at position {}", index))),
        };
        if !self
            .observer
            .confirm(&format!("Remove prize \"{}\" from the wheel?", name))
        {
            return Ok(false);
        }
        self.prizes.remove(index);
        self.persist_prizes();
        self.observer.notify(NoticeLevel::Info, "Prize removed");
        Ok(true)
    }

    /// Move a prize to a new position
    pub fn move_prize(&mut self, from: usize, to: usize) -> Result<()> {
        self.ensure_idle()?;
        if !self.prizes.move_segment(from, to) {
            return Err(SpinError::InvalidPrize(format!(
                "cannot move position {} to {}",
                from, to
            )));
        }
        self.persist_prizes();
        Ok(())
    }

    /// Take the last winner off the wheel, if it is removable and still present
    pub fn remove_last_winner(&mut self) -> Result<bool> {
        self.ensure_idle()?;
        let Some(winner) = self.last_winner.borrow_mut().take() else {
            return Ok(false);
        };
        if !winner.removable {
            return Ok(false);
        }
        match self.prizes.remove_by_id(winner.id) {
            Some(removed) => {
                self.persist_prizes();
                self.observer.notify(
                    NoticeLevel::Info,
                    &format!("{} was removed from the wheel", removed.name),
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // === Settings ===

    /// Replace the settings; invalid settings are rejected and nothing changes
    ///
    /// A running spin keeps the configuration it was planned with.
    pub fn update_settings(&mut self, settings: WheelSettings) -> Result<()> {
        if let Err(e) = settings.validate() {
            self.observer.notify(NoticeLevel::Error, &e.to_string());
            return Err(e);
        }
        self.audio.configure(&settings.audio);
        self.settings = settings;
        if let Err(e) = self.store.save_settings(&self.settings) {
            log::warn!("Could not save settings: {}", e);
        }
        self.observer.notify(NoticeLevel::Success, "Settings saved");
        Ok(())
    }

    // === History ===

    /// Clear the history after the user confirms; `Ok(false)` when declined
    pub fn clear_history(&mut self) -> Result<bool> {
        if !self
            .observer
            .confirm("Are you sure you want to clear the whole spin history?")
        {
            return Ok(false);
        }
        self.history.borrow_mut().clear();
        if let Err(e) = self.store.clear_history() {
            log::warn!("Could not clear stored history: {}", e);
        }
        self.observer.notify(NoticeLevel::Info, "History cleared");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_INTERVAL_MS;
    use crate::persistence::{KeyValueStore, MemoryStore, keys};
    use crate::platform::ManualScheduler;
    use crate::sim::segment_under_pointer;

    #[derive(Default)]
    struct Probe {
        frames: Cell<usize>,
        last_frame: Cell<f64>,
        winners: RefCell<Vec<String>>,
        notices: RefCell<Vec<(NoticeLevel, String)>>,
        approve: Cell<bool>,
    }

    impl WheelObserver for Probe {
        fn frame(&self, rotation_deg: f64, _prizes: &PrizeSet) {
            self.frames.set(self.frames.get() + 1);
            self.last_frame.set(rotation_deg);
        }

        fn winner(&self, segment: &Segment) {
            self.winners.borrow_mut().push(segment.name.clone());
        }

        fn notify(&self, level: NoticeLevel, message: &str) {
            self.notices.borrow_mut().push((level, message.to_string()));
        }

        fn confirm(&self, _prompt: &str) -> bool {
            self.approve.get()
        }
    }

    #[derive(Default)]
    struct CueLog(RefCell<Vec<AudioCue>>);

    impl AudioSink for CueLog {
        fn cue(&self, cue: AudioCue) {
            self.0.borrow_mut().push(cue);
        }
    }

    /// Lets a test inspect storage the engine owns
    struct SharedStore(Rc<MemoryStore>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.0.remove(key)
        }
    }

    struct Rig {
        sched: Rc<ManualScheduler>,
        probe: Rc<Probe>,
        cues: Rc<CueLog>,
        engine: WheelEngine,
    }

    fn rig_with(store: Persistence) -> Rig {
        let sched = Rc::new(ManualScheduler::new());
        let probe = Rc::new(Probe::default());
        probe.approve.set(true);
        let cues = Rc::new(CueLog::default());
        let engine = WheelEngine::new(sched.clone(), store, 1234)
            .with_observer(probe.clone())
            .with_audio(cues.clone());
        Rig {
            sched,
            probe,
            cues,
            engine,
        }
    }

    fn rig() -> Rig {
        rig_with(Persistence::in_memory())
    }

    fn finish(rig: &Rig) {
        rig.sched.run_until_idle(FRAME_INTERVAL_MS, 10_000);
    }

    #[test]
    fn test_first_run_seeds_default_prizes() {
        let rig = rig();
        assert_eq!(rig.engine.prizes().len(), 4);
        assert!(rig.engine.history().is_empty());
        assert!(!rig.engine.is_spinning());
    }

    #[test]
    fn test_spin_completes_and_records() {
        let mut rig = rig();
        let plan = rig.engine.request_spin().unwrap().unwrap();
        assert!(rig.engine.is_spinning());
        finish(&rig);

        assert!(!rig.engine.is_spinning());
        assert_eq!(rig.engine.rotation_deg(), plan.target_rotation_deg);
        assert_eq!(rig.probe.last_frame.get(), plan.target_rotation_deg);
        assert_eq!(
            segment_under_pointer(rig.engine.rotation_deg(), 4),
            Some(plan.winning_index)
        );
        assert_eq!(*rig.probe.winners.borrow(), vec![plan.winning_segment.name.clone()]);
        assert_eq!(rig.engine.history().len(), 1);
        assert_eq!(rig.engine.history().list()[0].prize_name, plan.winning_segment.name);
        assert_eq!(rig.engine.last_winner(), Some(plan.winning_segment.clone()));
        assert_eq!(
            *rig.cues.0.borrow(),
            vec![AudioCue::SpinStarted, AudioCue::SpinEnded, AudioCue::WinnerDecided]
        );
        assert!(matches!(rig.engine.animation_state(), AnimationState::Completed { .. }));
    }

    #[test]
    fn test_history_is_persisted() {
        let backend = Rc::new(MemoryStore::new());

        let mut rig = rig_with(Persistence::new(SharedStore(backend.clone())));
        rig.engine.request_spin().unwrap();
        finish(&rig);
        rig.engine.request_spin().unwrap();
        finish(&rig);

        let stored = backend.get(keys::HISTORY).unwrap().unwrap();
        let log: SpinHistoryLog = serde_json::from_str(&stored).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.list()[0].id, 2);

        // A new engine over the same storage picks the history back up
        let again = rig_with(Persistence::new(SharedStore(backend)));
        assert_eq!(again.engine.history().len(), 2);
    }

    #[test]
    fn test_corrupt_stored_history_is_replaced() {
        let backend = Rc::new(MemoryStore::new());
        backend.set(keys::HISTORY, "garbage").unwrap();

        let mut rig = rig_with(Persistence::new(SharedStore(backend.clone())));
        assert!(rig.engine.history().is_empty());
        for _ in 0..3 {
            rig.engine.request_spin().unwrap();
            finish(&rig);
        }
        assert_eq!(rig.engine.history().len(), 3);

        let stored = backend.get(keys::HISTORY).unwrap().unwrap();
        let log: SpinHistoryLog = serde_json::from_str(&stored).unwrap();
        assert_eq!(log, *rig.engine.history());

        let again = rig_with(Persistence::new(SharedStore(backend)));
        assert_eq!(again.engine.history().len(), 3);
    }

    #[test]
    fn test_request_while_spinning_is_ignored() {
        let mut rig = rig();
        rig.engine.request_spin().unwrap().unwrap();
        rig.sched.advance(FRAME_INTERVAL_MS);
        assert!(rig.engine.request_spin().unwrap().is_none());
        assert_eq!(rig.sched.pending(), 1);
        finish(&rig);
        assert_eq!(rig.probe.winners.borrow().len(), 1);
    }

    #[test]
    fn test_empty_wheel_refuses_to_spin() {
        let mut rig = rig();
        for _ in 0..4 {
            rig.engine.remove_prize(0).unwrap();
        }
        assert!(rig.engine.prizes().is_empty());
        let result = rig.engine.request_spin();
        assert!(matches!(result, Err(SpinError::InvalidState(_))));
        assert_eq!(rig.engine.animation_state(), AnimationState::Idle);
        assert_eq!(rig.sched.pending(), 0);
        assert!(rig.cues.0.borrow().is_empty());
        assert!(
            rig.probe
                .notices
                .borrow()
                .iter()
                .any(|(level, _)| *level == NoticeLevel::Error)
        );
    }

    #[test]
    fn test_mutations_refused_mid_spin() {
        let mut rig = rig();
        rig.engine.request_spin().unwrap();
        assert!(matches!(rig.engine.remove_prize(0), Err(SpinError::AlreadySpinning)));
        assert!(matches!(rig.engine.move_prize(0, 1), Err(SpinError::AlreadySpinning)));
        assert!(matches!(
            rig.engine.add_prize("Hat", "", "", true),
            Err(SpinError::AlreadySpinning)
        ));
        assert!(matches!(rig.engine.duplicate_prize(0), Err(SpinError::AlreadySpinning)));
        assert_eq!(rig.engine.prizes().len(), 4);
        finish(&rig);
        assert!(rig.engine.duplicate_prize(0).is_ok());
    }

    #[test]
    fn test_declined_confirmation_has_no_effect() {
        let mut rig = rig();
        rig.engine.request_spin().unwrap();
        finish(&rig);

        rig.probe.approve.set(false);
        assert!(!rig.engine.remove_prize(0).unwrap());
        assert_eq!(rig.engine.prizes().len(), 4);
        assert!(!rig.engine.clear_history().unwrap());
        assert_eq!(rig.engine.history().len(), 1);

        rig.probe.approve.set(true);
        assert!(rig.engine.clear_history().unwrap());
        assert!(rig.engine.history().is_empty());
    }

    #[test]
    fn test_settings_change_does_not_touch_running_spin() {
        let mut rig = rig();
        let plan = rig.engine.request_spin().unwrap().unwrap();

        let mut settings = rig.engine.settings().clone();
        settings.spin.min_revolutions = 1;
        settings.spin.max_revolutions = 1;
        rig.engine.update_settings(settings).unwrap();

        finish(&rig);
        assert_eq!(rig.engine.rotation_deg(), plan.target_rotation_deg);

        let next = rig.engine.request_spin().unwrap().unwrap();
        assert_eq!(next.revolutions, 1);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut rig = rig();
        let mut settings = rig.engine.settings().clone();
        settings.spin.safe_margin_percent = 60.0;
        assert!(matches!(
            rig.engine.update_settings(settings),
            Err(SpinError::ConfigurationInvalid(_))
        ));
        assert_eq!(rig.engine.config().safe_margin_percent, 5.0);
    }

    #[test]
    fn test_add_prize_rules() {
        let mut rig = rig();
        assert!(matches!(
            rig.engine.add_prize("   ", "#123456", "", true),
            Err(SpinError::InvalidPrize(_))
        ));

        let id = rig.engine.add_prize("Hat", "#ffd700", "", true).unwrap();
        let hat = rig.engine.prizes().iter().find(|p| p.id == id).unwrap();
        assert_ne!(hat.color, DEFAULT_PRIZE_COLOR);
        assert_eq!(hat.icon, DEFAULT_PRIZE_ICON);
        assert_eq!(hat.order_index, 4);

        let id = rig.engine.add_prize("Mug", "#00ff00", "☕", false).unwrap();
        let mug = rig.engine.prizes().iter().find(|p| p.id == id).unwrap();
        assert_eq!(mug.color, "#00FF00");
    }

    #[test]
    fn test_respin_supersedes() {
        let mut rig = rig();
        rig.engine.request_spin().unwrap();
        for _ in 0..5 {
            rig.sched.advance(FRAME_INTERVAL_MS);
        }
        let mid = rig.engine.rotation_deg();
        let plan = rig.engine.respin().unwrap();
        assert_eq!(plan.start_rotation_deg, mid);
        assert_eq!(rig.sched.pending(), 1);
        finish(&rig);
        assert_eq!(rig.probe.winners.borrow().len(), 1);
        assert_eq!(rig.engine.rotation_deg(), plan.target_rotation_deg);
    }

    #[test]
    fn test_cancel_spin_records_nothing() {
        let mut rig = rig();
        rig.engine.request_spin().unwrap();
        rig.sched.advance(FRAME_INTERVAL_MS);
        assert!(rig.engine.cancel_spin());
        finish(&rig);
        assert!(rig.engine.history().is_empty());
        assert!(rig.probe.winners.borrow().is_empty());
        assert!(!rig.engine.cancel_spin());
    }

    #[test]
    fn test_remove_last_winner_respects_removable() {
        let mut rig = rig();
        // Keep spinning until a removable prize wins
        loop {
            rig.engine.request_spin().unwrap();
            finish(&rig);
            if rig.engine.last_winner().map(|w| w.removable) == Some(true) {
                break;
            }
        }
        let winner = rig.engine.last_winner().unwrap();
        assert!(rig.engine.remove_last_winner().unwrap());
        assert!(rig.engine.prizes().position_of(winner.id).is_none());
        assert!(!rig.engine.remove_last_winner().unwrap());
    }
}
