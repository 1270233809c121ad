//! Scheduler-driven animation of a spin plan
//!
//! One flight at a time. Each launch bumps a generation counter; frame
//! callbacks carry the generation they were scheduled for and do nothing if it
//! is stale. User callbacks always run with no internal borrow held, so they
//! may cancel or start spins themselves.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::plan::SpinPlan;
use super::prize::Segment;
use super::state::AnimationState;
use crate::error::{Result, SpinError};
use crate::platform::{FrameToken, Scheduler};

/// Receives the wheel rotation on every frame
pub type FrameHandler = Box<dyn FnMut(f64)>;
/// Receives the winning segment once, after the final frame
pub type CompletionHandler = Box<dyn FnOnce(Segment)>;

struct Flight {
    generation: u64,
    token: Option<FrameToken>,
    on_frame: Option<FrameHandler>,
    on_complete: Option<CompletionHandler>,
}

#[derive(Default)]
struct DriverCore {
    state: AnimationState,
    generation: u64,
    flight: Option<Flight>,
}

/// Time-driven state machine executing one `SpinPlan` at a time
pub struct AnimationDriver {
    scheduler: Rc<dyn Scheduler>,
    core: Rc<RefCell<DriverCore>>,
}

impl AnimationDriver {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            core: Rc::new(RefCell::new(DriverCore::default())),
        }
    }

    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    /// Snapshot of the current animation state
    pub fn state(&self) -> AnimationState {
        self.core.borrow().state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.core.borrow().state.is_running()
    }

    /// Start animating `plan`; refused with `AlreadySpinning` while a plan runs
    pub fn start(
        &self,
        plan: SpinPlan,
        on_frame: impl FnMut(f64) + 'static,
        on_complete: impl FnOnce(Segment) + 'static,
    ) -> Result<()> {
        if self.is_running() {
            return Err(SpinError::AlreadySpinning);
        }
        self.launch(plan, Box::new(on_frame), Box::new(on_complete));
        Ok(())
    }

    /// Supersede any running plan with `plan`
    ///
    /// The old frame is unscheduled before the new one is scheduled, and the
    /// old completion handler is dropped without being called.
    pub fn replace(
        &self,
        plan: SpinPlan,
        on_frame: impl FnMut(f64) + 'static,
        on_complete: impl FnOnce(Segment) + 'static,
    ) -> Option<SpinPlan> {
        let superseded = self.cancel();
        self.launch(plan, Box::new(on_frame), Box::new(on_complete));
        superseded
    }

    /// Stop a running plan without completing it (Running -> Idle)
    pub fn cancel(&self) -> Option<SpinPlan> {
        let (flight, plan) = {
            let mut core = self.core.borrow_mut();
            core.generation += 1;
            let plan = core.state.cancel();
            (core.flight.take(), plan)
        };
        if let Some(token) = flight.as_ref().and_then(|f| f.token) {
            self.scheduler.cancel(token);
        }
        if let Some(plan) = &plan {
            log::info!("Spin cancelled (winner would have been {:?})", plan.winning_segment.name);
        }
        plan
    }

    fn launch(&self, plan: SpinPlan, on_frame: FrameHandler, on_complete: CompletionHandler) {
        let now = self.scheduler.now();
        log::info!(
            "Spin started: {} revolutions over {} ms toward {:?}",
            plan.revolutions,
            plan.duration_ms,
            plan.winning_segment.name
        );

        let (generation, stale) = {
            let mut core = self.core.borrow_mut();
            core.generation += 1;
            let generation = core.generation;
            let stale = core.flight.take();
            core.state = AnimationState::Running {
                plan,
                start_ms: now,
            };
            core.flight = Some(Flight {
                generation,
                token: None,
                on_frame: Some(on_frame),
                on_complete: Some(on_complete),
            });
            (generation, stale)
        };

        // Never leave two frame loops alive
        if let Some(token) = stale.as_ref().and_then(|f| f.token) {
            self.scheduler.cancel(token);
        }
        drop(stale);

        schedule_next(&self.core, &self.scheduler, generation);
    }
}

impl Drop for AnimationDriver {
    fn drop(&mut self) {
        let flight = self.core.borrow_mut().flight.take();
        if let Some(token) = flight.as_ref().and_then(|f| f.token) {
            self.scheduler.cancel(token);
        }
    }
}

fn schedule_next(core: &Rc<RefCell<DriverCore>>, scheduler: &Rc<dyn Scheduler>, generation: u64) {
    let weak_core: Weak<RefCell<DriverCore>> = Rc::downgrade(core);
    let weak_scheduler: Weak<dyn Scheduler> = Rc::downgrade(scheduler);

    let token = scheduler.schedule_frame(Box::new(move |now| {
        let (Some(core), Some(scheduler)) = (weak_core.upgrade(), weak_scheduler.upgrade()) else {
            return;
        };
        run_frame(&core, &scheduler, generation, now);
    }));

    let accepted = {
        let mut c = core.borrow_mut();
        match c.flight.as_mut() {
            Some(flight) if flight.generation == generation => {
                flight.token = Some(token);
                true
            }
            _ => false,
        }
    };
    if !accepted {
        scheduler.cancel(token);
    }
}

fn run_frame(core: &Rc<RefCell<DriverCore>>, scheduler: &Rc<dyn Scheduler>, generation: u64, now: f64) {
    let (frame, mut on_frame, on_complete) = {
        let mut c = core.borrow_mut();
        if c.generation != generation {
            log::trace!("Dropping stale frame (generation {})", generation);
            return;
        }
        let Some(frame) = c.state.advance(now) else {
            return;
        };
        if frame.winner.is_some() {
            // Terminal frame: the finished plan owns its completion from here
            // on, whatever the frame handler launches or cancels
            match c.flight.take() {
                Some(flight) => (frame, flight.on_frame, flight.on_complete),
                None => (frame, None, None),
            }
        } else {
            let on_frame = c.flight.as_mut().and_then(|f| {
                f.token = None;
                f.on_frame.take()
            });
            (frame, on_frame, None)
        }
    };

    if let Some(handler) = on_frame.as_mut() {
        handler(frame.rotation_deg);
    }

    match frame.winner {
        None => {
            let mut c = core.borrow_mut();
            if c.generation != generation {
                // The frame handler cancelled or replaced this flight
                return;
            }
            if let Some(flight) = c.flight.as_mut() {
                flight.on_frame = on_frame;
            }
            drop(c);
            schedule_next(core, scheduler, generation);
        }
        Some(winner) => {
            drop(on_frame);
            log::info!("Spin finished: {:?}", winner.name);
            if let Some(done) = on_complete {
                done(winner);
            }
        }
    }
}
