//! Frame scheduling capability
//!
//! The animation driver never touches a display loop directly; it asks a
//! `Scheduler` for "call me on the next frame" and may revoke that request.

use std::cell::RefCell;

/// Callback run on a frame, receiving the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Handle for a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(pub u64);

/// Per-frame scheduling primitive
pub trait Scheduler {
    /// Current time on the frame clock (milliseconds)
    fn now(&self) -> f64;

    /// Run `callback` once on the next frame
    fn schedule_frame(&self, callback: FrameCallback) -> FrameToken;

    /// Revoke a scheduled callback; unknown or already-run tokens are ignored
    fn cancel(&self, token: FrameToken);
}

struct ManualQueue {
    now: f64,
    next_token: u64,
    pending: Vec<(FrameToken, FrameCallback)>,
}

/// Deterministic scheduler driven by explicit clock advances
///
/// Used by tests and the native build.
pub struct ManualScheduler {
    queue: RefCell<ManualQueue>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    pub fn starting_at(now_ms: f64) -> Self {
        Self {
            queue: RefCell::new(ManualQueue {
                now: now_ms,
                next_token: 1,
                pending: Vec::new(),
            }),
        }
    }

    /// Number of callbacks waiting for a frame
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Move the clock forward and run one frame
    ///
    /// Only callbacks scheduled before this call run; callbacks they schedule
    /// wait for the next frame. Returns the number of callbacks run.
    pub fn advance(&self, dt_ms: f64) -> usize {
        let (now, boundary) = {
            let mut q = self.queue.borrow_mut();
            q.now += dt_ms;
            (q.now, q.next_token)
        };

        let mut ran = 0;
        loop {
            // Re-check the queue each time: a callback may cancel a sibling
            let next = {
                let mut q = self.queue.borrow_mut();
                q.pending
                    .iter()
                    .position(|(token, _)| token.0 < boundary)
                    .map(|i| q.pending.remove(i))
            };
            let Some((_, callback)) = next else { break };
            callback(now);
            ran += 1;
        }
        ran
    }

    /// Advance frame by frame until nothing is pending or `max_frames` is hit
    ///
    /// Returns the number of frames stepped.
    pub fn run_until_idle(&self, dt_ms: f64, max_frames: usize) -> usize {
        let mut frames = 0;
        while self.pending() > 0 && frames < max_frames {
            self.advance(dt_ms);
            frames += 1;
        }
        frames
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.queue.borrow().now
    }

    fn schedule_frame(&self, callback: FrameCallback) -> FrameToken {
        let mut q = self.queue.borrow_mut();
        let token = FrameToken(q.next_token);
        q.next_token += 1;
        q.pending.push((token, callback));
        token
    }

    fn cancel(&self, token: FrameToken) {
        let removed = {
            let mut q = self.queue.borrow_mut();
            q.pending
                .iter()
                .position(|(t, _)| *t == token)
                .map(|i| q.pending.remove(i))
        };
        // Drop the callback outside the borrow; it may own handles to us
        drop(removed);
    }
}
