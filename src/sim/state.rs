//! Animation state machine
//!
//! Pure, clock-agnostic: callers feed timestamps in, frames come out.
//! Scheduling lives in `driver`.

use serde::{Deserialize, Serialize};

use super::plan::SpinPlan;
use super::prize::Segment;
use crate::error::{Result, SpinError};

/// Cubic ease-out: fast start, smooth deceleration
#[inline]
pub fn ease_out_cubic(progress: f64) -> f64 {
    let inv = 1.0 - progress;
    1.0 - inv * inv * inv
}

/// Lifecycle of the wheel animation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum AnimationState {
    /// Nothing has run yet, or the last spin was cancelled
    #[default]
    Idle,
    /// A plan is being animated
    Running { plan: SpinPlan, start_ms: f64 },
    /// The last plan reached its target
    Completed { plan: SpinPlan },
}

/// Output of one evaluated frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub rotation_deg: f64,
    /// Linear time progress in [0, 1]
    pub progress: f64,
    /// Set on the terminal frame only
    pub winner: Option<Segment>,
}

impl AnimationState {
    pub fn is_running(&self) -> bool {
        matches!(self, AnimationState::Running { .. })
    }

    /// Plan currently animating or last completed
    pub fn plan(&self) -> Option<&SpinPlan> {
        match self {
            AnimationState::Idle => None,
            AnimationState::Running { plan, .. } | AnimationState::Completed { plan } => Some(plan),
        }
    }

    /// Enter `Running`; refused while another plan is running
    pub fn begin(&mut self, plan: SpinPlan, now_ms: f64) -> Result<()> {
        if self.is_running() {
            return Err(SpinError::AlreadySpinning);
        }
        *self = AnimationState::Running {
            plan,
            start_ms: now_ms,
        };
        Ok(())
    }

    /// Abandon a running plan (Running -> Idle)
    pub fn cancel(&mut self) -> Option<SpinPlan> {
        match std::mem::take(self) {
            AnimationState::Running { plan, .. } => Some(plan),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Evaluate the frame at `now_ms`; moves to `Completed` on the terminal frame
    pub fn advance(&mut self, now_ms: f64) -> Option<Frame> {
        let AnimationState::Running { plan, start_ms } = self else {
            return None;
        };

        let progress = if plan.duration_ms == 0 {
            1.0
        } else {
            ((now_ms - *start_ms) / plan.duration_ms as f64).clamp(0.0, 1.0)
        };

        if progress >= 1.0 {
            let rotation_deg = plan.target_rotation_deg;
            let winner = plan.winning_segment.clone();
            let AnimationState::Running { plan, .. } = std::mem::take(self) else {
                unreachable!("state checked above");
            };
            *self = AnimationState::Completed { plan };
            return Some(Frame {
                rotation_deg,
                progress,
                winner: Some(winner),
            });
        }

        let eased = ease_out_cubic(progress);
        let rotation_deg =
            plan.start_rotation_deg + (plan.target_rotation_deg - plan.start_rotation_deg) * eased;
        Some(Frame {
            rotation_deg,
            progress,
            winner: None,
        })
    }
}
