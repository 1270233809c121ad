//! Deterministic spin engine
//!
//! All wheel logic lives here. This module must stay pure and deterministic:
//! - Seeded RNG only, consumed entirely while planning
//! - Time enters only through the injected `Scheduler`
//! - No rendering, storage or audio dependencies

pub mod arc;
pub mod driver;
pub mod plan;
pub mod prize;
pub mod state;

pub use arc::{
    SliceArc, TargetAngle, effective_margin_deg, pointer_local_angle, resolve_target_angle,
    segment_under_pointer,
};
pub use driver::{AnimationDriver, CompletionHandler, FrameHandler};
pub use plan::{SpinPlan, plan};
pub use prize::{PrizeSet, Segment, SegmentId, random_hex_color};
pub use state::{AnimationState, Frame, ease_out_cubic};
