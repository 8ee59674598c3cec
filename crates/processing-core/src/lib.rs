//! Applicator Processing Core
//!
//! Turns a capture take into keyframes on a scene target:
//! - **Cadence:** Decide which ~60 fps capture frames land on the timeline
//! - **Neutral:** Calibrate per-signal baselines from a neutral-face take
//! - **Mapping:** Resolve mapping tables into morph, channel and rotation bindings
//! - **Transform:** Smooth, clamp, shift, scale and neutral-correct signal values
//! - **Walker:** Dispatch bindings across an actor or an item hierarchy
//! - **Pipeline:** Validate, plan and commit a complete run
//!
//! Everything except [`pipeline`] is pure computation over in-memory data.
//! Keys are planned in full before the first write reaches the sink.

pub mod cadence;
pub mod mapping;
pub mod neutral;
pub mod pipeline;
pub mod plan;
pub mod transform;
pub mod walker;

pub use cadence::CadencePattern;
pub use mapping::{MappingResolver, ResolvedMappings};
pub use neutral::NeutralProfile;
pub use pipeline::{Applicator, ApplySummary, PlannedApply};
pub use plan::KeyframePlan;
pub use transform::SignalTransformer;
pub use walker::{TargetWalker, WalkMode, WalkOutcome};
