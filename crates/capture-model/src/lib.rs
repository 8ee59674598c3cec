//! Applicator Capture Model
//!
//! Defines the data contracts the applicator works with:
//! - **Takes:** Capture files read as ordered frames of raw signal strings
//! - **Signals:** The ARKit blendshape and rotation catalogue
//! - **Mapping tables:** User-authored rows binding signals to scene targets
//! - **Scene:** Read-only target abstraction implemented by the host
//! - **Keyframes:** Key writes and the sinks that receive them
//!
//! Capture values stay as the text the capture app wrote; numeric
//! interpretation happens in the processing core.

pub mod keyframes;
pub mod mapping_table;
pub mod scene;
pub mod scene_graph;
pub mod signals;
pub mod take;

pub use keyframes::*;
pub use mapping_table::*;
pub use scene::*;
pub use scene_graph::*;
pub use signals::*;
pub use take::*;
