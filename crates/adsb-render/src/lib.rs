//! Layout and refresh decisions for the bi-stable aircraft display.
//!
//! Nothing in here touches hardware: the engine emits [`Frame`]s and a
//! [`DrawSink`] presents them.

pub mod cadence;
pub mod doctor;
pub mod engine;
pub mod format;
pub mod frame;
pub mod layout;
pub mod names;

pub use cadence::{CadenceState, RefreshCadence, RefreshMode};
pub use engine::{ErrorInfo, RenderEngine};
pub use frame::{DrawOp, DrawSink, Font, Frame, RecordingSink};
pub use layout::{Layout, LayoutKind};
pub use names::{NameRegistry, NameTable};
