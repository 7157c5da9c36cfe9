//! # Video Module
//!
//! Frame buffers, the sources raw frames come from, and still capture.

pub mod capture;
pub mod source;
pub mod types;

pub use capture::{encode_still, save_still, FlashMode};
pub use source::{load_frame, Facing, FrameSource, LimitedSource, SequenceSource, StillSource};
pub use types::Frame;
