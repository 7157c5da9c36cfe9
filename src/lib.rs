//! # Retro Camcorder
//!
//! Turn a live camera feed into a VHS/camcorder-style video signal in real
//! time.
//!
//! Each frame goes through a fixed chain of analysis and synthesis passes:
//! motion and colour analysis, a 15-stage per-pixel kernel (shake,
//! interlace, tape wave and roll, lens warp, chroma smear, grading, bit
//! crush, vignette, noise, scanlines, tracking bands), then bloom, a seeded
//! lens damage layer and an optional date stamp. Temporal effects keep their
//! state in the [`RetroPipeline`] between frames.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use retro_camcorder::{
//!     presets::PresetRegistry,
//!     rng::live_source,
//!     session::LiveSession,
//!     video::{Facing, StillSource},
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let params = PresetRegistry::new().resolve("camcorder")?;
//! let source = StillSource::open("scene.png", Facing::Environment)?;
//! let mut session = LiveSession::new(source, params, 0x5eed);
//! let mut rng = live_source();
//!
//! if let Some(rendered) = session.tick(0.0, &mut rng)?.rendered() {
//!     rendered.frame.save_png("frame.png")?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`geometry`] - Canvas size and source crop
//! - [`analysis`] - Luma, colour temperature and corner motion. Only the
//!   frame corners are compared, so a subject moving mid-shot is not shake
//! - [`pipeline`] - Parameters, temporal state and the per-pixel stages
//! - [`overlay`] - Bloom, lens damage and date stamp passes
//! - [`rng`] - Pluggable randomness; seeded for reproducible runs, constant
//!   or scripted in tests
//! - [`ticker`] - 60 Hz display ticks and the effect frame-rate gate
//! - [`video`] - Frame buffers, frame sources and still capture
//! - [`session`] - Tick-driven live loop with capture and review
//! - [`presets`] - Named parameter sets
//! - [`config`] - Configuration management

pub mod analysis;
pub mod config;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod pipeline;
pub mod presets;
pub mod rng;
pub mod session;
pub mod ticker;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{RetroError, Result},
    pipeline::{FrameRequest, RenderedFrame, RetroParams, RetroPipeline},
    presets::PresetRegistry,
    session::{LiveSession, TickOutcome},
    video::Frame,
};
