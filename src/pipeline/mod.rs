//! # Effect Pipeline
//!
//! Turns a raw camera frame into the degraded output frame. The stages run
//! in a fixed order over every output pixel:
//!
//! 1. jitter trigger
//! 2. interlace
//! 3. horizontal wave
//! 4. vertical roll
//! 5. lens warp
//! 6. channel fetch (sharpen, bleed, fringe)
//! 7. hue rotation
//! 8. saturation / contrast / brightness
//! 9. flash
//! 10. bit crush
//! 11. vignette
//! 12. noise
//! 13. scanlines
//! 14. tracking band
//! 15. clamp and store
//!
//! followed by the bloom, lens damage and date stamp overlays. The
//! per-pixel helpers in `stages` are pure; the engine owns the loop and the
//! temporal state.

pub mod engine;
pub mod params;
pub mod stages;
pub mod state;

pub use engine::{FrameRequest, RenderedFrame, RetroPipeline};
pub use params::{ParamSpec, ParamValue, RetroParams, PARAM_SPECS};
pub use state::TemporalState;
