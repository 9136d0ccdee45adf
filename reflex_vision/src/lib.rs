// THEORY:
// This file is the public entry point for the `reflex_vision` library crate.
// The crate is a perception-action engine for a reflex timing mini-game: it
// watches a small screen region, tracks two colored circular markers, and
// sends a key press on the exact frame the moving marker enters the fixed
// marker's effective radius.
//
// The high-level surface is `bot::ReflexBot` (start/stop/is-running) plus
// `pipeline::ReflexPipeline` for anyone who wants the per-frame decision
// logic without the I/O. The detection internals live in `core_modules` and
// the side-effecting layers (capture, input, overlay, templates) each get
// their own module so they can be swapped or stubbed independently.

pub mod bot;
pub mod capture;
pub mod core_modules;
pub mod idle_guard;
pub mod input;
pub mod overlay;
pub mod pipeline;
pub mod templates;

pub use bot::ReflexBot;
pub use idle_guard::IdleGuard;
pub use pipeline::{FrameReport, ReflexConfig, ReflexPipeline};
