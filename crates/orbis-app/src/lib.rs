//! The Orbis application: window and event loop, frame pacing, and the data
//! loading that feeds the globe engine.

pub mod app;
pub mod frame_limiter;
pub mod loader;
