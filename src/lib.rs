//! Intraday Direction Engine
//!
//! A stream-driven intraday trend-following decision core: per-bar OHLC
//! observations in, direction classification and discrete trade intent
//! signals out. Order execution, charting, and session calendars are
//! external collaborators.

pub mod classifier;
pub mod config;
pub mod data;
pub mod engine;
pub mod indicators;
pub mod momentum;
pub mod stats;
pub mod swing;
pub mod types;
pub mod window;

pub use config::Config;
pub use engine::{DirectionEngine, EngineError};
pub use types::*;
