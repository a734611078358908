//! sp-graph: the per-sample processing graph.
//!
//! ## Modules
//! - `condition` — `Condition` and the process-wide `ConditionRegistry`
//! - `route` — a capture-to-render path, its own filter chain and conditions
//! - `input` — one capture channel and the routes it feeds
//! - `output` — one render channel's own filter chain, mute flag and clip
//!   metering

pub mod condition;
pub mod input;
pub mod output;
pub mod route;

pub use condition::{Condition, ConditionRegistry};
pub use input::Input;
pub use output::Output;
pub use route::Route;
