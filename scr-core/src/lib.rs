pub mod engine;
pub mod error;
pub mod path;

pub use crate::engine::args::Arguments;
pub use crate::engine::host::{child_running, Host, ProcessHost};
pub use crate::engine::value::Value;
pub use crate::engine::{Engine, Outcome, Rules, ScriptRequest};
pub use crate::error::{Error, Result};
