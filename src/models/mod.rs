//! Data models for the Learnpath platform.
//!
//! Field names serialize as camelCase to match the browser client.

mod course;
mod learning;
mod notification;
mod progress;
mod settings;
mod user;

pub use course::*;
pub use learning::*;
pub use notification::*;
pub use progress::*;
pub use settings::*;
pub use user::*;
