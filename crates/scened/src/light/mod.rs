//! Light state reproduction.
//!
//! Desired states flow through three stages:
//! - [`normalize`]: deprecated attribute names are rewritten to modern ones
//! - [`select`]: attributes are narrowed to what the color mode replays
//! - [`diff`]: the result is compared with the observed state to pick a command

pub mod attribute;
pub mod color_mode;
mod diff;
mod normalize;
mod select;
pub mod state;
pub mod tables;

pub use attribute::AttributeKey;
pub use attribute::Attributes;
pub use color_mode::ColorMode;
pub use diff::diff;
pub use diff::Decision;
pub use normalize::normalize;
pub use normalize::Normalized;
pub use select::select;
pub use state::Activation;
pub use state::Command;
pub use state::EntityState;
pub use tables::AttributeSpec;
