//! Utility modules
//!
//! - [`email`]: Email address splitting for request parameters
//! - [`placeholders`]: Placeholder expansion for payload strings

pub mod email;
pub mod placeholders;

pub use email::split_email;
pub use placeholders::expand_placeholders;
