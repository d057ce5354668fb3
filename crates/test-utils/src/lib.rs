//! Shared test utilities for the mapout workspace.
//!
//! - Feature builders and canned bounding boxes ([`fixtures`])
//! - Deterministic feature pools ([`generators`])
//! - Temporary icon directories and workspace paths ([`assets`])
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod assets;
pub mod fixtures;
pub mod generators;

pub use assets::*;
pub use fixtures::*;
pub use generators::*;
