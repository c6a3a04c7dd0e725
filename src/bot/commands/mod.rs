//! Discord command implementations organized by feature.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Counting game commands (`/ct`)
pub mod counting;

/// General utility commands
pub mod general;

/// Haiku detection commands (`/haiku`)
pub mod haiku;

// Export commands
pub use counting::*;
pub use general::*;
pub use haiku::*;
