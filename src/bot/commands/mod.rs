//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// Operator notification commands
pub mod notify;

// Export commands
pub use general::*;
pub use notify::*;
