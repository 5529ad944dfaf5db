//! Cross-cutting helpers: filesystem operations and progress reporting.

pub mod fs;
pub mod progress;
