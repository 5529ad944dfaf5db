//! Core types shared across the whole pipeline.

pub mod error;

pub use error::DepcmakeError;
