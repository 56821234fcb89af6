//! Common utilities module
//!
//! This module contains shared utilities used across the decoding pipeline.

pub mod bits;
pub mod bytes;
pub mod error;

pub use error::{Cr2Error, Result};
