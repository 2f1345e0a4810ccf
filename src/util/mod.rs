//! Shared utility helpers.

pub mod error;
pub(crate) mod reduce;

pub use error::{MaskCorrError, MaskCorrResult};
