//! maskcorr computes masked normalized cross-correlation between
//! N-dimensional arrays.
//!
//! Each input carries a boolean validity mask; the correlation at every
//! offset is corrected for the amount of valid, mutually overlapping data
//! there, so missing, corrupted, or excluded samples never bias the result.
//! Correlation runs along a chosen subset of axes; remaining axes act as
//! independent batch dimensions. Optional parallelism is available via the
//! `rayon` feature and structured logging via the `tracing` feature.

pub mod fft;
pub mod lowlevel;
pub mod ndim;
pub mod register;
mod trace;
pub mod util;
pub mod xcorr;

pub use register::{register_translation, Shift};
pub use util::{MaskCorrError, MaskCorrResult};
pub use xcorr::{masked_cross_correlation, CorrelationMode, MnxcParams};
