//! Low-level building blocks for custom correlation pipelines.
//!
//! These helpers expose the geometric transforms and the axis-subset FFT
//! used by the kernel, for callers composing their own frequency-domain
//! pipelines. Most users should prefer [`masked_cross_correlation`] and
//! [`register_translation`].
//!
//! [`masked_cross_correlation`]: crate::masked_cross_correlation
//! [`register_translation`]: crate::register_translation

pub use crate::fft::{fftn, ifftn, next_fast_len};
pub use crate::ndim::{centered, flip_axes};
