//! Kinematic metrics over buffered joint data.
//!
//! Everything here is a pure function (or a small stateful helper that only caches FFT
//! plans), so each metric can be used and tested without a running [`StreamAnalyzer`].
//!
//! [`StreamAnalyzer`]: crate::engine::StreamAnalyzer
pub mod coordination;
pub mod derivatives;
pub mod dtw;
pub mod geometry;
pub mod jad;
pub mod spectral;
pub mod spline;
pub mod stability;
pub mod stats;
pub mod sweep;
pub mod trajectory;
