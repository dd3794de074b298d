//! # Kinematic Monitor Core Library
//!
//! Windowed kinematic analysis and anomaly triggering over streams of 2D pose keypoints.
//! An external pose model produces one [`core::JointRecord`] per frame; a
//! [`engine::StreamAnalyzer`] buffers the recent frames, computes smoothness, stability and
//! coordination metrics, and hands frames that look abnormal to a [`core::TriggerSink`].
//!
//! ## Crate Structure
//!
//! - **`analysis`**: Pure metric functions: joint geometry, finite-difference kinematics,
//!   stability indices, spline trajectory smoothness, Welch spectra, PCA coordination, DTW and
//!   the joint-angle-dynamics report.
//! - **`config`**: `MonitorConfig`, loaded from TOML plus environment overrides with `figment`.
//! - **`core`**: Keypoint records, per-frame reports, trigger events and the sink trait.
//! - **`data`**: The bounded window buffer, trigger sinks, the metrics CSV writer and the sink
//!   registry.
//! - **`engine`**: The per-stream analyzer tying buffers, metrics and the trigger together.
//! - **`error`**: The `MonitorError` enum shared by the whole crate.
//! - **`logging`**: `tracing-subscriber` initialization.
//! - **`replay`**: Offline replay of exported keypoint CSV files.
//! - **`trigger`**: The cooldown-gated trigger controller.
//! - **`validation`**: Small reusable checks used by configuration validation.

pub mod analysis;
pub mod config;
pub mod core;
pub mod data;
pub mod engine;
pub mod error;
pub mod logging;
pub mod replay;
pub mod trigger;
pub mod validation;

pub use crate::config::MonitorConfig;
pub use crate::core::{JointRecord, MetricReport, Point2, TriggerEvent, TriggerSink};
pub use crate::engine::StreamAnalyzer;
pub use crate::error::{MonitorError, MonitorResult};
