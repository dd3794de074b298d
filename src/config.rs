//! Configuration loading using Figment.
//!
//! Configuration is loaded from:
//! 1. a TOML file (base configuration)
//! 2. environment variables prefixed with `KINEMATIC_MONITOR_`, nested with `__`
//!
//! Every section has defaults, so a file only needs the keys it changes. The defaults
//! reproduce the constants of the gait experiments this engine was tuned on.
//!
//! # Example
//! ```no_run
//! use kinematic_monitor::config::MonitorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::load_from("config/monitor.toml")?;
//! config.validate()?;
//! println!("Window: {} frames", config.analysis.window_size);
//! # Ok(())
//! # }
//! ```
//!
//! Environment override: `KINEMATIC_MONITOR_TRIGGER__COOLDOWN_FRAMES=60`.

use crate::analysis::geometry::{AngleUnit, Connection, JointTriple, COCO_SKELETON};
use crate::core::COCO_JOINT_COUNT;
use crate::error::{MonitorError, MonitorResult};
use crate::logging::OutputFormat;
use crate::validation;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "KINEMATIC_MONITOR_";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub application: ApplicationConfig,
    pub analysis: AnalysisConfig,
    pub trigger: TriggerConfig,
    pub skeleton: SkeletonConfig,
    pub joints: JointsConfig,
    pub storage: StorageConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: OutputFormat,
}

/// Windowing and metric parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Capacity of every window buffer, in frames.
    pub window_size: usize,
    /// Frame rate used as the derivative sample interval.
    pub fps: f64,
    /// Keypoints per record.
    pub joint_count: usize,
    /// Unit of the tracked angle series that feeds motion smoothness.
    pub angle_unit: AngleUnit,
    /// Joint chain whose angle feeds motion smoothness (shoulder-elbow-wrist by default).
    pub tracked_angle: JointTriple,
    /// Joint whose trajectory is scored for spline smoothness; `None` disables it.
    pub trajectory_joint: Option<usize>,
    /// Residual bound of the smoothing spline fit.
    pub spline_smoothing: f64,
    /// Average only detected joints into the center of mass.
    pub com_valid_joints_only: bool,
    /// Compute joint angle dynamics whenever the frame window is full.
    pub jad_enabled: bool,
    /// Longest Welch segment; shorter series use one segment of their own length.
    pub spectral_segment_len: usize,
}

/// Trigger thresholds and cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub smoothness_threshold: f64,
    pub msi_threshold: f64,
    pub cooldown_frames: u64,
}

/// Limb graph used by the dynamic coordination ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonConfig {
    pub connections: Vec<Connection>,
}

/// Named joint chains analysed by the JAD engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointsConfig {
    pub triples: BTreeMap<String, JointTriple>,
}

/// Where the CLI puts its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
    /// Registered trigger sink name (csv, json or log).
    pub sink: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "kinematic-monitor".to_string(),
            log_level: "info".to_string(),
            log_format: OutputFormat::Pretty,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: 30,
            fps: 30.0,
            joint_count: COCO_JOINT_COUNT,
            angle_unit: AngleUnit::Degrees,
            tracked_angle: JointTriple::new(5, 7, 9),
            trajectory_joint: Some(10),
            spline_smoothing: 1e-3,
            com_valid_joints_only: false,
            jad_enabled: true,
            spectral_segment_len: 256,
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            smoothness_threshold: 5.0,
            msi_threshold: 10.0,
            cooldown_frames: 30,
        }
    }
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            connections: COCO_SKELETON.to_vec(),
        }
    }
}

impl Default for JointsConfig {
    fn default() -> Self {
        let triples = [
            ("hip", JointTriple::new(11, 12, 13)),
            ("knee", JointTriple::new(12, 13, 14)),
            ("ankle", JointTriple::new(13, 14, 15)),
        ]
        .into_iter()
        .map(|(name, triple)| (name.to_string(), triple))
        .collect();
        Self { triples }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            sink: "csv".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Defaults merged with environment overrides only.
    pub fn load() -> MonitorResult<Self> {
        Ok(Self::figment().extract()?)
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load_from<P: AsRef<Path>>(path: P) -> MonitorResult<Self> {
        Ok(Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?)
    }

    /// Renders the configuration as TOML, e.g. to seed a config file from the defaults.
    pub fn to_toml(&self) -> MonitorResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| MonitorError::Configuration(format!("Failed to render TOML: {e}")))
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> MonitorResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.to_lowercase().as_str()) {
            return Err(MonitorError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        let analysis = &self.analysis;
        check("analysis.window_size", validation::is_nonzero(analysis.window_size))?;
        check("analysis.fps", validation::is_positive_finite(analysis.fps))?;
        check("analysis.joint_count", validation::is_nonzero(analysis.joint_count))?;
        check(
            "analysis.spline_smoothing",
            validation::is_in_range(analysis.spline_smoothing, 0.0..=f64::MAX),
        )?;
        check(
            "analysis.spectral_segment_len",
            validation::is_in_range(analysis.spectral_segment_len, 2..=usize::MAX),
        )?;
        self.check_triple("analysis.tracked_angle", analysis.tracked_angle)?;
        if let Some(joint) = analysis.trajectory_joint {
            check(
                "analysis.trajectory_joint",
                validation::is_valid_joint(joint, analysis.joint_count),
            )?;
        }

        check(
            "trigger.smoothness_threshold",
            validation::is_finite(self.trigger.smoothness_threshold),
        )?;
        check(
            "trigger.msi_threshold",
            validation::is_finite(self.trigger.msi_threshold),
        )?;

        if self.skeleton.connections.is_empty() {
            return Err(MonitorError::Configuration(
                "skeleton.connections must define at least one limb".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for &(start, end) in &self.skeleton.connections {
            check(
                "skeleton.connections",
                validation::is_valid_joint(start, analysis.joint_count)
                    .and(validation::is_valid_joint(end, analysis.joint_count))
                    .and(validation::is_distinct_chain(&[start, end])),
            )?;
            if !seen.insert((start.min(end), start.max(end))) {
                return Err(MonitorError::Configuration(format!(
                    "skeleton.connections: duplicate limb ({start}, {end})"
                )));
            }
        }

        for (name, triple) in &self.joints.triples {
            check("joints.triples", validation::is_not_empty(name))?;
            self.check_triple(&format!("joints.triples.{name}"), *triple)?;
        }

        check("storage.sink", validation::is_not_empty(&self.storage.sink))?;
        Ok(())
    }

    fn check_triple(&self, field: &str, triple: JointTriple) -> MonitorResult<()> {
        let joints = triple.joints();
        for joint in joints {
            check(
                field,
                validation::is_valid_joint(joint, self.analysis.joint_count),
            )?;
        }
        check(field, validation::is_distinct_chain(&joints))
    }
}

fn check(field: &str, result: Result<(), &'static str>) -> MonitorResult<()> {
    result.map_err(|reason| MonitorError::Configuration(format!("{field} {reason}")))
}
