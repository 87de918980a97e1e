//! Machine file loading
//!
//! ```toml
//! [link]
//! port = "/dev/ttyUSB0"
//!
//! [control]
//! gain = 1.2
//!
//! [[profile]]
//! name = "lead-free"
//! liquidus = 217.0
//! points = [[0, 25], [90, 150], [180, 180], [240, 245], [300, 25]]
//!
//! [[profile.phase]]
//! name = "preheat"
//! end = 90
//! ```
//!
//! Every section is optional. Each phase starts where the previous one
//! ended; the first starts at 0 s.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use reflow_core::config::{ConfigError, ControlConfig};
use reflow_core::profile::{Phase, PhaseKind, Profile, ProfileError, ProfilePoint};
use reflow_drivers::oven::DEFAULT_READ_TIMEOUT_MS;

/// Machine file shipped with the binary
const BUILTIN_CONFIG: &str = include_str!("../../machine.toml");

/// Default oven baud rate
pub const DEFAULT_BAUD: u32 = 9600;

/// Errors while loading the machine file
#[derive(Debug, Error)]
pub enum LoadError {
    /// File exists but could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Not valid TOML, or fields of the wrong type
    #[error("invalid machine file: {0}")]
    Parse(#[from] toml::de::Error),
    /// `[control]` values out of range
    #[error("invalid [control] section: {0}")]
    Control(#[from] ConfigError),
    /// `[link]` values out of range
    #[error("invalid [link] section: `{0}` is out of range")]
    Link(&'static str),
}

/// Serial link settings from `[link]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkSettings {
    /// Port to connect at start-up (`fake` for the simulator)
    pub port: Option<String>,
    /// Line speed (bits per second)
    pub baud: u32,
    /// Wait for a temperature reply (ms)
    pub read_timeout_ms: u32,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            port: None,
            baud: DEFAULT_BAUD,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl LinkSettings {
    fn validate(&self) -> Result<(), LoadError> {
        if self.baud == 0 {
            return Err(LoadError::Link("baud"));
        }
        if self.read_timeout_ms == 0 {
            return Err(LoadError::Link("read_timeout_ms"));
        }
        Ok(())
    }
}

/// Validated machine configuration
#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub link: LinkSettings,
    pub control: ControlConfig,
    /// Profiles that passed validation, in file order
    pub profiles: Vec<Profile>,
    /// Profiles that were dropped, with the reason
    pub skipped: Vec<(String, ProfileError)>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MachineFile {
    link: LinkSettings,
    control: ControlConfig,
    #[serde(rename = "profile")]
    profiles: Vec<ProfileSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileSection {
    name: String,
    #[serde(default)]
    liquidus: Option<f32>,
    /// `[elapsed_s, target_c]` pairs
    points: Vec<[f32; 2]>,
    #[serde(default, rename = "phase")]
    phases: Vec<PhaseSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PhaseSection {
    name: String,
    #[serde(default)]
    kind: PhaseKind,
    end: f32,
    #[serde(default)]
    max_slope: Option<f32>,
}

impl ProfileSection {
    fn build(&self) -> Result<Profile, ProfileError> {
        let points: Vec<ProfilePoint> = self
            .points
            .iter()
            .map(|&[elapsed_s, target_c]| ProfilePoint::new(elapsed_s, target_c))
            .collect();

        let mut phases = Vec::with_capacity(self.phases.len());
        let mut start_s = 0.0;
        for section in &self.phases {
            let mut phase = Phase::try_new(&section.name, section.kind, start_s, section.end)?;
            if let Some(max_slope) = section.max_slope {
                phase = phase.with_max_slope(max_slope);
            }
            start_s = section.end;
            phases.push(phase);
        }

        Profile::new(&self.name, &points, &phases, self.liquidus)
    }
}

/// Parse and validate a machine file
///
/// Invalid profiles are collected in [`MachineConfig::skipped`] rather than
/// failing the whole file. So are profiles whose targets reach the safety
/// ceiling, and later profiles reusing an earlier name.
pub fn parse_config(text: &str) -> Result<MachineConfig, LoadError> {
    let file: MachineFile = toml::from_str(text)?;
    file.link.validate()?;
    file.control.validate()?;

    let mut profiles: Vec<Profile> = Vec::new();
    let mut skipped = Vec::new();
    for section in &file.profiles {
        if profiles.iter().any(|p| p.name() == section.name) {
            skipped.push((section.name.clone(), ProfileError::DuplicateName));
            continue;
        }
        let result = section
            .build()
            .and_then(|p| p.check_against(file.control.safety_ceiling_c).map(|_| p));
        match result {
            Ok(profile) => profiles.push(profile),
            Err(e) => skipped.push((section.name.clone(), e)),
        }
    }

    Ok(MachineConfig {
        link: file.link,
        control: file.control,
        profiles,
        skipped,
    })
}

/// Load the machine file at `path`
///
/// A missing file falls back to the built-in configuration. Skipped
/// profiles are logged.
pub fn load_config(path: &Path) -> Result<MachineConfig, LoadError> {
    let config = match fs::read_to_string(path) {
        Ok(text) => {
            info!("Loading configuration from {}", path.display());
            parse_config(&text)?
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(
                "No machine file at {}, using built-in configuration",
                path.display()
            );
            parse_config(BUILTIN_CONFIG)?
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    for (name, reason) in &config.skipped {
        warn!("Skipping profile '{}': {}", name, reason);
    }
    Ok(config)
}
