//! # Settings Module
//!
//! ## Purpose
//! Holds everything an activity calculation needs: which database to read, the
//! components and phases of the system, the state (T, P), the composition sweep,
//! where the experimental data lives and how the comparison plot looks.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "database": "data/cuzn.tdb",
//!   "components": ["CU", "ZN", "VA"],
//!   "phases": ["LIQUID", "FCC_A1"],
//!   "component": "ZN",
//!   "temperature": 1073.0,
//!   "pressure": 101325.0,
//!   "composition_range": { "start": 0.0, "stop": 1.0, "step": 0.005 },
//!   "gas_constant": 8.3145,
//!   "experimental_data": "data/zn_activity_1073K.json",
//!   "output": "activity_ZN_1073K.svg",
//!   "plot": { ... }
//! }
//! ```
//! Missing fields take their default values, so a file may override only a few of them.
//!
//! ## Usage Pattern
//! ```rust,no_run
//! use CalphadActivity::settings::ActivitySettings;
//!
//! let settings = ActivitySettings::load_or_default("activity_settings.json").unwrap();
//! println!("{} at {} K", settings.component, settings.temperature);
//! ```
use crate::Thermodynamics::ChemEquilibrium::SolutionModel::R;
use crate::Thermodynamics::ChemEquilibrium::conditions::{ConditionSet, StateVariable};
use crate::Utils::plots::PlotOptions;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// `(start, stop, step)` of the composition sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositionRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Default for CompositionRange {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: 1.0,
            step: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivitySettings {
    /// TDB file
    pub database: PathBuf,
    /// system components; `VA` may be listed and is ignored for mixing
    pub components: Vec<String>,
    pub phases: Vec<String>,
    /// component whose activity is calculated (swept in composition)
    pub component: String,
    /// K
    pub temperature: f64,
    /// Pa
    pub pressure: f64,
    pub composition_range: CompositionRange,
    /// J/(mol K)
    pub gas_constant: f64,
    pub experimental_data: Option<PathBuf>,
    pub plot: PlotOptions,
    /// SVG file the comparison plot is written to
    pub output: PathBuf,
}

impl Default for ActivitySettings {
    /// Cu–Zn at 1073 K, activity of Zn relative to pure Zn
    fn default() -> Self {
        Self {
            database: PathBuf::from("data/cuzn.tdb"),
            components: vec!["CU".to_string(), "ZN".to_string(), "VA".to_string()],
            phases: vec!["LIQUID".to_string(), "FCC_A1".to_string()],
            component: "ZN".to_string(),
            temperature: 1073.0,
            pressure: 101325.0,
            composition_range: CompositionRange::default(),
            gas_constant: R,
            experimental_data: Some(PathBuf::from("data/zn_activity_1073K.json")),
            plot: PlotOptions {
                title: "Zn activity in Cu-Zn, 1073 K".to_string(),
                x_label: "X(ZN)".to_string(),
                y_label: "Activity of Zn".to_string(),
                x_range: (0.0, 1.0),
                y_range: (0.0, 1.0),
                legend: true,
                aspect: Some(1.0),
                size: (700, 700),
            },
            output: PathBuf::from("activity_ZN_1073K.svg"),
        }
    }
}

impl ActivitySettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        let settings: ActivitySettings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// reads `path` if it exists, falls back to [`ActivitySettings::default`] otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if path.exists() {
            info!("reading settings from {}", path.display());
            Self::load(path)
        } else {
            info!("{} not found, using default settings", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn base_conditions(&self) -> ConditionSet {
        ConditionSet::new()
            .with(StateVariable::P, self.pressure)
            .with(StateVariable::T, self.temperature)
    }

    /// pure swept component at the same T and P
    pub fn reference_conditions(&self) -> ConditionSet {
        self.base_conditions()
            .with(StateVariable::X(self.component.to_uppercase()), 1.0)
    }

    /// composition sweep of the chosen component
    pub fn sweep_conditions(&self) -> ConditionSet {
        let r = self.composition_range;
        self.base_conditions().with(
            StateVariable::X(self.component.to_uppercase()),
            (r.start, r.stop, r.step),
        )
    }
}
