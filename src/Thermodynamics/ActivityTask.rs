//! # Activity task
//!
//! One forward pass from a thermodynamic database to a comparison plot:
//!
//! 1. `load_database()` - read the TDB file named in the settings
//! 2. `calculate_reference()` - equilibrium of the pure component at (T, P)
//! 3. `calculate_sweep()` - equilibrium along the composition range
//! 4. `calculate_activity()` - a(x) = exp((μ(x) - μ_ref)/(R T))
//! 5. `load_experimental()` - optional experimental points
//! 6. `plot()` - calculated line and experimental markers
//!
//! `run()` performs all steps in this order.
//!
//! ## Example
//! ```rust,no_run
//! use CalphadActivity::Thermodynamics::ActivityTask::ActivityTask;
//! use CalphadActivity::Thermodynamics::ChemEquilibrium::EquilibriumSolver::LowestGibbsSolver;
//! use CalphadActivity::Utils::plots::SvgPlotRenderer;
//! use CalphadActivity::settings::ActivitySettings;
//!
//! let settings = ActivitySettings::default();
//! let renderer = SvgPlotRenderer::new(&settings.output);
//! let mut task = ActivityTask::new(settings);
//! task.run(&LowestGibbsSolver::new(), &renderer).unwrap();
//! task.pretty_print();
//! ```
use super::Activity::{ActivityCurve, ActivityError};
use super::ChemEquilibrium::EquilibriumResult::{EquilibriumResult, SelectionError};
use super::ChemEquilibrium::EquilibriumSolver::{EquilibriumError, EquilibriumSolver};
use super::DBhandlers::TDBdata::{Database, TdbError};
use crate::Utils::load_from_file::{DataError, ExperimentalSeries};
use crate::Utils::plots::{PlotError, PlotRenderer, Series};
use crate::settings::ActivitySettings;
use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActivityTaskError {
    #[error(transparent)]
    Database(#[from] TdbError),
    #[error(transparent)]
    Equilibrium(#[from] EquilibriumError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Activity(#[from] ActivityError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Plot(#[from] PlotError),
    #[error("reference calculation returned {0} points, expected exactly one")]
    ReferencePoints(usize),
    #[error("{0} must be done first")]
    NotReady(&'static str),
}

pub struct ActivityTask {
    pub settings: ActivitySettings,
    pub database: Option<Database>,
    pub reference: Option<EquilibriumResult>,
    pub sweep: Option<EquilibriumResult>,
    pub curve: Option<ActivityCurve>,
    pub experimental: Option<ExperimentalSeries>,
}

impl ActivityTask {
    pub fn new(settings: ActivitySettings) -> Self {
        Self {
            settings,
            database: None,
            reference: None,
            sweep: None,
            curve: None,
            experimental: None,
        }
    }

    /// uses an already loaded database instead of reading the settings' file
    pub fn with_database(settings: ActivitySettings, database: Database) -> Self {
        let mut task = Self::new(settings);
        task.database = Some(database);
        task
    }

    pub fn load_database(&mut self) -> Result<&Database, ActivityTaskError> {
        let db = Database::load(&self.settings.database)?;
        let missing = db.undefined_references();
        if !missing.is_empty() {
            warn!("database references undefined functions: {:?}", missing);
        }
        Ok(&*self.database.insert(db))
    }

    fn database(&self) -> Result<&Database, ActivityTaskError> {
        self.database
            .as_ref()
            .ok_or(ActivityTaskError::NotReady("load_database()"))
    }

    /// chemical potential of the component in its pure state
    pub fn calculate_reference(
        &mut self,
        solver: &dyn EquilibriumSolver,
    ) -> Result<f64, ActivityTaskError> {
        let db = self.database()?;
        let conditions = self.settings.reference_conditions();
        let result = solver.equilibrium(
            db,
            &self.settings.components,
            &self.settings.phases,
            &conditions,
        )?;
        if result.len() != 1 {
            return Err(ActivityTaskError::ReferencePoints(result.len()));
        }
        let mu_ref = result.chemical_potential(&self.settings.component)?[0];
        info!(
            "reference chemical potential of {}: {:.3} J/mol ({})",
            self.settings.component,
            mu_ref,
            result.stable_phase[0].as_deref().unwrap_or("no stable phase")
        );
        self.reference = Some(result);
        Ok(mu_ref)
    }

    pub fn calculate_sweep(
        &mut self,
        solver: &dyn EquilibriumSolver,
    ) -> Result<&EquilibriumResult, ActivityTaskError> {
        let db = self.database()?;
        let conditions = self.settings.sweep_conditions();
        let result = solver.equilibrium(
            db,
            &self.settings.components,
            &self.settings.phases,
            &conditions,
        )?;
        info!("composition sweep finished: {} points", result.len());
        Ok(&*self.sweep.insert(result))
    }

    pub fn calculate_activity(&mut self) -> Result<&ActivityCurve, ActivityTaskError> {
        let reference = self
            .reference
            .as_ref()
            .ok_or(ActivityTaskError::NotReady("calculate_reference()"))?;
        let sweep = self
            .sweep
            .as_ref()
            .ok_or(ActivityTaskError::NotReady("calculate_sweep()"))?;
        let component = &self.settings.component;
        let mu_ref = reference.chemical_potential(component)?[0];
        let x = sweep.mole_fraction(component)?;
        let mu = sweep.chemical_potential(component)?;
        let curve = ActivityCurve::new(
            component,
            x,
            mu,
            mu_ref,
            self.settings.temperature,
            self.settings.gas_constant,
        )?;
        if curve.undefined_count() > 0 {
            warn!(
                "activity of {} is undefined at {} of {} grid points",
                curve.component,
                curve.undefined_count(),
                curve.len()
            );
        }
        Ok(&*self.curve.insert(curve))
    }

    /// reads the experimental series, if the settings name one
    pub fn load_experimental(&mut self) -> Result<Option<&ExperimentalSeries>, ActivityTaskError> {
        match &self.settings.experimental_data {
            Some(path) => {
                let series = ExperimentalSeries::load(path)?;
                Ok(Some(&*self.experimental.insert(series)))
            }
            None => Ok(None),
        }
    }

    /// series handed to the renderer: calculated line first, experiment second
    pub fn plot_series(&self) -> Result<Vec<Series>, ActivityTaskError> {
        let curve = self
            .curve
            .as_ref()
            .ok_or(ActivityTaskError::NotReady("calculate_activity()"))?;
        let mut series = vec![Series::line(
            "calculated",
            curve.x.clone(),
            curve.activity.clone(),
        )];
        if let Some(exp) = &self.experimental {
            series.push(Series::markers(&exp.label, exp.x.clone(), exp.y.clone()));
        }
        Ok(series)
    }

    pub fn plot(&self, renderer: &dyn PlotRenderer) -> Result<(), ActivityTaskError> {
        let series = self.plot_series()?;
        renderer.render(&series, &self.settings.plot)?;
        Ok(())
    }

    pub fn run(
        &mut self,
        solver: &dyn EquilibriumSolver,
        renderer: &dyn PlotRenderer,
    ) -> Result<&ActivityCurve, ActivityTaskError> {
        if self.database.is_none() {
            self.load_database()?;
        }
        self.calculate_reference(solver)?;
        self.calculate_sweep(solver)?;
        self.calculate_activity()?;
        self.load_experimental()?;
        self.plot(renderer)?;
        self.curve
            .as_ref()
            .ok_or(ActivityTaskError::NotReady("calculate_activity()"))
    }

    pub fn pretty_print(&self) {
        if let Some(curve) = &self.curve {
            curve.pretty_print();
        } else {
            println!("no activity curve calculated yet");
        }
    }
}
