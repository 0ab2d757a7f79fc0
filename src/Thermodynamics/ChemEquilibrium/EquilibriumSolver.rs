//! Equilibrium solver seam and the lowest-Gibbs-energy implementation.
//!
//! [`LowestGibbsSolver`] evaluates every candidate phase at each condition point with
//! [`SolutionModel`] and keeps the one with the lowest molar Gibbs energy. It does not
//! construct two-phase tangents, so inside a miscibility gap or a two-phase field the
//! reported state is the lower single-phase branch.
use super::EquilibriumResult::EquilibriumResult;
use super::SolutionModel::{SolutionModel, Unsupported, VACANCY};
use super::conditions::{ConditionError, ConditionPoint, ConditionSet};
use crate::Thermodynamics::DBhandlers::TDBdata::{Database, Phase, TdbError};
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EquilibriumError {
    #[error("component '{0}' is not an element of the database")]
    UnknownComponent(String),
    #[error("phase '{0}' is not in the database")]
    UnknownPhase(String),
    #[error("none of the phases {0:?} can describe the system")]
    NoUsablePhase(Vec<String>),
    #[error("no component left after removing vacancies")]
    NoComponents,
    #[error(transparent)]
    Conditions(#[from] ConditionError),
    #[error(transparent)]
    Database(#[from] TdbError),
}

/// computes equilibrium chemical potentials and phase fractions over a condition grid
pub trait EquilibriumSolver {
    fn equilibrium(
        &self,
        db: &Database,
        components: &[String],
        phases: &[String],
        conditions: &ConditionSet,
    ) -> Result<EquilibriumResult, EquilibriumError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LowestGibbsSolver;

impl LowestGibbsSolver {
    pub fn new() -> Self {
        Self
    }
}

/// key of a model cache entry: (T, P) bit patterns and the present components
type ModelKey = (u64, u64, Vec<String>);

impl EquilibriumSolver for LowestGibbsSolver {
    fn equilibrium(
        &self,
        db: &Database,
        components: &[String],
        phases: &[String],
        conditions: &ConditionSet,
    ) -> Result<EquilibriumResult, EquilibriumError> {
        let mut system: Vec<String> = Vec::new();
        for c in components {
            let c = c.to_uppercase();
            if c == VACANCY || system.contains(&c) {
                continue;
            }
            if !db.elements.contains_key(&c) {
                return Err(EquilibriumError::UnknownComponent(c));
            }
            system.push(c);
        }
        system.sort();
        if system.is_empty() {
            return Err(EquilibriumError::NoComponents);
        }
        let mut candidates = Vec::new();
        for name in phases {
            let phase = db
                .phase(name)
                .ok_or_else(|| EquilibriumError::UnknownPhase(name.to_uppercase()))?;
            if !candidates.contains(&phase) {
                candidates.push(phase);
            }
        }
        let phase_names: Vec<String> = candidates.iter().map(|p| p.name.clone()).collect();

        let axis = conditions.swept_variable()?;
        let coordinates = conditions.coordinates()?;
        let points = conditions.grid(&system)?;
        info!(
            "equilibrium of {:?} with phases {:?}: {} condition point(s)",
            system,
            phase_names,
            points.len()
        );

        let n = points.len();
        let mut MU = DMatrix::from_element(n, system.len(), f64::NAN);
        let mut NP = DMatrix::zeros(n, candidates.len());
        let mut GM = DVector::from_element(n, f64::NAN);
        let mut stable_phase = vec![None; n];
        let mut cache: HashMap<ModelKey, Vec<(usize, SolutionModel)>> = HashMap::new();
        let mut any_usable = false;

        for (row, point) in points.iter().enumerate() {
            let present = point.present_components();
            let key = (point.T.to_bits(), point.P.to_bits(), present.clone());
            if !cache.contains_key(&key) {
                let models = build_models(db, &candidates, &present, point)?;
                cache.insert(key.clone(), models);
            }
            let models = &cache[&key];
            if models.is_empty() {
                debug!("no phase can hold {:?} at point {}", present, row);
                continue;
            }
            any_usable = true;
            let x: Vec<f64> = present.iter().map(|c| point.x[c]).collect();
            let best = models
                .iter()
                .map(|(idx, model)| (*idx, model, model.gibbs_energy(&x)))
                .filter(|(_, _, g)| !g.is_nan())
                .min_by(|a, b| a.2.total_cmp(&b.2));
            let Some((phase_idx, model, G)) = best else {
                debug!("Gibbs energy undefined for every phase at point {}", row);
                continue;
            };
            GM[row] = G;
            NP[(row, phase_idx)] = 1.0;
            stable_phase[row] = Some(model.phase.clone());
            for (c, mu) in present.iter().zip(model.chemical_potentials(&x)) {
                if let Some(col) = system.iter().position(|s| s == c) {
                    MU[(row, col)] = mu;
                }
            }
        }
        if !any_usable {
            return Err(EquilibriumError::NoUsablePhase(phase_names));
        }

        Ok(EquilibriumResult {
            components: system,
            phases: phase_names,
            axis,
            coordinates,
            points,
            MU,
            NP,
            GM,
            stable_phase,
        })
    }
}

fn build_models(
    db: &Database,
    candidates: &[&Phase],
    present: &[String],
    point: &ConditionPoint,
) -> Result<Vec<(usize, SolutionModel)>, EquilibriumError> {
    let mut models = Vec::new();
    for (idx, phase) in candidates.iter().enumerate() {
        match SolutionModel::from_database(db, phase, present, point.T, point.P)? {
            Ok(model) => models.push((idx, model)),
            Err(Unsupported::MissingEndmember(c)) => {
                debug!("phase {} has no endmember for {}", phase.name, c);
            }
            Err(reason) => {
                warn!("phase {} is skipped: {:?}", phase.name, reason);
            }
        }
    }
    Ok(models)
}
