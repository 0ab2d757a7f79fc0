//! Labeled result of an equilibrium calculation: rows are grid points along the swept
//! condition, columns are components (`MU`) or phases (`NP`).
use super::conditions::{ConditionPoint, StateVariable};
use nalgebra::{DMatrix, DVector};
use prettytable::{Cell, Row, Table};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("component '{0}' is not in the result")]
    UnknownComponent(String),
    #[error("phase '{0}' is not in the result")]
    UnknownPhase(String),
    #[error("no grid point at {axis} = {value}")]
    NoSuchCoordinate { axis: String, value: f64 },
}

#[derive(Debug, Clone)]
pub struct EquilibriumResult {
    pub components: Vec<String>,
    pub phases: Vec<String>,
    /// swept condition, `None` for a single-point calculation
    pub axis: Option<StateVariable>,
    pub coordinates: Vec<f64>,
    pub points: Vec<ConditionPoint>,
    /// chemical potentials, J/mol: points x components
    pub MU: DMatrix<f64>,
    /// phase fractions: points x phases
    pub NP: DMatrix<f64>,
    /// molar Gibbs energy of the equilibrium state, J/mol
    pub GM: DVector<f64>,
    pub stable_phase: Vec<Option<String>>,
}

impl EquilibriumResult {
    /// number of grid points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn component_index(&self, component: &str) -> Result<usize, SelectionError> {
        let component = component.to_uppercase();
        self.components
            .iter()
            .position(|c| *c == component)
            .ok_or(SelectionError::UnknownComponent(component))
    }

    fn coordinate_index(&self, value: f64) -> Result<usize, SelectionError> {
        let axis = || {
            self.axis
                .as_ref()
                .map_or("point".to_string(), |a| a.to_string())
        };
        self.coordinates
            .iter()
            .position(|c| (c - value).abs() <= 1e-9 * value.abs().max(1.0))
            .ok_or_else(|| SelectionError::NoSuchCoordinate {
                axis: axis(),
                value,
            })
    }

    /// chemical potential of `component` at every grid point, in grid order
    pub fn chemical_potential(&self, component: &str) -> Result<Vec<f64>, SelectionError> {
        let j = self.component_index(component)?;
        Ok(self.MU.column(j).iter().copied().collect())
    }

    /// chemical potential of `component` at one coordinate of the swept axis
    pub fn chemical_potential_at(&self, component: &str, coordinate: f64) -> Result<f64, SelectionError> {
        let j = self.component_index(component)?;
        let i = self.coordinate_index(coordinate)?;
        Ok(self.MU[(i, j)])
    }

    /// fraction of `phase` at every grid point
    pub fn phase_fraction(&self, phase: &str) -> Result<Vec<f64>, SelectionError> {
        let phase = phase.to_uppercase();
        let j = self
            .phases
            .iter()
            .position(|p| *p == phase)
            .ok_or(SelectionError::UnknownPhase(phase))?;
        Ok(self.NP.column(j).iter().copied().collect())
    }

    /// mole fraction of `component` at every grid point
    pub fn mole_fraction(&self, component: &str) -> Result<Vec<f64>, SelectionError> {
        let component = component.to_uppercase();
        self.points
            .iter()
            .map(|p| {
                p.x.get(&component)
                    .copied()
                    .ok_or_else(|| SelectionError::UnknownComponent(component.clone()))
            })
            .collect()
    }

    pub fn pretty_print(&self) {
        let mut table = Table::new();
        let mut header = vec![Cell::new(
            &self
                .axis
                .as_ref()
                .map_or("point".to_string(), |a| a.to_string()),
        )];
        header.extend(self.components.iter().map(|c| Cell::new(&format!("MU({})", c))));
        header.push(Cell::new("GM"));
        header.push(Cell::new("stable phase"));
        table.add_row(Row::new(header));
        for i in 0..self.len() {
            let mut row = vec![Cell::new(&format!("{:.4}", self.coordinates[i]))];
            row.extend(
                self.MU
                    .row(i)
                    .iter()
                    .map(|mu| Cell::new(&format!("{:.2}", mu))),
            );
            row.push(Cell::new(&format!("{:.2}", self.GM[i])));
            row.push(Cell::new(self.stable_phase[i].as_deref().unwrap_or("-")));
            table.add_row(Row::new(row));
        }
        table.printstd();
    }
}
