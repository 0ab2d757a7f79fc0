//! Substitutional Redlich–Kister solution model of one phase, evaluated at fixed (T, P).
//!
//! Only the sublattice that carries non-vacancy species mixes; every other sublattice
//! must hold `VA` alone. All quantities are per mole of atoms: formula-unit parameters
//! are divided by the site ratio of the mixing sublattice.
//!
//! G_m = Σ x_i G_i + R T Σ x_i ln x_i + Σ_{i<j} x_i x_j Σ_k L_k (x_i - x_j)^k
//!
//! μ_i = G_m + ∂G_m/∂x_i - Σ_j x_j ∂G_m/∂x_j
use crate::Thermodynamics::DBhandlers::TDBdata::{Database, Parameter, Phase, TdbError};
use log::{debug, warn};
use std::collections::HashMap;

/// universal gas constant, J/(mol K)
pub const R: f64 = 8.3145;

pub const VACANCY: &str = "VA";

/// reasons a phase cannot be described by the substitutional model
#[derive(Debug, Clone, PartialEq)]
pub enum Unsupported {
    NoConstituents,
    SeveralMixingSublattices,
    NoMixingSublattice,
    MissingEndmember(String),
}

/// binary interaction between components `i < j` (indices into `components`)
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub i: usize,
    pub j: usize,
    /// L_0, L_1, ... for the pair ordered as (i, j)
    pub L: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolutionModel {
    pub phase: String,
    pub T: f64,
    pub P: f64,
    pub components: Vec<String>,
    /// G of each pure component in this phase, per mole of atoms
    pub G0: Vec<f64>,
    pub interactions: Vec<Interaction>,
}

impl SolutionModel {
    /// builds the model of `phase` for the given components at (T, P).
    /// `Ok(Err(..))` means the phase exists but cannot host these components.
    pub fn from_database(
        db: &Database,
        phase: &Phase,
        components: &[String],
        T: f64,
        P: f64,
    ) -> Result<Result<Self, Unsupported>, TdbError> {
        if phase.constituents.is_empty() {
            return Ok(Err(Unsupported::NoConstituents));
        }
        let mixing: Vec<usize> = phase
            .constituents
            .iter()
            .enumerate()
            .filter(|(_, species)| species.iter().any(|s| s != VACANCY))
            .map(|(idx, _)| idx)
            .collect();
        let sublattice = match mixing.as_slice() {
            [] => return Ok(Err(Unsupported::NoMixingSublattice)),
            [one] => *one,
            _ => return Ok(Err(Unsupported::SeveralMixingSublattices)),
        };
        let sites = phase.site_ratios[sublattice];

        // is this constituent array of the form [.., [species..], VA, ..]?
        let species_on_mixing = |p: &Parameter| -> Option<Vec<String>> {
            let vacancy_elsewhere = p
                .constituents
                .iter()
                .enumerate()
                .all(|(idx, s)| idx == sublattice || (s.len() == 1 && s[0] == VACANCY));
            vacancy_elsewhere.then(|| p.constituents[sublattice].clone())
        };

        let mut G0 = vec![f64::NAN; components.len()];
        let mut interactions: HashMap<(usize, usize), Vec<f64>> = HashMap::new();
        for p in db.parameters_of(&phase.name) {
            if !p.is_gibbs() {
                warn!("{}: parameter kind {} is not part of the model and ignored", phase.name, p.kind);
                continue;
            }
            let Some(species) = species_on_mixing(p) else {
                debug!("{}: skipping parameter {:?}", phase.name, p.constituents);
                continue;
            };
            let index: Option<Vec<usize>> = species
                .iter()
                .map(|s| components.iter().position(|c| c == s))
                .collect();
            // parameters of species outside the system do not contribute
            let Some(index) = index else { continue };
            match index.as_slice() {
                [i] if p.order == 0 => {
                    G0[*i] = db.evaluate_parameter(p, T, P)? / sites;
                }
                [a, b] if a != b => {
                    let value = db.evaluate_parameter(p, T, P)? / sites;
                    // L_k(B,A) = (-1)^k L_k(A,B)
                    let (i, j, sign) = if a < b {
                        (*a, *b, 1.0)
                    } else {
                        (*b, *a, if p.order % 2 == 0 { 1.0 } else { -1.0 })
                    };
                    let entry = interactions.entry((i, j)).or_default();
                    let k = p.order as usize;
                    if entry.len() <= k {
                        entry.resize(k + 1, 0.0);
                    }
                    entry[k] += sign * value;
                }
                _ => {
                    warn!(
                        "{}: interaction {:?} of order {} is not supported and ignored",
                        phase.name, species, p.order
                    );
                }
            }
        }
        if let Some(missing) = G0.iter().position(|g| g.is_nan()) {
            return Ok(Err(Unsupported::MissingEndmember(components[missing].clone())));
        }
        let mut interactions: Vec<Interaction> = interactions
            .into_iter()
            .map(|((i, j), L)| Interaction { i, j, L })
            .collect();
        interactions.sort_by_key(|it| (it.i, it.j));

        Ok(Ok(SolutionModel {
            phase: phase.name.clone(),
            T,
            P,
            components: components.to_vec(),
            G0,
            interactions,
        }))
    }

    /// molar Gibbs energy at composition `x` (same order as `components`).
    /// Terms of absent components vanish (0 ln 0 = 0).
    pub fn gibbs_energy(&self, x: &[f64]) -> f64 {
        let RT = R * self.T;
        let mut G = 0.0;
        for (i, &xi) in x.iter().enumerate() {
            if xi > 0.0 {
                G += xi * self.G0[i] + RT * xi * xi.ln();
            }
        }
        for it in &self.interactions {
            let (xi, xj) = (x[it.i], x[it.j]);
            let d = xi - xj;
            let sum: f64 = it
                .L
                .iter()
                .enumerate()
                .map(|(k, L)| L * d.powi(k as i32))
                .sum();
            G += xi * xj * sum;
        }
        G
    }

    /// ∂G_m/∂x_i treating every fraction as independent
    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let RT = R * self.T;
        let mut grad: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, &xi)| self.G0[i] + RT * (xi.ln() + 1.0))
            .collect();
        for it in &self.interactions {
            let (xi, xj) = (x[it.i], x[it.j]);
            let d = xi - xj;
            let mut sum = 0.0;
            let mut dsum = 0.0;
            for (k, L) in it.L.iter().enumerate() {
                sum += L * d.powi(k as i32);
                if k > 0 {
                    dsum += k as f64 * L * d.powi(k as i32 - 1);
                }
            }
            grad[it.i] += xj * sum + xi * xj * dsum;
            grad[it.j] += xi * sum - xi * xj * dsum;
        }
        grad
    }

    /// chemical potentials at composition `x`; NaN for components with x_i = 0,
    /// whose potential is undefined in the reduced system
    pub fn chemical_potentials(&self, x: &[f64]) -> Vec<f64> {
        let G = self.gibbs_energy(x);
        let grad = self.gradient(x);
        let weighted: f64 = x
            .iter()
            .zip(grad.iter())
            .filter(|(xi, _)| **xi > 0.0)
            .map(|(xi, g)| xi * g)
            .sum();
        x.iter()
            .zip(grad.iter())
            .map(|(&xi, g)| if xi > 0.0 { G + g - weighted } else { f64::NAN })
            .collect()
    }
}
