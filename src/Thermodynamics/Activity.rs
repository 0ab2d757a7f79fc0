//! # Activity calculator
//!
//! Activity of a component relative to a reference state from chemical potentials:
//!
//! a(x) = exp((μ(x) - μ_ref) / (R T))
//!
//! Undefined potentials (NaN) give undefined activities; they are kept in place so the
//! curve always has one entry per grid point, in grid order.
//!
//! # Examples
//! ```
//! use CalphadActivity::Thermodynamics::Activity::activity_curve;
//! let a = activity_curve(0.0, &[0.0, f64::NAN, -1000.0], 1073.0, 8.315).unwrap();
//! assert_eq!(a.len(), 3);
//! assert_eq!(a[0], 1.0);
//! assert!(a[1].is_nan());
//! assert!(a[2] < 1.0);
//! ```
use prettytable::{Table, row};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ActivityError {
    #[error("temperature must be positive and finite, got {0}")]
    InvalidTemperature(f64),
    #[error("gas constant must be positive and finite, got {0}")]
    InvalidGasConstant(f64),
    #[error("grid has {grid} points but {values} chemical potentials were given")]
    LengthMismatch { grid: usize, values: usize },
}

fn check_state(T: f64, R: f64) -> Result<(), ActivityError> {
    if !(T.is_finite() && T > 0.0) {
        return Err(ActivityError::InvalidTemperature(T));
    }
    if !(R.is_finite() && R > 0.0) {
        return Err(ActivityError::InvalidGasConstant(R));
    }
    Ok(())
}

/// activity at a single point; NaN in, NaN out
pub fn activity(mu_ref: f64, mu: f64, T: f64, R: f64) -> f64 {
    ((mu - mu_ref) / (R * T)).exp()
}

/// activity for every chemical potential in `mu`, same length and order
pub fn activity_curve(mu_ref: f64, mu: &[f64], T: f64, R: f64) -> Result<Vec<f64>, ActivityError> {
    check_state(T, R)?;
    Ok(mu.iter().map(|&m| activity(mu_ref, m, T, R)).collect())
}

/// activity of one component along a composition grid
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityCurve {
    pub component: String,
    pub T: f64,
    pub R: f64,
    /// reference chemical potential, J/mol
    pub mu_ref: f64,
    /// mole fraction of `component` at each grid point
    pub x: Vec<f64>,
    pub mu: Vec<f64>,
    pub activity: Vec<f64>,
}

impl ActivityCurve {
    pub fn new(
        component: &str,
        x: Vec<f64>,
        mu: Vec<f64>,
        mu_ref: f64,
        T: f64,
        R: f64,
    ) -> Result<Self, ActivityError> {
        if x.len() != mu.len() {
            return Err(ActivityError::LengthMismatch {
                grid: x.len(),
                values: mu.len(),
            });
        }
        let activity = activity_curve(mu_ref, &mu, T, R)?;
        Ok(Self {
            component: component.to_uppercase(),
            T,
            R,
            mu_ref,
            x,
            mu,
            activity,
        })
    }

    pub fn len(&self) -> usize {
        self.activity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_empty()
    }

    /// γ = a / x; NaN where x = 0 or the activity is undefined
    pub fn activity_coefficients(&self) -> Vec<f64> {
        self.x
            .iter()
            .zip(self.activity.iter())
            .map(|(&x, &a)| if x > 0.0 { a / x } else { f64::NAN })
            .collect()
    }

    /// (x, a) pairs with a finite activity
    pub fn defined_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x
            .iter()
            .copied()
            .zip(self.activity.iter().copied())
            .filter(|(_, a)| a.is_finite())
    }

    /// number of grid points where the activity is undefined
    pub fn undefined_count(&self) -> usize {
        self.activity.iter().filter(|a| a.is_nan()).count()
    }

    pub fn pretty_print(&self) {
        let mut table = Table::new();
        table.add_row(row![
            format!("X({})", self.component),
            format!("MU({}), J/mol", self.component),
            "activity",
            "gamma"
        ]);
        for ((x, mu), (a, g)) in self
            .x
            .iter()
            .zip(self.mu.iter())
            .zip(self.activity.iter().zip(self.activity_coefficients()))
        {
            table.add_row(row![
                format!("{:.3}", x),
                format!("{:.2}", mu),
                format!("{:.4}", a),
                format!("{:.4}", g)
            ]);
        }
        table.printstd();
    }
}
