//! Equilibrium conditions: state variables, scalar/ranged values and the grid of
//! condition points they expand to.
use approx::relative_eq;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConditionError {
    #[error("cannot parse state variable '{0}'")]
    UnknownVariable(String),
    #[error("invalid range for {variable}: start {start}, stop {stop}, step {step}")]
    InvalidRange {
        variable: String,
        start: f64,
        stop: f64,
        step: f64,
    },
    #[error("only one condition may be a range, found ranges for {0:?}")]
    MultipleRanges(Vec<String>),
    #[error("condition {0} is required")]
    Missing(String),
    #[error("value {value} of {variable} is out of bounds: {reason}")]
    OutOfBounds {
        variable: String,
        value: f64,
        reason: String,
    },
    #[error("mole fractions fixed for {fixed} components, system has {components} (one must stay dependent)")]
    WrongFractionCount { fixed: usize, components: usize },
    #[error("mole fraction given for {0}, which is not a component of the system")]
    ForeignComponent(String),
    #[error("fixed mole fractions sum to {0} > 1")]
    FractionSum(f64),
}

/// state variable a condition is placed on
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateVariable {
    /// pressure, Pa
    P,
    /// temperature, K
    T,
    /// total amount of atoms, mol
    N,
    /// mole fraction of a component
    X(String),
}

impl fmt::Display for StateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateVariable::P => write!(f, "P"),
            StateVariable::T => write!(f, "T"),
            StateVariable::N => write!(f, "N"),
            StateVariable::X(component) => write!(f, "X({})", component),
        }
    }
}

impl FromStr for StateVariable {
    type Err = ConditionError;

    /// accepts `P`, `T`, `N` and `X(ZN)` (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "P" => Ok(StateVariable::P),
            "T" => Ok(StateVariable::T),
            "N" => Ok(StateVariable::N),
            other => {
                let component = other
                    .strip_prefix("X(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| ConditionError::UnknownVariable(s.to_string()))?;
                Ok(StateVariable::X(component.to_string()))
            }
        }
    }
}

/// scalar or `(start, stop, step)` range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConditionValue {
    Scalar(f64),
    Range { start: f64, stop: f64, step: f64 },
}

impl From<f64> for ConditionValue {
    fn from(value: f64) -> Self {
        ConditionValue::Scalar(value)
    }
}

impl From<(f64, f64, f64)> for ConditionValue {
    fn from((start, stop, step): (f64, f64, f64)) -> Self {
        ConditionValue::Range { start, stop, step }
    }
}

impl ConditionValue {
    pub fn is_range(&self) -> bool {
        matches!(self, ConditionValue::Range { .. })
    }

    /// expands into the ordered list of values. A range includes `stop` when it lies
    /// on the step lattice: `(0, 1, 0.005)` gives 201 values.
    pub fn values(&self, variable: &StateVariable) -> Result<Vec<f64>, ConditionError> {
        match *self {
            ConditionValue::Scalar(v) => Ok(vec![v]),
            ConditionValue::Range { start, stop, step } => {
                let invalid = || ConditionError::InvalidRange {
                    variable: variable.to_string(),
                    start,
                    stop,
                    step,
                };
                if !(start.is_finite() && stop.is_finite() && step.is_finite())
                    || step <= 0.0
                    || stop < start
                {
                    return Err(invalid());
                }
                let span = (stop - start) / step;
                if !span.is_finite() || span > MAX_RANGE_POINTS as f64 {
                    return Err(invalid());
                }
                let mut n = span.floor();
                if relative_eq!(span, span.round(), epsilon = 1e-9) {
                    n = span.round();
                }
                let n = n as usize;
                let values = (0..=n)
                    .map(|i| {
                        let v = start + i as f64 * step;
                        if relative_eq!(v, stop, epsilon = 1e-12) { stop } else { v }
                    })
                    .collect();
                Ok(values)
            }
        }
    }
}

/// fully resolved state at one grid point
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionPoint {
    pub T: f64,
    pub P: f64,
    pub N: f64,
    /// mole fraction of every component, dependent one included
    pub x: BTreeMap<String, f64>,
}

impl ConditionPoint {
    /// components with nonzero amount
    pub fn present_components(&self) -> Vec<String> {
        self.x
            .iter()
            .filter(|(_, v)| **v > 0.0)
            .map(|(c, _)| c.clone())
            .collect()
    }
}

/// mapping of state variables to condition values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSet {
    pub conditions: BTreeMap<StateVariable, ConditionValue>,
}

/// upper bound on the number of values one range may expand to
pub const MAX_RANGE_POINTS: usize = 10_000_000;

/// mole fractions this close to zero or one are snapped to the bound
const FRACTION_TOLERANCE: f64 = 1e-12;

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// builder-style insertion: `ConditionSet::new().with(StateVariable::T, 1073.0)`
    pub fn with(mut self, variable: StateVariable, value: impl Into<ConditionValue>) -> Self {
        self.conditions.insert(variable, value.into());
        self
    }

    pub fn set(&mut self, variable: StateVariable, value: impl Into<ConditionValue>) {
        self.conditions.insert(variable, value.into());
    }

    pub fn get(&self, variable: &StateVariable) -> Option<&ConditionValue> {
        self.conditions.get(variable)
    }

    /// the single ranged condition, if any
    pub fn swept_variable(&self) -> Result<Option<StateVariable>, ConditionError> {
        let ranged: Vec<&StateVariable> = self
            .conditions
            .iter()
            .filter(|(_, v)| v.is_range())
            .map(|(k, _)| k)
            .collect();
        match ranged.len() {
            0 => Ok(None),
            1 => Ok(Some(ranged[0].clone())),
            _ => Err(ConditionError::MultipleRanges(
                ranged.iter().map(|v| v.to_string()).collect(),
            )),
        }
    }

    /// coordinates along the swept axis (a single 0.0 placeholder when nothing is swept)
    pub fn coordinates(&self) -> Result<Vec<f64>, ConditionError> {
        match self.swept_variable()? {
            Some(variable) => self.conditions[&variable].values(&variable),
            None => Ok(vec![0.0]),
        }
    }

    /// expands the set into one [`ConditionPoint`] per grid coordinate for the given
    /// components (vacancies excluded). Exactly one component must be left without an
    /// `X` condition; its fraction is `1 - Σ x`.
    pub fn grid(&self, components: &[String]) -> Result<Vec<ConditionPoint>, ConditionError> {
        let swept = self.swept_variable()?;
        for required in [StateVariable::T, StateVariable::P] {
            if !self.conditions.contains_key(&required) {
                return Err(ConditionError::Missing(required.to_string()));
            }
        }
        let fixed: Vec<&String> = self
            .conditions
            .keys()
            .filter_map(|k| match k {
                StateVariable::X(c) => Some(c),
                _ => None,
            })
            .collect();
        for c in &fixed {
            if !components.contains(c) {
                return Err(ConditionError::ForeignComponent((*c).clone()));
            }
        }
        if components.is_empty() || fixed.len() + 1 != components.len() {
            return Err(ConditionError::WrongFractionCount {
                fixed: fixed.len(),
                components: components.len(),
            });
        }
        let dependent = components
            .iter()
            .find(|c| !fixed.contains(c))
            .cloned()
            .ok_or(ConditionError::WrongFractionCount {
                fixed: fixed.len(),
                components: components.len(),
            })?;

        let expanded: BTreeMap<StateVariable, Vec<f64>> = self
            .conditions
            .iter()
            .map(|(k, v)| v.values(k).map(|vals| (k.clone(), vals)))
            .collect::<Result<_, _>>()?;
        let n_points = match &swept {
            Some(variable) => expanded[variable].len(),
            None => 1,
        };

        let mut points = Vec::with_capacity(n_points);
        for i in 0..n_points {
            let value_of = |variable: &StateVariable| -> f64 {
                let vals = &expanded[variable];
                if vals.len() == 1 { vals[0] } else { vals[i] }
            };
            let T = value_of(&StateVariable::T);
            let P = value_of(&StateVariable::P);
            let N = if expanded.contains_key(&StateVariable::N) {
                value_of(&StateVariable::N)
            } else {
                1.0
            };
            check_positive(&StateVariable::T, T)?;
            check_positive(&StateVariable::P, P)?;
            check_positive(&StateVariable::N, N)?;

            let mut x = BTreeMap::new();
            let mut sum = 0.0;
            for c in &fixed {
                let variable = StateVariable::X((*c).clone());
                let v = snap(value_of(&variable));
                if !(0.0..=1.0).contains(&v) {
                    return Err(ConditionError::OutOfBounds {
                        variable: variable.to_string(),
                        value: v,
                        reason: "mole fraction must lie in [0, 1]".to_string(),
                    });
                }
                sum += v;
                x.insert((*c).clone(), v);
            }
            if sum > 1.0 + FRACTION_TOLERANCE {
                return Err(ConditionError::FractionSum(sum));
            }
            x.insert(dependent.clone(), snap(1.0 - sum));
            points.push(ConditionPoint { T, P, N, x });
        }
        Ok(points)
    }
}

fn check_positive(variable: &StateVariable, value: f64) -> Result<(), ConditionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConditionError::OutOfBounds {
            variable: variable.to_string(),
            value,
            reason: "must be positive and finite".to_string(),
        })
    }
}

fn snap(v: f64) -> f64 {
    if v.abs() < FRACTION_TOLERANCE {
        0.0
    } else if (v - 1.0).abs() < FRACTION_TOLERANCE {
        1.0
    } else {
        v
    }
}
