//! # TDB database loader
//!
//! Reads the command structure of a thermodynamic database file (`*.tdb`) into an
//! in-memory [`Database`]: elements, species, phases with their sublattice
//! constituents, temperature-piecewise functions and model parameters.
//!
//! ## Format
//! - `$` starts a comment that runs to the end of the line
//! - every command ends with `!` and may span several lines
//! - command keywords may be abbreviated to any prefix (`FUNCT`, `PARA`, `TYPE_DEF`)
//! - the loader is case-insensitive; all names are stored upper case
//!
//! ## Example
//! ```
//! use CalphadActivity::Thermodynamics::DBhandlers::TDBdata::Database;
//! let tdb = "
//!  ELEMENT CU FCC_A1 63.546 5004.1 33.15 !
//!  ELEMENT ZN HCP_ZN 65.39 5656.8 41.63 !
//!  PHASE LIQUID:L % 1 1.0 !
//!  CONSTITUENT LIQUID:L :CU,ZN: !
//!  FUNCTION GLIQCU 298.15 -1000+2*T; 3200 N !
//!  PARAMETER G(LIQUID,CU;0) 298.15 +GLIQCU#; 3200 N !
//! ";
//! let db = Database::from_tdb_str(tdb).unwrap();
//! assert!(db.phase_names().contains("LIQUID"));
//! let g = db.evaluate_function("GLIQCU", 1000.0, 101325.0).unwrap();
//! assert_eq!(g, 1000.0);
//! ```
use super::tdb_expression::Piecewise;
use log::{debug, info, warn};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// nesting limit for FUNCTION references; deeper chains are treated as cycles
const MAX_REFERENCE_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum TdbError {
    #[error("failed to read database file: {0}")]
    Io(#[from] io::Error),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unterminated command (missing '!'): '{0}'")]
    Unterminated(String),
    #[error("malformed {command} command: {reason}")]
    Malformed { command: String, reason: String },
    #[error("phase '{0}' is not declared")]
    UndeclaredPhase(String),
    #[error("phase '{0}' is declared twice")]
    DuplicatePhase(String),
    #[error("function '{0}' is not defined")]
    UndefinedFunction(String),
    #[error("function references nest deeper than {MAX_REFERENCE_DEPTH} levels at '{0}' (cyclic definition?)")]
    RecursionLimit(String),
    #[error("database contains no phases")]
    NoPhases,
}

fn malformed(command: &str, reason: impl Into<String>) -> TdbError {
    TdbError::Malformed {
        command: command.to_string(),
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub reference_phase: String,
    pub mass: f64,
    pub H298: f64,
    pub S298: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub name: String,
    /// model hints after the name, e.g. `%` or `%&`
    pub type_codes: String,
    pub site_ratios: Vec<f64>,
    /// species allowed on each sublattice; empty until a CONSTITUENT command is read
    pub constituents: Vec<Vec<String>>,
}

impl Phase {
    pub fn sublattice_count(&self) -> usize {
        self.site_ratios.len()
    }
}

/// one PARAMETER record, e.g. `L(LIQUID,CU,ZN;1)`
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// parameter kind: `G`, `L`, `TC`, `BMAGN`, ...
    pub kind: String,
    pub phase: String,
    /// constituent array, one list of species per sublattice
    pub constituents: Vec<Vec<String>>,
    pub order: u32,
    pub value: Piecewise,
}

impl Parameter {
    /// `G` and `L` both denote Gibbs energy contributions
    pub fn is_gibbs(&self) -> bool {
        self.kind == "G" || self.kind == "L"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Element,
    Species,
    Phase,
    Constituent,
    Function,
    Parameter,
    Ignored,
}

/// keywords in lookup order; abbreviations resolve to the first keyword they prefix
const KEYWORDS: &[(&str, Command)] = &[
    ("ELEMENT", Command::Element),
    ("SPECIES", Command::Species),
    ("PHASE", Command::Phase),
    ("CONSTITUENT", Command::Constituent),
    ("FUNCTION", Command::Function),
    ("PARAMETER", Command::Parameter),
    ("TYPE_DEFINITION", Command::Ignored),
    ("DEFINE_SYSTEM_DEFAULT", Command::Ignored),
    ("DEFAULT_COMMAND", Command::Ignored),
    ("DATABASE_INFO", Command::Ignored),
    ("VERSION_DATE", Command::Ignored),
    ("REFERENCE_FILE", Command::Ignored),
    ("ASSESSED_SYSTEMS", Command::Ignored),
    ("ADD_REFERENCES", Command::Ignored),
    ("LIST_OF_REFERENCES", Command::Ignored),
    ("TEMPERATURE_LIMITS", Command::Ignored),
];

fn lookup_command(word: &str) -> Option<(&'static str, Command)> {
    KEYWORDS
        .iter()
        .find(|(keyword, _)| keyword.starts_with(word))
        .copied()
}

/// in-memory thermodynamic database
#[derive(Debug, Clone, Default)]
pub struct Database {
    pub elements: BTreeMap<String, Element>,
    /// species name -> formula
    pub species: BTreeMap<String, String>,
    pub phases: BTreeMap<String, Phase>,
    pub functions: BTreeMap<String, Piecewise>,
    pub parameters: Vec<Parameter>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// reads and parses a TDB file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TdbError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let db = Self::from_tdb_str(&text)?;
        info!(
            "loaded database '{}': {} elements, {} phases, {} functions, {} parameters",
            path.display(),
            db.elements.len(),
            db.phases.len(),
            db.functions.len(),
            db.parameters.len()
        );
        Ok(db)
    }

    /// parses TDB text
    pub fn from_tdb_str(text: &str) -> Result<Self, TdbError> {
        let comment = Regex::new(r"\$[^\n]*").expect("valid comment regex");
        let header = Regex::new(r"^([A-Z0-9_]+)\(([^)]*)\)\s*(.*)$").expect("valid header regex");
        let text = comment.replace_all(text, "").to_uppercase();
        let mut pieces: Vec<&str> = text.split('!').collect();
        // whatever follows the last '!' must be blank
        let tail = pieces.pop().unwrap_or("");
        if !tail.trim().is_empty() {
            return Err(TdbError::Unterminated(squash(tail)));
        }
        let mut db = Database::new();
        for piece in pieces {
            let command = squash(piece);
            if command.is_empty() {
                continue;
            }
            db.process_command(&command, &header)?;
        }
        if db.phases.is_empty() {
            return Err(TdbError::NoPhases);
        }
        db.check_phases_constituted();
        Ok(db)
    }

    fn process_command(&mut self, command: &str, header: &Regex) -> Result<(), TdbError> {
        let (word, body) = match command.split_once(' ') {
            Some((word, body)) => (word, body.trim()),
            None => (command, ""),
        };
        let (keyword, kind) =
            lookup_command(word).ok_or_else(|| TdbError::UnknownCommand(word.to_string()))?;
        match kind {
            Command::Element => self.read_element(keyword, body),
            Command::Species => self.read_species(keyword, body),
            Command::Phase => self.read_phase(keyword, body),
            Command::Constituent => self.read_constituent(keyword, body),
            Command::Function => self.read_function(keyword, body),
            Command::Parameter => self.read_parameter(keyword, body, header),
            Command::Ignored => {
                debug!("skipping {} command", keyword);
                Ok(())
            }
        }
    }

    fn read_element(&mut self, keyword: &str, body: &str) -> Result<(), TdbError> {
        let fields: Vec<&str> = body.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(malformed(
                keyword,
                format!("expected 5 fields, found {} in '{}'", fields.len(), body),
            ));
        }
        let number = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| malformed(keyword, format!("'{}' is not a number", s)))
        };
        let element = Element {
            name: fields[0].to_string(),
            reference_phase: fields[1].to_string(),
            mass: number(fields[2])?,
            H298: number(fields[3])?,
            S298: number(fields[4])?,
        };
        self.elements.insert(element.name.clone(), element);
        Ok(())
    }

    fn read_species(&mut self, keyword: &str, body: &str) -> Result<(), TdbError> {
        let fields: Vec<&str> = body.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(malformed(keyword, format!("expected name and formula in '{}'", body)));
        }
        self.species
            .insert(fields[0].to_string(), fields[1].to_string());
        Ok(())
    }

    fn read_phase(&mut self, keyword: &str, body: &str) -> Result<(), TdbError> {
        let fields: Vec<&str> = body.split_whitespace().collect();
        if fields.is_empty() {
            return Err(malformed(keyword, "missing phase name"));
        }
        let name = phase_name(fields[0]);
        // the type code field is optional
        let mut rest = &fields[1..];
        let mut type_codes = String::new();
        if let Some(first) = rest.first() {
            if first.parse::<usize>().is_err() {
                type_codes = first.to_string();
                rest = &rest[1..];
            }
        }
        let count = rest
            .first()
            .ok_or_else(|| malformed(keyword, format!("missing sublattice count for {}", name)))?
            .parse::<usize>()
            .map_err(|_| malformed(keyword, format!("bad sublattice count for {}", name)))?;
        if count == 0 || rest.len() != count + 1 {
            return Err(malformed(
                keyword,
                format!(
                    "phase {} declares {} sublattices but lists {} site ratios",
                    name,
                    count,
                    rest.len().saturating_sub(1)
                ),
            ));
        }
        let site_ratios = rest[1..]
            .iter()
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| malformed(keyword, format!("'{}' is not a site ratio", s)))
            })
            .collect::<Result<Vec<f64>, TdbError>>()?;
        if self.phases.contains_key(&name) {
            return Err(TdbError::DuplicatePhase(name));
        }
        self.phases.insert(
            name.clone(),
            Phase {
                name,
                type_codes,
                site_ratios,
                constituents: Vec::new(),
            },
        );
        Ok(())
    }

    fn read_constituent(&mut self, keyword: &str, body: &str) -> Result<(), TdbError> {
        let (name, list) = body
            .split_once(char::is_whitespace)
            .ok_or_else(|| malformed(keyword, format!("missing sublattice list in '{}'", body)))?;
        let name = phase_name(name);
        let list = list.trim().trim_start_matches(':').trim_end_matches(':');
        let sublattices: Vec<Vec<String>> = list
            .split(':')
            .map(|sub| {
                sub.split(',')
                    .map(|s| s.trim().trim_end_matches('%').to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .collect();
        if sublattices.iter().any(|s: &Vec<String>| s.is_empty()) {
            return Err(malformed(keyword, format!("empty sublattice in phase {}", name)));
        }
        let phase = self
            .phases
            .get_mut(&name)
            .ok_or_else(|| TdbError::UndeclaredPhase(name.clone()))?;
        if phase.sublattice_count() != sublattices.len() {
            return Err(malformed(
                keyword,
                format!(
                    "phase {} has {} sublattices, constituent list has {}",
                    name,
                    phase.sublattice_count(),
                    sublattices.len()
                ),
            ));
        }
        phase.constituents = sublattices;
        Ok(())
    }

    fn read_function(&mut self, keyword: &str, body: &str) -> Result<(), TdbError> {
        let (name, rest) = body
            .split_once(char::is_whitespace)
            .ok_or_else(|| malformed(keyword, format!("missing expression in '{}'", body)))?;
        let value = Piecewise::parse(rest)
            .map_err(|e| malformed(keyword, format!("function {}: {}", name, e)))?;
        if self.functions.insert(name.to_string(), value).is_some() {
            warn!("function {} redefined, keeping the last definition", name);
        }
        Ok(())
    }

    fn read_parameter(&mut self, keyword: &str, body: &str, header: &Regex) -> Result<(), TdbError> {
        let caps = header
            .captures(body)
            .ok_or_else(|| malformed(keyword, format!("bad parameter header in '{}'", body)))?;
        let kind = caps[1].to_string();
        let inner = caps[2].replace(' ', "");
        let rest = caps.get(3).map_or("", |m| m.as_str());

        let (array, order) = match inner.split_once(';') {
            Some((array, order)) => (array.to_string(), order.to_string()),
            None => (inner.clone(), "0".to_string()),
        };
        let order = order
            .parse::<u32>()
            .map_err(|_| malformed(keyword, format!("bad order '{}' in {}", order, inner)))?;
        let (phase, constituent_text) = array
            .split_once(',')
            .ok_or_else(|| malformed(keyword, format!("no constituents in {}", inner)))?;
        let phase = phase_name(phase);
        let constituents: Vec<Vec<String>> = constituent_text
            .split(':')
            .map(|sub| sub.split(',').map(|s| s.to_string()).collect())
            .collect();

        let declared = self
            .phases
            .get(&phase)
            .ok_or_else(|| TdbError::UndeclaredPhase(phase.clone()))?;
        if declared.sublattice_count() != constituents.len() {
            return Err(malformed(
                keyword,
                format!(
                    "{}({}) lists {} sublattices, phase has {}",
                    kind,
                    array,
                    constituents.len(),
                    declared.sublattice_count()
                ),
            ));
        }
        let value = Piecewise::parse(rest)
            .map_err(|e| malformed(keyword, format!("{}({}): {}", kind, inner, e)))?;
        self.parameters.push(Parameter {
            kind,
            phase,
            constituents,
            order,
            value,
        });
        Ok(())
    }

    fn check_phases_constituted(&self) {
        for phase in self.phases.values() {
            if phase.constituents.is_empty() {
                warn!("phase {} has no CONSTITUENT command", phase.name);
            }
        }
    }

    pub fn phase_names(&self) -> BTreeSet<String> {
        self.phases.keys().cloned().collect()
    }

    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases.get(&name.to_uppercase())
    }

    pub fn element_names(&self) -> BTreeSet<String> {
        self.elements.keys().cloned().collect()
    }

    pub fn parameters_of<'a>(&'a self, phase: &'a str) -> impl Iterator<Item = &'a Parameter> + 'a {
        self.parameters.iter().filter(move |p| p.phase == phase)
    }

    /// value of a FUNCTION at (T, P)
    pub fn evaluate_function(&self, name: &str, T: f64, P: f64) -> Result<f64, TdbError> {
        let mut active = HashSet::new();
        self.evaluate_function_nested(&name.to_uppercase(), T, P, 0, &mut active)
    }

    fn evaluate_function_nested(
        &self,
        name: &str,
        T: f64,
        P: f64,
        depth: usize,
        active: &mut HashSet<String>,
    ) -> Result<f64, TdbError> {
        if depth > MAX_REFERENCE_DEPTH || active.contains(name) {
            return Err(TdbError::RecursionLimit(name.to_string()));
        }
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| TdbError::UndefinedFunction(name.to_string()))?;
        active.insert(name.to_string());
        let value = function.eval(T, P, &mut |reference: &str| {
            self.evaluate_function_nested(reference, T, P, depth + 1, active)
        });
        active.remove(name);
        value
    }

    /// value of a PARAMETER at (T, P)
    pub fn evaluate_parameter(&self, parameter: &Parameter, T: f64, P: f64) -> Result<f64, TdbError> {
        let mut active = HashSet::new();
        parameter.value.eval(T, P, &mut |reference: &str| {
            self.evaluate_function_nested(reference, T, P, 1, &mut active)
        })
    }

    /// functions referenced somewhere but never defined
    pub fn undefined_references(&self) -> BTreeSet<String> {
        let mut missing = BTreeSet::new();
        let referenced = self
            .functions
            .values()
            .chain(self.parameters.iter().map(|p| &p.value))
            .flat_map(|pw| pw.references());
        for name in referenced {
            if !self.functions.contains_key(&name) {
                missing.insert(name);
            }
        }
        missing
    }
}

/// strips the `:L`/`:G` style suffix of a phase declaration
fn phase_name(raw: &str) -> String {
    raw.split(':').next().unwrap_or(raw).trim().to_string()
}

/// collapses all whitespace runs (including line breaks) to single spaces
fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
