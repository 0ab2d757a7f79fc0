/// activity of a component from equilibrium chemical potentials
pub mod Activity;
/// database -> equilibrium -> activity -> plot pipeline
/// # Examples
/// ```
/// use CalphadActivity::Thermodynamics::ActivityTask::ActivityTask;
/// use CalphadActivity::Thermodynamics::ChemEquilibrium::EquilibriumSolver::LowestGibbsSolver;
/// use CalphadActivity::Thermodynamics::DBhandlers::TDBdata::Database;
/// use CalphadActivity::settings::ActivitySettings;
/// use approx::assert_relative_eq;
/// // ideal binary: both end members with G = 0 and no interaction parameters
/// let tdb = "
///  ELEMENT A BLANK 1.0 0 0 !
///  ELEMENT B BLANK 1.0 0 0 !
///  PHASE LIQUID % 1 1.0 !
///  CONSTITUENT LIQUID :A,B: !
///  PARAMETER G(LIQUID,A;0) 1 0; 6000 N !
///  PARAMETER G(LIQUID,B;0) 1 0; 6000 N !
/// ";
/// let db = Database::from_tdb_str(tdb).unwrap();
/// let mut settings = ActivitySettings::default();
/// settings.components = vec!["A".to_string(), "B".to_string()];
/// settings.phases = vec!["LIQUID".to_string()];
/// settings.component = "B".to_string();
/// settings.composition_range.step = 0.1;
/// let mut task = ActivityTask::with_database(settings, db);
/// let solver = LowestGibbsSolver::new();
/// task.calculate_reference(&solver).unwrap();
/// task.calculate_sweep(&solver).unwrap();
/// let curve = task.calculate_activity().unwrap();
/// assert_eq!(curve.len(), 11);
/// assert_relative_eq!(curve.activity[3], 0.3, epsilon = 1e-9);
/// ```
pub mod ActivityTask;
mod ActivityTask_tests;
/// equilibrium conditions, solution model and solver
pub mod ChemEquilibrium;
#[allow(non_snake_case)]
/// thermodynamic database (TDB) loader and its expression language
pub mod DBhandlers;
