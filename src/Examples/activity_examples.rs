use crate::Thermodynamics::Activity::ActivityCurve;
use crate::Thermodynamics::ActivityTask::ActivityTask;
use crate::Thermodynamics::ChemEquilibrium::EquilibriumSolver::{
    EquilibriumSolver, LowestGibbsSolver,
};
use crate::Thermodynamics::ChemEquilibrium::SolutionModel::R;
use crate::Thermodynamics::ChemEquilibrium::conditions::{ConditionSet, StateVariable};
use crate::Thermodynamics::DBhandlers::TDBdata::Database;
use crate::Utils::plots::SvgPlotRenderer;
use crate::settings::ActivitySettings;
use log::error;
use prettytable::{Table, row};

const SETTINGS_FILE: &str = "activity_settings.json";

pub fn activity_examples(task: usize) {
    match task {
        0 => {
            // Zn activity in Cu-Zn at 1073 K against experiment
            let settings = match ActivitySettings::load_or_default(SETTINGS_FILE) {
                Ok(settings) => settings,
                Err(e) => {
                    error!("{}", e);
                    return;
                }
            };
            let renderer = SvgPlotRenderer::new(&settings.output);
            let mut task = ActivityTask::new(settings);
            match task.run(&LowestGibbsSolver::new(), &renderer) {
                Ok(_) => {
                    task.pretty_print();
                    println!("plot saved to {}", task.settings.output.display());
                }
                Err(e) => error!("activity calculation failed: {}", e),
            }
        }
        1 => {
            // ideal solution: activity equals mole fraction
            let tdb = "
             ELEMENT A BLANK 1.0 0 0 !
             ELEMENT B BLANK 1.0 0 0 !
             PHASE LIQUID % 1 1.0 !
             CONSTITUENT LIQUID :A,B: !
             PARAMETER G(LIQUID,A;0) 1 -1000; 6000 N !
             PARAMETER G(LIQUID,B;0) 1 -2000; 6000 N !
            ";
            let db = match Database::from_tdb_str(tdb) {
                Ok(db) => db,
                Err(e) => {
                    error!("{}", e);
                    return;
                }
            };
            let components = vec!["A".to_string(), "B".to_string()];
            let phases = vec!["LIQUID".to_string()];
            let T = 1000.0;
            let base = ConditionSet::new()
                .with(StateVariable::T, T)
                .with(StateVariable::P, 101325.0);
            let solver = LowestGibbsSolver::new();
            let reference = solver.equilibrium(
                &db,
                &components,
                &phases,
                &base.clone().with(StateVariable::X("B".to_string()), 1.0),
            );
            let sweep = solver.equilibrium(
                &db,
                &components,
                &phases,
                &base.with(StateVariable::X("B".to_string()), (0.0, 1.0, 0.1)),
            );
            let (reference, sweep) = match (reference, sweep) {
                (Ok(r), Ok(s)) => (r, s),
                (Err(e), _) | (_, Err(e)) => {
                    error!("{}", e);
                    return;
                }
            };
            sweep.pretty_print();
            let curve = reference
                .chemical_potential("B")
                .and_then(|mu_ref| {
                    Ok((mu_ref[0], sweep.mole_fraction("B")?, sweep.chemical_potential("B")?))
                })
                .map_err(|e| e.to_string())
                .and_then(|(mu_ref, x, mu)| {
                    ActivityCurve::new("B", x, mu, mu_ref, T, R).map_err(|e| e.to_string())
                });
            match curve {
                Ok(curve) => curve.pretty_print(),
                Err(e) => error!("{}", e),
            }
        }
        2 => {
            // what is inside the demo database
            let settings = ActivitySettings::default();
            let db = match Database::load(&settings.database) {
                Ok(db) => db,
                Err(e) => {
                    error!("{}", e);
                    return;
                }
            };
            let mut table = Table::new();
            table.add_row(row!["phase", "site ratios", "constituents", "parameters"]);
            for name in db.phase_names() {
                if let Some(phase) = db.phase(&name) {
                    table.add_row(row![
                        name,
                        format!("{:?}", phase.site_ratios),
                        format!("{:?}", phase.constituents),
                        db.parameters_of(&phase.name).count()
                    ]);
                }
            }
            table.printstd();
            println!("elements: {:?}", db.element_names());
            for (name, function) in &db.functions {
                println!(
                    "{}: {} segment(s), value at {} K = {:?}",
                    name,
                    function.segments.len(),
                    settings.temperature,
                    db.evaluate_function(name, settings.temperature, settings.pressure)
                );
            }
        }
        _ => println!("no example with number {}", task),
    }
}
