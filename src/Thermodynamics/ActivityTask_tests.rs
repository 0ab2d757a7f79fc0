#[cfg(test)]
mod tests {
    use crate::Thermodynamics::ActivityTask::{ActivityTask, ActivityTaskError};
    use crate::Thermodynamics::ChemEquilibrium::EquilibriumSolver::LowestGibbsSolver;
    use crate::Thermodynamics::DBhandlers::TDBdata::Database;
    use crate::Utils::plots::{PlotError, PlotOptions, PlotRenderer, Series, SeriesStyle, SvgPlotRenderer};
    use crate::settings::ActivitySettings;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::tempdir;

    /// keeps whatever it is asked to draw
    #[derive(Default)]
    struct RecordingRenderer {
        drawn: RefCell<Vec<Series>>,
    }

    impl PlotRenderer for RecordingRenderer {
        fn render(&self, series: &[Series], _options: &PlotOptions) -> Result<(), PlotError> {
            self.drawn.borrow_mut().extend_from_slice(series);
            Ok(())
        }
    }

    fn data_file(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
    }

    fn cuzn_settings() -> ActivitySettings {
        let mut settings = ActivitySettings::default();
        settings.database = data_file("cuzn.tdb");
        settings.experimental_data = Some(data_file("zn_activity_1073K.json"));
        settings
    }

    #[test]
    fn test_cuzn_activity_end_to_end() {
        let renderer = RecordingRenderer::default();
        let mut task = ActivityTask::new(cuzn_settings());
        let curve = task.run(&LowestGibbsSolver::new(), &renderer).unwrap().clone();

        assert_eq!(curve.len(), 201);
        assert_eq!(curve.component, "ZN");
        assert_relative_eq!(curve.x[100], 0.5, epsilon = 1e-12);
        // pure Cu: Zn is absent and its activity undefined
        assert!(curve.activity[0].is_nan());
        assert_eq!(curve.undefined_count(), 1);
        // pure Zn is the reference state
        assert_relative_eq!(curve.activity[200], 1.0, epsilon = 1e-12);
        for &a in &curve.activity[1..200] {
            assert!(a > 0.0 && a < 1.0, "activity {} outside (0, 1)", a);
        }
        // strong negative deviation from Raoult's law
        assert!(curve.activity[100] < 0.5);

        let reference = task.reference.as_ref().unwrap();
        assert_eq!(reference.len(), 1);
        assert_eq!(reference.stable_phase[0].as_deref(), Some("LIQUID"));
        let sweep = task.sweep.as_ref().unwrap();
        assert_eq!(sweep.stable_phase[0].as_deref(), Some("FCC_A1"));
        assert_eq!(sweep.stable_phase[200].as_deref(), Some("LIQUID"));

        let drawn = renderer.drawn.borrow();
        assert_eq!(drawn.len(), 2);
        assert_eq!(drawn[0].style, SeriesStyle::Line);
        assert_eq!(drawn[0].x.len(), 201);
        assert_eq!(drawn[1].style, SeriesStyle::Markers);
        assert_eq!(drawn[1].x.len(), task.experimental.as_ref().unwrap().len());
    }

    #[test]
    fn test_regular_solution_activity() {
        let L0 = -12000.0;
        let T = 900.0;
        let tdb = format!(
            "ELEMENT A BLANK 1 0 0 ! ELEMENT B BLANK 1 0 0 !
             PHASE LIQUID % 1 1 ! CONSTITUENT LIQUID :A,B: !
             PARAMETER G(LIQUID,A;0) 1 -3000; 6000 N !
             PARAMETER G(LIQUID,B;0) 1 -7000; 6000 N !
             PARAMETER L(LIQUID,A,B;0) 1 {}; 6000 N !",
            L0
        );
        let mut settings = ActivitySettings::default();
        settings.components = vec!["A".to_string(), "B".to_string()];
        settings.phases = vec!["LIQUID".to_string()];
        settings.component = "B".to_string();
        settings.temperature = T;
        settings.composition_range.step = 0.1;
        settings.experimental_data = None;
        let R = settings.gas_constant;
        let db = Database::from_tdb_str(&tdb).unwrap();
        let renderer = RecordingRenderer::default();
        let mut task = ActivityTask::with_database(settings, db);
        let curve = task.run(&LowestGibbsSolver::new(), &renderer).unwrap();
        assert_eq!(curve.len(), 11);
        for (&x, &a) in curve.x.iter().zip(curve.activity.iter()).skip(1) {
            let expected = x * (L0 * (1.0 - x) * (1.0 - x) / (R * T)).exp();
            assert_relative_eq!(a, expected, epsilon = 1e-9);
        }
        // no experimental data, one series
        assert_eq!(renderer.drawn.borrow().len(), 1);
    }

    #[test]
    fn test_steps_out_of_order() {
        let mut task = ActivityTask::new(cuzn_settings());
        let solver = LowestGibbsSolver::new();
        assert!(matches!(
            task.calculate_reference(&solver),
            Err(ActivityTaskError::NotReady(_))
        ));
        assert!(matches!(
            task.calculate_activity(),
            Err(ActivityTaskError::NotReady(_))
        ));
        assert!(matches!(task.plot_series(), Err(ActivityTaskError::NotReady(_))));
        task.load_database().unwrap();
        task.calculate_sweep(&solver).unwrap();
        assert!(matches!(
            task.calculate_activity(),
            Err(ActivityTaskError::NotReady("calculate_reference()"))
        ));
    }

    #[test]
    fn test_missing_files_are_reported() {
        let mut settings = cuzn_settings();
        settings.database = PathBuf::from("no/such/database.tdb");
        let mut task = ActivityTask::new(settings);
        assert!(matches!(
            task.load_database(),
            Err(ActivityTaskError::Database(_))
        ));

        let mut settings = cuzn_settings();
        settings.experimental_data = Some(PathBuf::from("no/such/data.json"));
        let mut task = ActivityTask::new(settings);
        let err = task
            .run(&LowestGibbsSolver::new(), &RecordingRenderer::default())
            .unwrap_err();
        assert!(matches!(err, ActivityTaskError::Data(_)));
    }

    #[test]
    fn test_unknown_component_is_reported() {
        let mut settings = cuzn_settings();
        settings.component = "AL".to_string();
        let mut task = ActivityTask::new(settings);
        let err = task
            .run(&LowestGibbsSolver::new(), &RecordingRenderer::default())
            .unwrap_err();
        assert!(matches!(err, ActivityTaskError::Equilibrium(_)));
    }

    #[test]
    fn test_svg_written() {
        let dir = tempdir().unwrap();
        let mut settings = cuzn_settings();
        settings.output = dir.path().join("activity.svg");
        let renderer = SvgPlotRenderer::new(&settings.output);
        let mut task = ActivityTask::new(settings);
        task.run(&LowestGibbsSolver::new(), &renderer).unwrap();
        let svg = std::fs::read_to_string(dir.path().join("activity.svg")).unwrap();
        assert!(svg.contains("<svg"));
    }
}
