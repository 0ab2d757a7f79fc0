#[cfg(test)]
mod tests {
    use crate::Thermodynamics::ChemEquilibrium::conditions::{
        ConditionError, ConditionSet, ConditionValue, MAX_RANGE_POINTS, StateVariable,
    };
    use approx::assert_relative_eq;

    fn binary() -> Vec<String> {
        vec!["CU".to_string(), "ZN".to_string()]
    }

    fn base() -> ConditionSet {
        ConditionSet::new()
            .with(StateVariable::P, 101325.0)
            .with(StateVariable::T, 1073.0)
    }

    #[test]
    fn test_state_variable_parsing() {
        assert_eq!("T".parse::<StateVariable>().unwrap(), StateVariable::T);
        assert_eq!("p".parse::<StateVariable>().unwrap(), StateVariable::P);
        assert_eq!(
            "x(zn)".parse::<StateVariable>().unwrap(),
            StateVariable::X("ZN".to_string())
        );
        assert_eq!(StateVariable::X("ZN".to_string()).to_string(), "X(ZN)");
        assert!(matches!(
            "Y(ZN)".parse::<StateVariable>(),
            Err(ConditionError::UnknownVariable(_))
        ));
        assert!("X()".parse::<StateVariable>().is_err());
    }

    #[test]
    fn test_range_includes_stop_on_lattice() {
        let v = ConditionValue::from((0.0, 1.0, 0.005))
            .values(&StateVariable::X("ZN".to_string()))
            .unwrap();
        assert_eq!(v.len(), 201);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[200], 1.0);
        assert_relative_eq!(v[100], 0.5, epsilon = 1e-12);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_range_off_lattice_stops_below() {
        let v = ConditionValue::from((0.0, 1.0, 0.3)).values(&StateVariable::T).unwrap();
        assert_eq!(v.len(), 4);
        assert_relative_eq!(v[3], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_ranges() {
        for (start, stop, step) in [(0.0, 1.0, 0.0), (0.0, 1.0, -0.1), (1.0, 0.0, 0.1), (0.0, f64::NAN, 0.1)] {
            let err = ConditionValue::from((start, stop, step))
                .values(&StateVariable::T)
                .unwrap_err();
            assert!(matches!(err, ConditionError::InvalidRange { .. }));
        }
    }

    #[test]
    fn test_too_fine_ranges_rejected() {
        for step in [1e-300, 1e-12, 1.0 / (MAX_RANGE_POINTS as f64 * 2.0)] {
            let err = ConditionValue::from((0.0, 1.0, step))
                .values(&StateVariable::X("ZN".to_string()))
                .unwrap_err();
            assert!(matches!(err, ConditionError::InvalidRange { .. }));
        }
        let set = ConditionSet::new()
            .with(StateVariable::P, 101325.0)
            .with(StateVariable::T, 1073.0)
            .with(StateVariable::X("ZN".to_string()), (0.0, 1.0, 1e-300));
        assert!(matches!(
            set.grid(&binary()).unwrap_err(),
            ConditionError::InvalidRange { .. }
        ));
        // a fine but bounded range still expands
        let v = ConditionValue::from((0.0, 1.0, 1e-5)).values(&StateVariable::T).unwrap();
        assert_eq!(v.len(), 100_001);
    }

    #[test]
    fn test_sweep_grid() {
        let set = base().with(StateVariable::X("ZN".to_string()), (0.0, 1.0, 0.005));
        assert_eq!(
            set.swept_variable().unwrap(),
            Some(StateVariable::X("ZN".to_string()))
        );
        let points = set.grid(&binary()).unwrap();
        assert_eq!(points.len(), 201);
        assert_eq!(set.coordinates().unwrap().len(), 201);
        for p in &points {
            assert_eq!(p.T, 1073.0);
            assert_eq!(p.P, 101325.0);
            assert_eq!(p.N, 1.0);
            assert_relative_eq!(p.x["CU"] + p.x["ZN"], 1.0, epsilon = 1e-12);
        }
        assert_eq!(points[0].x["ZN"], 0.0);
        assert_eq!(points[0].x["CU"], 1.0);
        assert_eq!(points[0].present_components(), vec!["CU".to_string()]);
        assert_eq!(points[200].x["ZN"], 1.0);
        assert_eq!(points[200].x["CU"], 0.0);
        assert_eq!(points[100].present_components(), binary());
    }

    #[test]
    fn test_single_point() {
        let set = base().with(StateVariable::X("ZN".to_string()), 1.0);
        assert_eq!(set.swept_variable().unwrap(), None);
        assert_eq!(set.coordinates().unwrap(), vec![0.0]);
        let points = set.grid(&binary()).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].present_components(), vec!["ZN".to_string()]);
    }

    #[test]
    fn test_multiple_ranges_rejected() {
        let set = ConditionSet::new()
            .with(StateVariable::P, 101325.0)
            .with(StateVariable::T, (1000.0, 1100.0, 50.0))
            .with(StateVariable::X("ZN".to_string()), (0.0, 1.0, 0.1));
        let err = set.grid(&binary()).unwrap_err();
        assert_eq!(
            err,
            ConditionError::MultipleRanges(vec!["T".to_string(), "X(ZN)".to_string()])
        );
    }

    #[test]
    fn test_temperature_sweep() {
        let set = ConditionSet::new()
            .with(StateVariable::P, 101325.0)
            .with(StateVariable::T, (1000.0, 1100.0, 50.0))
            .with(StateVariable::X("ZN".to_string()), 0.3);
        let points = set.grid(&binary()).unwrap();
        let T: Vec<f64> = points.iter().map(|p| p.T).collect();
        assert_eq!(T, vec![1000.0, 1050.0, 1100.0]);
        assert_relative_eq!(points[1].x["CU"], 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_and_bad_conditions() {
        let no_t = ConditionSet::new()
            .with(StateVariable::P, 101325.0)
            .with(StateVariable::X("ZN".to_string()), 0.5);
        assert_eq!(
            no_t.grid(&binary()).unwrap_err(),
            ConditionError::Missing("T".to_string())
        );

        let no_x = base();
        assert!(matches!(
            no_x.grid(&binary()).unwrap_err(),
            ConditionError::WrongFractionCount { fixed: 0, components: 2 }
        ));

        let foreign = base().with(StateVariable::X("AL".to_string()), 0.5);
        assert_eq!(
            foreign.grid(&binary()).unwrap_err(),
            ConditionError::ForeignComponent("AL".to_string())
        );

        let out_of_bounds = base().with(StateVariable::X("ZN".to_string()), 1.5);
        assert!(matches!(
            out_of_bounds.grid(&binary()).unwrap_err(),
            ConditionError::OutOfBounds { .. }
        ));

        let cold = ConditionSet::new()
            .with(StateVariable::P, 101325.0)
            .with(StateVariable::T, -5.0)
            .with(StateVariable::X("ZN".to_string()), 0.5);
        assert!(matches!(
            cold.grid(&binary()).unwrap_err(),
            ConditionError::OutOfBounds { .. }
        ));
    }

    #[test]
    fn test_fraction_sum_in_ternary() {
        let components = vec!["AL".to_string(), "CU".to_string(), "ZN".to_string()];
        let set = base()
            .with(StateVariable::X("CU".to_string()), 0.7)
            .with(StateVariable::X("ZN".to_string()), 0.6);
        assert!(matches!(
            set.grid(&components).unwrap_err(),
            ConditionError::FractionSum(_)
        ));
        let mut ok = set.clone();
        ok.set(StateVariable::X("ZN".to_string()), 0.2);
        let points = ok.grid(&components).unwrap();
        assert_relative_eq!(points[0].x["AL"], 0.1, epsilon = 1e-12);
        assert_eq!(ok.get(&StateVariable::X("CU".to_string())), Some(&ConditionValue::Scalar(0.7)));
    }
}
