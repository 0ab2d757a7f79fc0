#[cfg(test)]
mod tests {
    use crate::Thermodynamics::DBhandlers::tdb_expression::{Piecewise, TdbExpr};
    use approx::assert_relative_eq;

    fn no_refs(name: &str) -> Result<f64, String> {
        Err(format!("unexpected reference {}", name))
    }

    #[test]
    fn test_polynomial_with_log_and_negative_power() {
        let e = TdbExpr::parse("-7770.458+130.485235*T-24.112392*T*LN(T)+52478*T**(-1)").unwrap();
        let T: f64 = 500.0;
        let expected = -7770.458 + 130.485235 * T - 24.112392 * T * T.ln() + 52478.0 / T;
        let value = e.eval(T, 1e5, &mut no_refs).unwrap();
        assert_relative_eq!(value, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_precedence_and_unary_minus() {
        let e = TdbExpr::parse("2+3*4").unwrap();
        assert_eq!(e.eval(1.0, 1.0, &mut no_refs).unwrap(), 14.0);
        let e = TdbExpr::parse("-2**2").unwrap();
        assert_eq!(e.eval(1.0, 1.0, &mut no_refs).unwrap(), -4.0);
        let e = TdbExpr::parse("(1+1)**3/4").unwrap();
        assert_eq!(e.eval(1.0, 1.0, &mut no_refs).unwrap(), 2.0);
        let e = TdbExpr::parse("-.5E+1*T").unwrap();
        assert_eq!(e.eval(2.0, 1.0, &mut no_refs).unwrap(), -10.0);
    }

    #[test]
    fn test_pressure_and_exp() {
        let e = TdbExpr::parse("EXP(0)+P*1E-5").unwrap();
        assert_relative_eq!(e.eval(300.0, 101325.0, &mut no_refs).unwrap(), 2.01325, epsilon = 1e-12);
    }

    #[test]
    fn test_references_are_collected_and_resolved() {
        let e = TdbExpr::parse("+GHSERCU#+12964.736-9.511904*T+GHSERCU").unwrap();
        assert_eq!(e.references(), vec!["GHSERCU".to_string()]);
        let value = e
            .eval(1000.0, 1e5, &mut |name: &str| -> Result<f64, String> {
                assert_eq!(name, "GHSERCU");
                Ok(100.0)
            })
            .unwrap();
        assert_relative_eq!(value, 200.0 + 12964.736 - 9511.904, epsilon = 1e-9);
    }

    #[test]
    fn test_bad_expressions() {
        assert!(TdbExpr::parse("").is_err());
        assert!(TdbExpr::parse("1+").is_err());
        assert!(TdbExpr::parse("(1+2").is_err());
        assert!(TdbExpr::parse("SIN(T)").is_err());
        assert!(TdbExpr::parse("1 2").is_err());
        assert!(TdbExpr::parse("T&2").is_err());
    }

    #[test]
    fn test_piecewise_segments() {
        let pw = Piecewise::parse("298.15 1000+T; 700 Y 2000+T; 1700 N REF0").unwrap();
        assert_eq!(pw.segments.len(), 2);
        assert_eq!(pw.reference.as_deref(), Some("REF0"));
        assert_eq!(pw.segments[0].T_low, 298.15);
        assert_eq!(pw.segments[1].T_low, 700.0);
        assert_eq!(pw.segments[1].T_high, 1700.0);

        assert_eq!(pw.eval(500.0, 1e5, &mut no_refs).unwrap(), 1500.0);
        // boundary belongs to the upper segment
        assert_eq!(pw.eval(700.0, 1e5, &mut no_refs).unwrap(), 2700.0);
        // last segment is closed
        assert_eq!(pw.eval(1700.0, 1e5, &mut no_refs).unwrap(), 3700.0);
    }

    #[test]
    fn test_piecewise_outside_range_is_nan() {
        let pw = Piecewise::parse("298.15 1000+T; 700 N").unwrap();
        assert!(pw.eval(200.0, 1e5, &mut no_refs).unwrap().is_nan());
        assert!(pw.eval(701.0, 1e5, &mut no_refs).unwrap().is_nan());
        assert!(pw.segment_at(701.0).is_none());
    }

    #[test]
    fn test_piecewise_errors() {
        // no upper limit
        assert!(Piecewise::parse("298.15 1000+T").is_err());
        // Y without a following segment
        assert!(Piecewise::parse("298.15 1000+T; 700 Y").is_err());
        // segments after N
        assert!(Piecewise::parse("298.15 T; 700 N; 900 N").is_err());
        // bad flag
        assert!(Piecewise::parse("298.15 T; 700 Q").is_err());
        // limit is not a number
        assert!(Piecewise::parse("LOW T; 700 N").is_err());
    }

    #[test]
    fn test_piecewise_references_are_unique() {
        let pw = Piecewise::parse("298.15 +GA#+GB#; 700 Y GA#*2; 900 N").unwrap();
        assert_eq!(pw.references(), vec!["GA".to_string(), "GB".to_string()]);
    }
}
