#[cfg(test)]
mod tests {
    use crate::Thermodynamics::ChemEquilibrium::conditions::{ConditionValue, StateVariable};
    use crate::settings::{ActivitySettings, SettingsError};
    use tempfile::tempdir;

    #[test]
    fn test_defaults_describe_cuzn_at_1073() {
        let settings = ActivitySettings::default();
        assert_eq!(settings.component, "ZN");
        assert_eq!(settings.temperature, 1073.0);
        assert_eq!(settings.composition_range.step, 0.005);
        let points = settings
            .sweep_conditions()
            .grid(&["CU".to_string(), "ZN".to_string()])
            .unwrap();
        assert_eq!(points.len(), 201);
        let reference = settings.reference_conditions();
        assert_eq!(
            reference.get(&StateVariable::X("ZN".to_string())),
            Some(&ConditionValue::Scalar(1.0))
        );
        assert_eq!(reference.coordinates().unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("activity_settings.json");
        let mut settings = ActivitySettings::default();
        settings.temperature = 1200.0;
        settings.experimental_data = None;
        settings.plot.title = "other".to_string();
        settings.save(&path).unwrap();
        let loaded = ActivitySettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_and_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"temperature": 900.0, "plot": {"title": "t"}}"#).unwrap();
        let loaded = ActivitySettings::load_or_default(&path).unwrap();
        assert_eq!(loaded.temperature, 900.0);
        assert_eq!(loaded.component, "ZN");
        assert_eq!(loaded.plot.title, "t");

        let missing = ActivitySettings::load_or_default(dir.path().join("none.json")).unwrap();
        assert_eq!(missing, ActivitySettings::default());

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ActivitySettings::load(&path),
            Err(SettingsError::Json(_))
        ));
    }
}
