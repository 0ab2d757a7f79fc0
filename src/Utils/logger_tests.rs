#[cfg(test)]
mod tests {
    use crate::Utils::logger::init_logger;
    use log::LevelFilter;

    #[test]
    fn test_second_init_reports_existing_logger() {
        // another test may have installed the logger already
        let _ = init_logger(LevelFilter::Debug);
        assert!(!init_logger(LevelFilter::Info));
        log::info!("logger still usable");
    }
}
