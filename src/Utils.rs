/// experimental data series in JSON or two-column text
pub mod load_from_file;
/// terminal logger
pub mod logger;
mod logger_tests;
/// comparison plots
pub mod plots;
