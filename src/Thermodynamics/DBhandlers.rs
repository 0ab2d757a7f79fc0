pub mod TDBdata;

pub mod tdb_expression;
mod tdb_expression_tests;
