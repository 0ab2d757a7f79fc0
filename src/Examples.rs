pub mod activity_examples;
