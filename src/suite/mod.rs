pub mod checks;
pub mod runner;
pub mod suite_model;
