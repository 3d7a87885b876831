pub mod error;
pub mod explorer;
pub mod explorer_model;
