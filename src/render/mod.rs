pub mod annotate;
pub mod persist;
