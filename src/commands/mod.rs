pub mod build;
pub mod clean;
