pub mod sources;
pub mod strategies;
