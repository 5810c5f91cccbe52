pub mod config;
pub mod sensor;
