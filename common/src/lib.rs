pub mod config;
pub mod frame;
