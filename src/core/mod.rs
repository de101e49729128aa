//! Core types: errors, configuration, the value model and signatures.

pub mod config;
pub mod errors;
pub mod signature;
pub mod value;
