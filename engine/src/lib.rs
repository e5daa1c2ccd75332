// Engine library root
// Formatting primitives, declarative record layouts, file assembly and the
// async generation service for CNAB 444 remittance files.

pub mod assembler;
pub mod config;
pub mod data;
pub mod error;
pub mod formatters;
pub mod layout;
pub mod services;

pub use error::{EngineError, Result};
