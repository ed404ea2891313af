//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod platform;
pub mod project;
pub mod ssh;

pub use config::ShiftCiConfig;
pub use error::EnableCiError;
pub use platform::{
    Account, Application, Cartridge, Credentials, Domain, EmbeddableCartridge, EmbeddedCapability,
    RegisteredKey,
};
pub use project::Project;
