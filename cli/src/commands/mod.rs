//! Command implementations

pub mod enable;

pub use enable::EnableArgs;
