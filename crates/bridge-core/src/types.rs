//! Core domain types for the alert bridge.

pub mod instruction;

pub use instruction::*;
