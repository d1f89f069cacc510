//! Shared value types for the VCD loader workspace.
//!
//! This crate provides the 4-state [`Logic`] scalar and the packed [`LogicVec`]
//! bit vector that value changes decode into.

#![warn(missing_docs)]

pub mod logic;
pub mod logic_vec;

pub use logic::Logic;
pub use logic_vec::LogicVec;
