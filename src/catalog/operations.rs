//! Operations module (atomic side effects)

pub mod mutations;
pub mod persistence;
