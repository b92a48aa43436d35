//! Wine/Proton game launcher core: prefix discovery, game catalog and
//! supervised launches.

pub mod catalog;
pub mod config;
pub mod error;
pub mod launch;
pub mod paths;
pub mod scan;
