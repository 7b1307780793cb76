// Library for the binary and tests to access modules

pub mod cdf;
pub mod combine;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod resolver;
pub mod stats;

pub use error::{ReportError, Result};
