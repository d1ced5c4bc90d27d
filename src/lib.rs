//! ApplyLess: job fit scoring and decision engine

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod output;
pub mod policy;
pub mod processing;

pub use config::Config;
pub use error::{ApplyLessError, Result};
