mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod report;
mod utils;

#[cfg(test)]
mod test;

pub use api::{Mode, Session};
pub use config::{Collections, Config, FieldNames};
pub use error::{Error, ErrorType, Result};
