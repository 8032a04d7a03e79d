use crate::config::ConfigError;
use crate::forest::ForestError;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Forest(#[from] ForestError),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub mod file;

pub use file::{
    forest_to_delimited, load_config_from_json, load_forest_from_csv, load_forest_from_json,
    save_config_to_json, save_forest_to_csv, save_forest_to_json,
};
