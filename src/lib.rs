pub mod config;
pub mod duration;
pub mod forest;
pub mod instant;
pub mod materialize;
pub mod persistence;
pub mod record;
pub mod task;

pub use config::{ConfigError, ImportConfig};
pub use duration::{CalendarDuration, DurationError, duration_between};
pub use forest::{
    Forest, ForestBuild, ForestBuilder, ForestError, Node, OrphanPolicy, PlacedRecord, Placement,
    build_forest,
};
pub use instant::parse_instant;
pub use materialize::{Materializer, Outline, OutlineRow, materialize};
pub use persistence::{
    PersistenceError, PersistenceResult, forest_to_delimited, load_config_from_json,
    load_forest_from_csv, load_forest_from_json, save_config_to_json, save_forest_to_csv,
    save_forest_to_json,
};
pub use record::{ID_FIELD, Record, Table, parse_table};
pub use task::ScheduleRow;
