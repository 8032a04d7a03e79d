use super::{PersistenceError, PersistenceResult};
use crate::config::ImportConfig;
use crate::forest::{Forest, ForestBuild};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::{debug, instrument};

#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_forest_from_csv<P: AsRef<Path>>(
    path: P,
    config: &ImportConfig,
) -> PersistenceResult<ForestBuild> {
    config.validate()?;
    let raw = fs::read_to_string(path)?;
    let build = config.builder().build(&raw)?;
    debug!(nodes = build.placements.len(), "loaded delimited schedule");
    Ok(build)
}

pub fn save_forest_to_json<P: AsRef<Path>>(forest: &Forest, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, forest)?;
    Ok(())
}

/// Reads a forest written by [`save_forest_to_json`].
///
/// Nesting depth follows the ID paths, so serde_json's recursion limit is
/// lifted for this read.
pub fn load_forest_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Forest> {
    let file = File::open(path)?;
    let mut de = serde_json::Deserializer::from_reader(BufReader::new(file));
    de.disable_recursion_limit();
    let mut forest = Forest::deserialize(&mut de)?;
    de.end()?;
    forest.normalize_leaves();
    Ok(forest)
}

/// Flattens `forest` back into delimited text, pre-order.
///
/// The header is every field name in first-seen order; fields a record lacks
/// are written empty. Values are written verbatim, without quoting, so a name
/// or value containing the delimiter or the line separator is `InvalidData`.
pub fn forest_to_delimited(forest: &Forest, config: &ImportConfig) -> PersistenceResult<String> {
    config.validate()?;
    if !config.delimiter.is_ascii() {
        return Err(PersistenceError::InvalidData(format!(
            "delimiter {:?} is not a single byte",
            config.delimiter
        )));
    }
    let terminator = match config.line_separator.as_bytes() {
        b"\r\n" => Terminator::CRLF,
        [byte] => Terminator::Any(*byte),
        _ => {
            return Err(PersistenceError::InvalidData(format!(
                "line separator {:?} cannot be written",
                config.line_separator
            )));
        }
    };

    let mut header: Vec<&str> = Vec::new();
    for (_, node) in forest.walk() {
        for key in node.data().keys() {
            if !header.contains(&key) {
                header.push(key);
            }
        }
    }
    if header.is_empty() {
        return Ok(String::new());
    }
    for key in &header {
        if let Some(clash) = clash(key, config) {
            return Err(PersistenceError::InvalidData(format!(
                "header {key:?} contains the {clash}"
            )));
        }
    }
    for (_, node) in forest.walk() {
        for (key, value) in node.data().iter() {
            if let Some(clash) = clash(value, config) {
                return Err(PersistenceError::InvalidData(format!(
                    "record '{}' field '{key}' value {value:?} contains the {clash}",
                    node.id()
                )));
            }
        }
    }

    let mut writer = WriterBuilder::new()
        .delimiter(config.delimiter as u8)
        .terminator(terminator)
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());
    writer.write_record(&header)?;
    for (_, node) in forest.walk() {
        let record = node.data();
        writer.write_record(header.iter().map(|key| record.get(key).unwrap_or("")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| PersistenceError::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

fn clash(text: &str, config: &ImportConfig) -> Option<&'static str> {
    if text.contains(config.delimiter) {
        Some("delimiter")
    } else if text.contains(config.line_separator.as_str()) {
        Some("line separator")
    } else {
        None
    }
}

pub fn save_forest_to_csv<P: AsRef<Path>>(
    forest: &Forest,
    path: P,
    config: &ImportConfig,
) -> PersistenceResult<()> {
    let text = forest_to_delimited(forest, config)?;
    let mut file = File::create(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(())
}

pub fn load_config_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ImportConfig> {
    let file = File::open(path)?;
    let config: ImportConfig = serde_json::from_reader(file)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config_to_json<P: AsRef<Path>>(
    config: &ImportConfig,
    path: P,
) -> PersistenceResult<()> {
    config.validate()?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    Ok(())
}
