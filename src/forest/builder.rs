use super::{Forest, Node};
use crate::config::{ConfigError, ImportConfig};
use crate::record::{Record, parse_table};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForestError {
    #[error("record '{id}' names parent '{parent_id}', which does not precede it")]
    OrphanedRecord { id: String, parent_id: String },
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// What to do with a record whose parent path matches no earlier record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Place it as an additional root without comment.
    #[default]
    Promote,
    /// Place it as an additional root and log a warning.
    Warn,
    /// Fail the whole build.
    Reject,
}

impl OrphanPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrphanPolicy::Promote => "promote",
            OrphanPolicy::Warn => "warn",
            OrphanPolicy::Reject => "reject",
        }
    }
}

impl fmt::Display for OrphanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrphanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "promote" => Ok(OrphanPolicy::Promote),
            "warn" => Ok(OrphanPolicy::Warn),
            "reject" => Ok(OrphanPolicy::Reject),
            other => Err(format!("unknown orphan policy '{other}'")),
        }
    }
}

/// How a single record ended up in the forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// The path has no parent segment.
    Root,
    Attached { parent_id: String },
    /// The parent path matched nothing built so far; placed as a root.
    Orphaned { parent_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedRecord {
    pub id: String,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForestBuild {
    pub forest: Forest,
    /// One entry per input record, in input order.
    pub placements: Vec<PlacedRecord>,
}

impl ForestBuild {
    pub fn orphans(&self) -> impl Iterator<Item = &PlacedRecord> {
        self.placements
            .iter()
            .filter(|placed| matches!(placed.placement, Placement::Orphaned { .. }))
    }
}

/// Parent path of a dot-separated identifier: everything before the last dot,
/// or `""` for single-segment paths.
pub(crate) fn parent_path(id: &str) -> &str {
    id.rfind('.').map_or("", |pos| &id[..pos])
}

#[derive(Debug, Clone)]
pub struct ForestBuilder {
    delimiter: char,
    line_separator: String,
    orphan_policy: OrphanPolicy,
}

impl Default for ForestBuilder {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            delimiter: config.delimiter,
            line_separator: config.line_separator.clone(),
            orphan_policy: config.orphan_policy,
        }
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn line_separator(mut self, separator: impl Into<String>) -> Self {
        self.line_separator = separator.into();
        self
    }

    pub fn orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    /// Settings this builder would save as.
    pub fn config(&self) -> ImportConfig {
        ImportConfig {
            delimiter: self.delimiter,
            line_separator: self.line_separator.clone(),
            orphan_policy: self.orphan_policy,
        }
    }

    pub fn build(&self, raw: &str) -> Result<ForestBuild, ForestError> {
        self.config().validate()?;
        let table = parse_table(raw, self.delimiter, &self.line_separator);
        self.build_records(table.records)
    }

    pub fn build_records<I>(&self, records: I) -> Result<ForestBuild, ForestError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut index = ForestIndex::default();
        let placements: Vec<PlacedRecord> = records
            .into_iter()
            .map(|record| index.place(record))
            .collect();

        let orphan_count = placements
            .iter()
            .filter(|placed| matches!(placed.placement, Placement::Orphaned { .. }))
            .count();

        for placed in &placements {
            if let Placement::Orphaned { parent_id } = &placed.placement {
                match self.orphan_policy {
                    OrphanPolicy::Promote => {}
                    OrphanPolicy::Warn => warn!(
                        id = %placed.id,
                        parent_id = %parent_id,
                        "parent not found, promoting record to root"
                    ),
                    OrphanPolicy::Reject => {
                        return Err(ForestError::OrphanedRecord {
                            id: placed.id.clone(),
                            parent_id: parent_id.clone(),
                        });
                    }
                }
            }
        }

        let forest = index.into_forest();
        debug!(
            records = placements.len(),
            roots = forest.roots().len(),
            orphans = orphan_count,
            "forest assembled"
        );
        Ok(ForestBuild { forest, placements })
    }
}

/// Builds a forest from CRLF-separated delimited text, promoting orphans to
/// roots. Never fails.
pub fn build_forest(raw: &str, delimiter: char) -> Forest {
    let table = parse_table(raw, delimiter, "\r\n");
    let mut index = ForestIndex::default();
    for record in table.records {
        index.place(record);
    }
    index.into_forest()
}

/// Construction-time arena: nodes live in a graph with parent -> child edges,
/// and every identifier maps to the nodes carrying it.
#[derive(Default)]
struct ForestIndex {
    graph: DiGraph<Record, ()>,
    by_id: HashMap<String, Vec<NodeIndex>>,
    roots: Vec<NodeIndex>,
}

impl ForestIndex {
    fn place(&mut self, record: Record) -> PlacedRecord {
        let id = record.id().to_string();
        let parent_id = parent_path(&id).to_string();
        let ix = self.graph.add_node(record);

        let placement = if parent_id.is_empty() {
            self.roots.push(ix);
            Placement::Root
        } else if let Some(parent) = self.lookup(&parent_id) {
            self.graph.add_edge(parent, ix, ());
            Placement::Attached { parent_id }
        } else {
            self.roots.push(ix);
            Placement::Orphaned { parent_id }
        };

        self.by_id.entry(id.clone()).or_default().push(ix);
        PlacedRecord { id, placement }
    }

    /// Resolves `id` to the node a pre-order scan of the forest-so-far would
    /// hit first. Only duplicated identifiers need the scan.
    fn lookup(&self, id: &str) -> Option<NodeIndex> {
        match self.by_id.get(id)?.as_slice() {
            [] => None,
            [only] => Some(*only),
            candidates => {
                let mut stack: Vec<NodeIndex> = self.roots.iter().rev().copied().collect();
                while let Some(ix) = stack.pop() {
                    if candidates.contains(&ix) {
                        return Some(ix);
                    }
                    stack.extend(self.children_of(ix).into_iter().rev());
                }
                None
            }
        }
    }

    /// Children in input order. Node indices grow with input position.
    fn children_of(&self, ix: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(ix, Direction::Outgoing)
            .collect();
        children.sort_unstable();
        children
    }

    fn into_forest(mut self) -> Forest {
        let roots = mem::take(&mut self.roots);
        let nodes = roots.into_iter().map(|ix| self.detach(ix)).collect();
        Forest::from_roots(nodes)
    }

    fn detach(&mut self, ix: NodeIndex) -> Node {
        let data = mem::take(&mut self.graph[ix]);
        let children = self
            .children_of(ix)
            .into_iter()
            .map(|child| self.detach(child))
            .collect();
        Node::new(data, children)
    }
}
