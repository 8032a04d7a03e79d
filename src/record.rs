use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Field holding the dot-separated path of a row.
pub const ID_FIELD: &str = "ID";

/// One input row: header-derived field names mapped to raw text, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zips `values` against `keys` positionally. Missing trailing values leave
    /// their fields absent; values past the last key are dropped.
    pub fn from_row<K, V>(keys: &[K], values: &[V]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut record = Self {
            fields: Vec::with_capacity(keys.len().min(values.len())),
        };
        for (key, value) in keys.iter().zip(values) {
            record.insert(key.as_ref(), value.as_ref());
        }
        record
    }

    /// Sets `key`, keeping its original position if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The path identifier, or `""` when the row has no `ID` field.
    pub fn id(&self) -> &str {
        self.get(ID_FIELD).unwrap_or("")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record {
                    fields: Vec::with_capacity(access.size_hint().unwrap_or(0)),
                };
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    record.insert(key, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Header plus data rows of a delimited text document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub keys: Vec<String>,
    pub records: Vec<Record>,
}

/// Splits `raw` into lines on `line_separator`, drops empty lines and splits
/// each remaining line on `delimiter`. The first line is the header.
///
/// No quoting or escaping is recognised: every delimiter character splits.
pub fn parse_table(raw: &str, delimiter: char, line_separator: &str) -> Table {
    let mut lines = raw
        .split(line_separator)
        .filter(|line| !line.is_empty())
        .map(|line| line.split(delimiter).collect::<Vec<_>>());

    let Some(header) = lines.next() else {
        return Table::default();
    };
    let keys: Vec<String> = header.into_iter().map(str::to_string).collect();
    let records = lines.map(|values| Record::from_row(&keys, &values)).collect();

    Table { keys, records }
}
