use crate::duration::{CalendarDuration, DurationError};
use crate::instant::parse_instant;
use crate::record::{ID_FIELD, Record};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Typed view of the conventional schedule columns of a record.
///
/// Blank cells read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start: Option<String>,
    pub finish: Option<String>,
}

impl ScheduleRow {
    pub const NAME: &'static str = "Name";
    pub const DESCRIPTION: &'static str = "Description";
    pub const START: &'static str = "Start";
    pub const FINISH: &'static str = "Finish";

    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.get(ID_FIELD).unwrap_or_default().to_string(),
            name: non_blank(record, Self::NAME),
            description: non_blank(record, Self::DESCRIPTION),
            start: non_blank(record, Self::START),
            finish: non_blank(record, Self::FINISH),
        }
    }

    pub fn start_instant(&self) -> Option<Result<NaiveDateTime, DurationError>> {
        self.start.as_deref().map(parse_instant)
    }

    pub fn finish_instant(&self) -> Option<Result<NaiveDateTime, DurationError>> {
        self.finish.as_deref().map(parse_instant)
    }

    /// Parsed `(start, finish)` when both cells are filled in.
    pub fn span(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime)>, DurationError> {
        match (self.start_instant(), self.finish_instant()) {
            (Some(start), Some(finish)) => Ok(Some((start?, finish?))),
            _ => Ok(None),
        }
    }

    pub fn task_duration(&self) -> Result<Option<CalendarDuration>, DurationError> {
        Ok(self
            .span()?
            .map(|(start, finish)| CalendarDuration::between(&start, &finish)))
    }
}

impl From<&Record> for ScheduleRow {
    fn from(record: &Record) -> Self {
        Self::from_record(record)
    }
}

fn non_blank(record: &Record, key: &str) -> Option<String> {
    record
        .get(key)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}
