use super::{Materializer, materialize};
use crate::duration::CalendarDuration;
use crate::forest::Forest;
use crate::task::ScheduleRow;
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::Serialize;
use std::convert::Infallible;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineRow {
    pub id: String,
    /// Nesting level in the walk, 0 for roots. A promoted orphan sits at 0
    /// whatever its path depth.
    pub level: u32,
    pub parent: Option<String>,
    pub name: Option<String>,
    pub start: Option<String>,
    pub finish: Option<String>,
    pub duration: Option<String>,
}

/// Flat, pre-order listing of a forest with rendered durations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outline {
    rows: Vec<OutlineRow>,
}

#[derive(Debug, Clone)]
pub struct OutlineHandle {
    level: u32,
    id: Option<String>,
}

impl Outline {
    pub fn from_forest(forest: &Forest) -> Self {
        let mut outline = Self::default();
        match materialize(forest, &mut outline) {
            Ok(_) => outline,
            Err(never) => match never {},
        }
    }

    pub fn rows(&self) -> &[OutlineRow] {
        &self.rows
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let ids: Vec<&str> = self.rows.iter().map(|r| r.id.as_str()).collect();
        let levels: Vec<u32> = self.rows.iter().map(|r| r.level).collect();
        let parents: Vec<Option<&str>> = self.rows.iter().map(|r| r.parent.as_deref()).collect();
        let names: Vec<Option<&str>> = self.rows.iter().map(|r| r.name.as_deref()).collect();
        let starts: Vec<Option<&str>> = self.rows.iter().map(|r| r.start.as_deref()).collect();
        let finishes: Vec<Option<&str>> = self.rows.iter().map(|r| r.finish.as_deref()).collect();
        let durations: Vec<Option<&str>> =
            self.rows.iter().map(|r| r.duration.as_deref()).collect();

        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("id"), ids).into_column(),
            Series::new(PlSmallStr::from_static("level"), levels).into_column(),
            Series::new(PlSmallStr::from_static("parent"), parents).into_column(),
            Series::new(PlSmallStr::from_static("name"), names).into_column(),
            Series::new(PlSmallStr::from_static("start"), starts).into_column(),
            Series::new(PlSmallStr::from_static("finish"), finishes).into_column(),
            Series::new(PlSmallStr::from_static("duration"), durations).into_column(),
        ])
    }
}

impl Materializer for Outline {
    type Handle = OutlineHandle;
    type Error = Infallible;

    fn summary(&mut self) -> Result<OutlineHandle, Infallible> {
        Ok(OutlineHandle {
            level: 0,
            id: None,
        })
    }

    fn task(
        &mut self,
        row: &ScheduleRow,
        duration: Option<&CalendarDuration>,
        parent: &OutlineHandle,
    ) -> Result<OutlineHandle, Infallible> {
        let level = if parent.id.is_some() {
            parent.level + 1
        } else {
            0
        };
        self.rows.push(OutlineRow {
            id: row.id.clone(),
            level,
            parent: parent.id.clone(),
            name: row.name.clone(),
            start: row.start.clone(),
            finish: row.finish.clone(),
            duration: duration.map(ToString::to_string),
        });
        Ok(OutlineHandle {
            level,
            id: Some(row.id.clone()),
        })
    }
}
