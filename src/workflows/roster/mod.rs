//! Import of reviewer availability rosters exported from calendar tooling.
//!
//! The export is one CSV row per recurring rule:
//! `Owner,Weekday,Start,End,Active From,Active Until,Kind` where `Kind` is
//! `available` or `blocked`. A blocked row without a time window covers the
//! owner's whole day.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::workflows::scheduling::domain::{AvailabilityRule, DailyWindow, PartyRole};

use parser::RosterRow;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { record: usize, reason: String },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
            RosterImportError::InvalidRow { record, reason } => {
                write!(f, "roster record {} is invalid: {}", record, reason)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<AvailabilityRule>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Rosters describe reviewer calendars, so every imported rule is owned
    /// by a reviewer.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<AvailabilityRule>, RosterImportError> {
        let mut rules = Vec::new();

        for (index, row) in parser::parse_rows(reader)?.iter().enumerate() {
            let record = index + 1;
            let rule = rule_from_row(row)
                .map_err(|reason| RosterImportError::InvalidRow { record, reason })?;
            rules.push(rule);
        }

        Ok(rules)
    }
}

fn rule_from_row(row: &RosterRow) -> Result<AvailabilityRule, String> {
    if row.owner.is_empty() {
        return Err("missing owner".to_string());
    }

    let weekday = parser::parse_weekday(&row.weekday)
        .ok_or_else(|| format!("unrecognized weekday '{}'", row.weekday))?;

    let exclusion = match row.kind.to_ascii_lowercase().as_str() {
        "available" => false,
        "blocked" => true,
        other => return Err(format!("unrecognized kind '{}'", other)),
    };

    let window = match (row.start.as_deref(), row.end.as_deref()) {
        (Some(start), Some(end)) => {
            let start = parser::parse_time(start)
                .ok_or_else(|| format!("unrecognized start time '{}'", start))?;
            let end = parser::parse_time(end)
                .ok_or_else(|| format!("unrecognized end time '{}'", end))?;
            if start >= end {
                return Err(format!("window start {} is not before end {}", start, end));
            }
            Some(DailyWindow { start, end })
        }
        (None, None) if exclusion => None,
        _ => return Err("availability rows need both a start and an end time".to_string()),
    };

    let active_from = parser::parse_date(&row.active_from)
        .ok_or_else(|| format!("unrecognized active-from date '{}'", row.active_from))?;
    let active_until = row
        .active_until
        .as_deref()
        .map(|value| {
            parser::parse_date(value)
                .ok_or_else(|| format!("unrecognized active-until date '{}'", value))
        })
        .transpose()?;

    Ok(AvailabilityRule {
        owner_id: row.owner.clone(),
        owner_role: PartyRole::Reviewer,
        weekday,
        window,
        active_from,
        active_until,
        exclusion,
    })
}
