use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One raw line of a roster export. Field parsing stays string-typed here
/// so the importer can report which record was malformed.
#[derive(Debug, Deserialize)]
pub(crate) struct RosterRow {
    #[serde(rename = "Owner")]
    pub(crate) owner: String,
    #[serde(rename = "Weekday")]
    pub(crate) weekday: String,
    #[serde(rename = "Start", default, deserialize_with = "empty_string_as_none")]
    pub(crate) start: Option<String>,
    #[serde(rename = "End", default, deserialize_with = "empty_string_as_none")]
    pub(crate) end: Option<String>,
    #[serde(rename = "Active From")]
    pub(crate) active_from: String,
    #[serde(
        rename = "Active Until",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) active_until: Option<String>,
    #[serde(rename = "Kind")]
    pub(crate) kind: String,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<RosterRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub(crate) fn parse_time(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn parse_weekday(value: &str) -> Option<Weekday> {
    value.trim().parse::<Weekday>().ok()
}

#[cfg(test)]
pub(crate) fn parse_time_for_tests(value: &str) -> Option<NaiveTime> {
    parse_time(value)
}
