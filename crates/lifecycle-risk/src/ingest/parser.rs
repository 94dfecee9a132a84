use super::normalizer::district_key;
use crate::scoring::RawDistrict;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::io::{Read, Write};

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<RawDistrict>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<ExtractRow>() {
        records.push(record?.into_raw());
    }

    Ok(records)
}

pub(crate) fn write_records<W: Write>(writer: W, rows: &[RawDistrict]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Column-keyed extract row. Unknown columns are ignored; the aliases cover
/// the dashboard export naming.
#[derive(Debug, Deserialize)]
struct ExtractRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    district_id: Option<String>,
    #[serde(alias = "district")]
    district_name: String,
    state: String,
    #[serde(deserialize_with = "count")]
    population: u64,
    #[serde(alias = "enrol_total_enrolments", deserialize_with = "count")]
    total_enrolments: u64,
    #[serde(alias = "bio_total_bio_updates", deserialize_with = "count")]
    pending_biometric_updates: u64,
    #[serde(default, deserialize_with = "optional_count")]
    demographic_updates: Option<u64>,
    #[serde(
        default,
        alias = "enrol_saturation_index",
        deserialize_with = "optional_score"
    )]
    enrolment_saturation_index: Option<f64>,
    #[serde(
        default,
        alias = "demo_persistent_friction_score",
        deserialize_with = "optional_score"
    )]
    demographic_friction_score: Option<f64>,
    #[serde(
        default,
        alias = "bio_Bio_Stress_Index",
        deserialize_with = "optional_score"
    )]
    biometric_stress_index: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    last_updated: Option<String>,
}

impl ExtractRow {
    fn into_raw(self) -> RawDistrict {
        let district_id = self
            .district_id
            .unwrap_or_else(|| district_key(&self.state, &self.district_name));
        let last_updated = self.last_updated.as_deref().and_then(parse_date);

        RawDistrict {
            district_id,
            district_name: self.district_name,
            state: self.state,
            population: self.population,
            total_enrolments: self.total_enrolments,
            pending_biometric_updates: self.pending_biometric_updates,
            demographic_updates: self.demographic_updates,
            enrolment_saturation_index: self.enrolment_saturation_index,
            demographic_friction_score: self.demographic_friction_score,
            biometric_stress_index: self.biometric_stress_index,
            last_updated,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_count(&raw).map_err(serde::de::Error::custom)
}

fn optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    empty_string_as_none(deserializer)?
        .map(|raw| parse_count(&raw).map_err(serde::de::Error::custom))
        .transpose()
}

fn optional_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    empty_string_as_none(deserializer)?
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|err| serde::de::Error::custom(format!("invalid score '{raw}' ({err})")))
        })
        .transpose()
}

/// Counters arrive as integers, or as `"1234.0"` from spreadsheet exports.
fn parse_count(raw: &str) -> Result<u64, String> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return Ok(value);
    }

    // `as u64` saturates, so anything at or past 2^64 is out of range.
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 && value.fract() == 0.0 => {
            if value < u64::MAX as f64 {
                Ok(value as u64)
            } else {
                Err(format!("counter {trimmed} does not fit in 64 bits"))
            }
        }
        Ok(value) => Err(format!(
            "counter must be a non-negative whole number (got {value})"
        )),
        Err(err) => Err(format!("invalid counter '{trimmed}' ({err})")),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

#[cfg(test)]
pub(crate) fn parse_count_for_tests(raw: &str) -> Result<u64, String> {
    parse_count(raw)
}

#[cfg(test)]
pub(crate) fn parse_date_for_tests(raw: &str) -> Option<NaiveDate> {
    parse_date(raw)
}
