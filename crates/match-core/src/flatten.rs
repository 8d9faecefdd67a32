//! Turns raw match payloads into one flat row per participant.

use crate::util::atomic_write;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Nested objects that do not flatten into a single cell.
pub const NESTED_FIELDS: &[&str] = &["perks", "challenges"];

pub const IRRELEVANT_FIELDS: &[&str] = &[
    "allInPings",
    "assistMePings",
    "baitPings",
    "championTransform",
    "commandPings",
    "dangerPings",
    "enemyMissingPings",
    "getBackPings",
    "holdPings",
    "item0",
    "item1",
    "item2",
    "item3",
    "item4",
    "item5",
    "item6",
    "needVisionPings",
    "onMyWayPings",
    "participantId",
    "profileIcon",
    "pushPings",
    "riotIdName",
    "riotIdTagline",
    "summonerId",
    "summonerName",
    "teamId",
    "visionClearedPings",
];

pub type Row = Map<String, Value>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlattenError {
    #[error("match #{index} has no metadata.matchId")]
    MissingMatchId { index: usize },

    #[error("match {match_id} has no info.participants list")]
    MissingParticipants { match_id: String },

    #[error("match {match_id} has a participant that is not an object")]
    BadParticipant { match_id: String },
}

fn is_dropped(field: &str) -> bool {
    NESTED_FIELDS.contains(&field) || IRRELEVANT_FIELDS.contains(&field)
}

pub fn process_participant(mut participant: Row, user_puuid: &str, match_id: &str) -> Row {
    participant.retain(|field, _| !is_dropped(field));
    let is_user = participant
        .get("puuid")
        .and_then(Value::as_str)
        .is_some_and(|puuid| puuid == user_puuid);
    participant.insert("match_id".into(), Value::String(match_id.to_string()));
    participant.insert("is_user".into(), Value::Bool(is_user));
    participant
}

pub fn process_match(raw: &Value, index: usize, user_puuid: &str) -> Result<Vec<Row>, FlattenError> {
    let match_id = raw
        .pointer("/metadata/matchId")
        .and_then(Value::as_str)
        .ok_or(FlattenError::MissingMatchId { index })?;
    let participants = raw
        .pointer("/info/participants")
        .and_then(Value::as_array)
        .ok_or_else(|| FlattenError::MissingParticipants {
            match_id: match_id.to_string(),
        })?;

    participants
        .iter()
        .map(|p| match p {
            Value::Object(row) => Ok(process_participant(row.clone(), user_puuid, match_id)),
            _ => Err(FlattenError::BadParticipant {
                match_id: match_id.to_string(),
            }),
        })
        .collect()
}

pub fn process_matches(matches: &[Value], user_puuid: &str) -> Result<Table, FlattenError> {
    let mut rows = Vec::new();
    for (index, raw) in matches.iter().enumerate() {
        rows.extend(process_match(raw, index, user_puuid)?);
    }
    let table = Table::from_rows(rows);
    let (n_rows, n_cols) = table.shape();
    info!(rows = n_rows, columns = n_cols, "processed matches");
    Ok(table)
}

/// Rows plus the union of their keys, in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn to_csv(&self) -> anyhow::Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(self.columns.iter().map(|c| cell(row.get(c))))?;
        }
        writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("flush csv: {}", err.error()))
    }

    pub fn write_csv(&self, path: &Path) -> anyhow::Result<()> {
        let data = self.to_csv()?;
        atomic_write(path, &data)
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(true)) => "True".into(),
        Some(Value::Bool(false)) => "False".into(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
