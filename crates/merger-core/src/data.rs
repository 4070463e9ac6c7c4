//! Wave data sources.
//!
//! The simulation only needs an ordered list of waves, each an ordered list
//! of rows. Where they come from (embedded fixture, JSON file, seeded
//! composer) is behind the `WaveSource` trait. Loading never fails from the
//! caller's point of view: `load_waves` falls back to the builtin fixture.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::RoomCategory;
use crate::flags::*;

pub const BUILTIN_WAVES: &str = include_str!("data/sample_waves.json");

/// Fewest rows the composer puts in one wave.
pub const MIN_ROWS_PER_WAVE: usize = 3;
/// Most rows the composer puts in one wave.
pub const MAX_ROWS_PER_WAVE: usize = 6;
/// Severity ceiling for composed records.
pub const MAX_SEVERITY: u32 = 10;

/// One record to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowData {
    pub id: String,
    #[serde(rename = "room", alias = "category")]
    pub category: RoomCategory,
    pub summary: String,
    pub flags: Vec<String>,
    pub severity: u32,
}

/// An ordered batch of rows released together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveData {
    /// Default lane affinity. Spawn lanes are chosen by id hash.
    #[serde(default)]
    pub lane: usize,
    pub rows: Vec<RowData>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaveFile {
    pub waves: Vec<WaveData>,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to parse wave data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read wave data from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("wave data contains no waves")]
    Empty,
    #[error("invalid row {id:?}: {reason}")]
    InvalidRow { id: String, reason: &'static str },
}

/// Anything that can produce the wave list.
pub trait WaveSource {
    fn load(&self) -> Result<Vec<WaveData>, DataError>;

    /// Short label for logs.
    fn label(&self) -> String;
}

/// The embedded five-wave sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFixture;

/// A `{ "waves": [...] }` JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    pub path: PathBuf,
}

/// Synthetic records from a seeded RNG, sorted by severity and grouped
/// into waves.
#[derive(Debug, Clone, Copy)]
pub struct ComposedSource {
    pub seed: u64,
    pub record_count: usize,
    pub wave_count: usize,
    /// Lanes the waves are spread across.
    pub lane_count: usize,
}

impl WaveSource for BuiltinFixture {
    fn load(&self) -> Result<Vec<WaveData>, DataError> {
        parse_waves(BUILTIN_WAVES)
    }

    fn label(&self) -> String {
        "builtin".into()
    }
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl WaveSource for JsonFileSource {
    fn load(&self) -> Result<Vec<WaveData>, DataError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| DataError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_waves(&contents)
    }

    fn label(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

impl WaveSource for ComposedSource {
    fn load(&self) -> Result<Vec<WaveData>, DataError> {
        if self.record_count == 0 || self.wave_count == 0 {
            return Err(DataError::Empty);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut records: Vec<RowData> = (0..self.record_count)
            .map(|i| compose_record(&mut rng, i))
            .collect();
        // Stable sort keeps generation order within a severity.
        records.sort_by_key(|r| r.severity);
        validate_waves(group_into_waves(
            records,
            self.wave_count,
            self.lane_count,
        ))
    }

    fn label(&self) -> String {
        format!(
            "composed:seed={},records={},waves={},lanes={}",
            self.seed, self.record_count, self.wave_count, self.lane_count
        )
    }
}

/// Parse and validate the JSON wave format.
pub fn parse_waves(data: &str) -> Result<Vec<WaveData>, DataError> {
    let file: WaveFile = serde_json::from_str(data)?;
    validate_waves(file.waves)
}

/// Reject empty data and malformed rows; de-duplicate flags in order.
pub fn validate_waves(mut waves: Vec<WaveData>) -> Result<Vec<WaveData>, DataError> {
    if waves.is_empty() {
        return Err(DataError::Empty);
    }
    for row in waves.iter_mut().flat_map(|w| w.rows.iter_mut()) {
        if row.id.trim().is_empty() {
            return Err(DataError::InvalidRow {
                id: row.id.clone(),
                reason: "empty id",
            });
        }
        if row.severity == 0 {
            return Err(DataError::InvalidRow {
                id: row.id.clone(),
                reason: "severity must be positive",
            });
        }
        let mut seen: Vec<String> = Vec::with_capacity(row.flags.len());
        for flag in row.flags.drain(..) {
            if !seen.contains(&flag) {
                seen.push(flag);
            }
        }
        row.flags = seen;
    }
    Ok(waves)
}

/// The builtin fixture. Always succeeds.
pub fn builtin_waves() -> Vec<WaveData> {
    parse_waves(BUILTIN_WAVES).expect("builtin wave data should parse")
}

/// Load from `source`, falling back to the builtin fixture on any error.
pub fn load_waves(source: &dyn WaveSource) -> Vec<WaveData> {
    match source.load() {
        Ok(waves) => {
            tracing::info!(
                target: "merger::data",
                source = %source.label(),
                waves = waves.len(),
                rows = waves.iter().map(|w| w.rows.len()).sum::<usize>(),
                "waves.loaded"
            );
            waves
        }
        Err(err) => {
            tracing::warn!(
                target: "merger::data",
                source = %source.label(),
                error = %err,
                "waves.load_failed; using builtin fixture"
            );
            builtin_waves()
        }
    }
}

/// Weighted severity of a flag set, capped at `MAX_SEVERITY`. A record with
/// no flags still has severity 1.
pub fn severity_for_flags<S: AsRef<str>>(flags: &[S]) -> u32 {
    if flags.is_empty() {
        return 1;
    }
    let total: u32 = flags
        .iter()
        .map(|flag| match flag.as_ref() {
            EXPIRED_LEGAL_ID => 3,
            DUPLICATE_LEGAL_ID => 4,
            DORMANT_HIGH_BALANCE => 2,
            LOCKED_RATIO_GT25 => 2,
            PAST_MATURITY_NOT_CLOSED => 3,
            LOAN_OVERDUE_120D => 5,
            INTEREST_IN_ARREARS => 4,
            _ => 1,
        })
        .sum();
    total.min(MAX_SEVERITY)
}

/// Split severity-sorted records into at most `wave_count` waves of
/// `MIN_ROWS_PER_WAVE..=MAX_ROWS_PER_WAVE` rows each, cycling lanes
/// `0..lane_count`.
pub fn group_into_waves(records: Vec<RowData>, wave_count: usize, lane_count: usize) -> Vec<WaveData> {
    if records.is_empty() || wave_count == 0 {
        return Vec::new();
    }
    let per_wave = (records.len() / wave_count).clamp(MIN_ROWS_PER_WAVE, MAX_ROWS_PER_WAVE);
    records
        .chunks(per_wave)
        .take(wave_count)
        .enumerate()
        .map(|(idx, rows)| WaveData {
            lane: idx % lane_count.max(1),
            rows: rows.to_vec(),
        })
        .collect()
}

fn compose_record(rng: &mut ChaCha8Rng, index: usize) -> RowData {
    const ROOMS: [RoomCategory; 4] = [
        RoomCategory::Customers,
        RoomCategory::Accounts,
        RoomCategory::Fixed,
        RoomCategory::Loans,
    ];
    let category = ROOMS[rng.gen_range(0..ROOMS.len())];

    let candidates: &[&str] = match category {
        RoomCategory::Customers => &[EXPIRED_LEGAL_ID, DUPLICATE_LEGAL_ID],
        RoomCategory::Accounts => &[DORMANT_HIGH_BALANCE, LOCKED_RATIO_GT25],
        RoomCategory::Fixed => &[PAST_MATURITY_NOT_CLOSED, EXPIRED_LEGAL_ID],
        RoomCategory::Loans => &[LOAN_OVERDUE_120D, INTEREST_IN_ARREARS],
    };
    let mut flags: Vec<String> = candidates
        .iter()
        .filter(|_| rng.gen_bool(0.5))
        .map(|f| f.to_string())
        .collect();
    if flags.is_empty() {
        if let Some(flag) = candidates.choose(rng) {
            flags.push(flag.to_string());
        }
    }

    let serial = 1000 + index;
    let (prefix, summary) = match category {
        RoomCategory::Customers => {
            let country = *["EN", "FR"].choose(rng).unwrap_or(&"EN");
            let city = *["Toronto", "Montreal", "Vancouver", "Calgary"]
                .choose(rng)
                .unwrap_or(&"Toronto");
            let a = rng.gen_range(b'A'..=b'Z') as char;
            let b = rng.gen_range(b'A'..=b'Z') as char;
            let digits: u32 = rng.gen_range(0..1_000_000);
            ("CUST", format!("{country}, {city}, legalId={a}{b}{digits:06}"))
        }
        RoomCategory::Accounts => {
            let kind = *["Savings Account", "Checking Account"]
                .choose(rng)
                .unwrap_or(&"Savings Account");
            let balance: u64 = rng.gen_range(1_000..50_000);
            ("ACC", format!("{kind}, Balance: ${}", group_thousands(balance)))
        }
        RoomCategory::Fixed => {
            let kind = *["Term Deposit", "CD Account"]
                .choose(rng)
                .unwrap_or(&"Term Deposit");
            let month: u32 = rng.gen_range(1..=12);
            let day: u32 = rng.gen_range(1..=28);
            ("FIX", format!("{kind}, Maturity: 2023-{month:02}-{day:02}"))
        }
        RoomCategory::Loans => {
            let days: u32 = rng.gen_range(121..400);
            ("LOAN", format!("Personal Loan, Overdue: {days} days"))
        }
    };

    RowData {
        id: format!("{prefix}-{serial}"),
        category,
        summary,
        severity: severity_for_flags(&flags),
        flags,
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
