use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const LEGACY_SUFFIX_LEN: usize = 7;

/// How new record ids are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Random UUID v4.
    #[default]
    Uuid,
    /// `<epoch millis><7 random base36 chars>`, the format older stored data uses.
    /// Two creates in the same millisecond can collide.
    Legacy,
}

impl IdStrategy {
    pub fn generate(&self) -> String {
        match self {
            IdStrategy::Uuid => Uuid::new_v4().to_string(),
            IdStrategy::Legacy => {
                legacy_id(Utc::now().timestamp_millis(), &mut rand::thread_rng())
            }
        }
    }
}

fn legacy_id<R: Rng>(millis: i64, rng: &mut R) -> String {
    let suffix: String = (0..LEGACY_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}", millis, suffix)
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::Uuid => write!(f, "uuid"),
            IdStrategy::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uuid" => Ok(IdStrategy::Uuid),
            "legacy" => Ok(IdStrategy::Legacy),
            other => Err(format!("unknown id strategy: {} (expected uuid or legacy)", other)),
        }
    }
}
