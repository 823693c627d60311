//! Sequence and shot numbering from beat markers
//!
//! A beat is the first step of a new sequence. Steps before the first beat
//! belong to sequence 1; the shot number counts steps from the start of the
//! current sequence, starting at 1.
//!
//! Beats are accepted as `3,8,15`, one per line, or `[3,8,15]`.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BeatParseError {
    #[error("Invalid beat value '{0}'")]
    InvalidBeat(String),
}

/// Parses a beat list into ascending order
pub fn parse_beats(text: &str) -> Result<Vec<i64>, BeatParseError> {
    let mut cleaned = text.trim();
    if cleaned.starts_with('[') && cleaned.ends_with(']') && cleaned.len() >= 2 {
        cleaned = &cleaned[1..cleaned.len() - 1];
    }

    let mut beats = cleaned
        .replace('\n', ",")
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| BeatParseError::InvalidBeat(token.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    beats.sort_unstable();
    Ok(beats)
}

/// Parses a beat list, treating malformed input as having no beats
pub fn beats_or_empty(text: &str) -> Vec<i64> {
    match parse_beats(text) {
        Ok(beats) => beats,
        Err(e) => {
            tracing::warn!(beats = %text, error = %e, "Invalid beats format, using empty beats");
            Vec::new()
        }
    }
}

/// Where a step falls within the beat structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShotPosition {
    pub sequence: i64,
    pub shot: i64,
}

impl ShotPosition {
    /// Name in the form `seq01_shot01`
    pub fn shot_name(&self) -> String {
        format!("seq{:02}_shot{:02}", self.sequence, self.shot)
    }
}

/// Locates `step` against ascending `beats`
///
/// Every beat at or below the step opens a sequence, so repeated beat values
/// each count as a crossing.
pub fn locate(step: i64, beats: &[i64]) -> ShotPosition {
    let mut sequence: i64 = 1;
    let mut shot_start: i64 = 0;

    for &beat in beats {
        if step < beat {
            break;
        }
        sequence = sequence.saturating_add(1);
        shot_start = beat;
    }

    ShotPosition {
        sequence,
        shot: step.saturating_sub(shot_start).saturating_add(1),
    }
}

/// Parses `beats` and locates `step` in one call
pub fn calculate(step: i64, beats: &str) -> ShotPosition {
    locate(step, &beats_or_empty(beats))
}
