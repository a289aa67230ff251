//! Input trace recording
//!
//! A trace is a named, timestamped capture of raw input events that can be
//! saved as JSON and replayed through the engine against synthetic hosts.
//! Event times are host milliseconds relative to the trace's own clock, so
//! a replay drives a [`ManualTimer`](crate::input::ManualTimer) to each
//! event's timestamp before dispatching it.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::input::types::RawInputEvent;
use crate::Result;

/// Current trace file format version
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

/// A recorded sequence of raw input events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Unique trace identifier
    pub id: Uuid,
    /// Human-readable name
    pub name: String,
    /// When the trace was recorded
    pub created_at: DateTime<Utc>,
    /// File format version
    pub format_version: String,
    /// Events in dispatch order
    pub events: Vec<RawInputEvent>,
}

impl Trace {
    /// Create an empty trace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            format_version: CURRENT_FORMAT_VERSION.to_string(),
            events: Vec::new(),
        }
    }

    /// Append one event
    pub fn push(&mut self, event: RawInputEvent) {
        self.events.push(event);
    }

    /// Span between the first and last event, in milliseconds
    pub fn duration_ms(&self) -> u64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last.time.saturating_sub(first.time),
            _ => 0,
        }
    }

    /// Load a trace from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let trace = serde_json::from_str(&data)?;
        Ok(trace)
    }

    /// Save the trace as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}
