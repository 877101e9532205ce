//! Breach interval records and their classification kinds.

use serde::{Deserialize, Serialize};

use crate::types::{instant_from_unix, RecordId, Timestamp, UnixSeconds};

// ---------------------------------------------------------------------------
// BreachKind
// ---------------------------------------------------------------------------

/// Threshold rule family a configuration or breach belongs to.
///
/// The wire form matches the source records (`HOT_CONSECUTIVE`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreachKind {
    HotConsecutive,
    ColdConsecutive,
    HotCumulative,
    ColdCumulative,
}

impl BreachKind {
    /// Whether this kind is detected by the consecutive-interval scanner.
    ///
    /// Cumulative kinds are stored alongside consecutive ones in the
    /// configuration group but are evaluated by a different process.
    pub fn is_consecutive(self) -> bool {
        matches!(self, Self::HotConsecutive | Self::ColdConsecutive)
    }

    pub fn is_hot(self) -> bool {
        matches!(self, Self::HotConsecutive | Self::HotCumulative)
    }
}

// ---------------------------------------------------------------------------
// TemperatureBreach
// ---------------------------------------------------------------------------

/// A recorded interval during which a sensor's environment violated a
/// configured safe temperature range for at least the configured duration.
///
/// Threshold fields are copied from the winning configuration when the
/// breach is created; later configuration edits never alter them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureBreach {
    pub id: RecordId,
    pub sensor_id: RecordId,
    pub location_id: Option<RecordId>,
    pub kind: BreachKind,
    pub threshold_min_temperature: f64,
    pub threshold_max_temperature: f64,
    pub threshold_duration_ms: i64,
    pub start_timestamp: Timestamp,
    /// `None` while the breach is still ongoing.
    pub end_timestamp: Option<Timestamp>,
    pub acknowledged: bool,
}

impl TemperatureBreach {
    /// Whether the breach has not yet been closed.
    pub fn is_ongoing(&self) -> bool {
        self.end_timestamp.is_none()
    }

    /// Whether a temperature falls inside this breach's own stored bounds.
    pub fn contains(&self, temperature: f64) -> bool {
        temperature >= self.threshold_min_temperature
            && temperature <= self.threshold_max_temperature
    }

    /// Close the breach at a reading's instant.
    pub fn close(&mut self, at: UnixSeconds) {
        self.end_timestamp = Some(instant_from_unix(at));
    }
}

// ---------------------------------------------------------------------------
// BreachLogLink
// ---------------------------------------------------------------------------

/// Link record attributing one reading to the breach it belongs to.
///
/// A reading is linked to at most one breach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreachLogLink {
    pub log_id: RecordId,
    pub breach_id: RecordId,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
