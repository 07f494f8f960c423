//! The shared heartbeat sample ("beat").
//!
//! One mutable mapping reused across providers within a tick: each provider
//! adds or overwrites keys, then the scheduler stamps `time` and the whole
//! map is serialized to every connection. Providers must not retain the
//! sample beyond their call.

use serde::Serialize;
use serde_json::{Map, Value};

/// Key the scheduler stamps after all providers have run.
const TIME_KEY: &str = "time";

/// One aggregated telemetry sample, broadcast as a flat JSON object.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct HeartbeatSample {
    fields: Map<String, Value>,
}

impl HeartbeatSample {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a provider key, overwriting any earlier provider's value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Stamps the sample with wall-clock epoch milliseconds.
    pub fn stamp(&mut self, epoch_ms: i64) {
        self.fields.insert(TIME_KEY.to_string(), epoch_ms.into());
    }

    /// The last stamped `time`, if any.
    pub fn time(&self) -> Option<i64> {
        self.fields.get(TIME_KEY).and_then(Value::as_i64)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_overwrites_earlier_value() {
        let mut beat = HeartbeatSample::new();
        beat.set("load", json!(1));
        beat.set("load", json!(2));
        assert_eq!(beat.get("load"), Some(&json!(2)));
    }

    #[test]
    fn stamp_sets_time_field() {
        let mut beat = HeartbeatSample::new();
        beat.stamp(1_700_000_000_000);
        assert_eq!(beat.time(), Some(1_700_000_000_000));
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut beat = HeartbeatSample::new();
        beat.set("cpu", json!({"usagePercent": 0.25}));
        beat.stamp(42);
        let json = serde_json::to_value(&beat).unwrap();
        assert_eq!(json, json!({"cpu": {"usagePercent": 0.25}, "time": 42}));
    }

    #[test]
    fn keys_survive_across_ticks_until_overwritten() {
        // The scheduler reuses one sample across ticks.
        let mut beat = HeartbeatSample::new();
        beat.set("cpu", json!(1));
        beat.stamp(1);
        beat.set("memory", json!(2));
        beat.stamp(2);
        assert_eq!(beat.get("cpu"), Some(&json!(1)));
        assert_eq!(beat.get("memory"), Some(&json!(2)));
        assert_eq!(beat.time(), Some(2));
    }
}
