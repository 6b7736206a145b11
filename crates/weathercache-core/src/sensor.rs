//! Hysteresis-gated sensor values.
//!
//! A `SensorValue` always stores the latest reading, but only tells its
//! subscribers about it when the reading moved by more than the configured
//! threshold. Subscribers run inline on the caller's task, so keep them short.

use std::fmt;

/// Default minimum delta before a change is reported.
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.15;

/// A reported change of a sensor value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueChange {
    pub old: f64,
    pub new: f64,
}

/// Callback invoked with every qualifying change.
pub type Subscriber = Box<dyn Fn(ValueChange) + Send + Sync>;

pub struct SensorValue {
    value: f64,
    threshold: f64,
    subscribers: Vec<Subscriber>,
}

impl SensorValue {
    /// Create a zero-initialized sensor value with the given change threshold.
    pub fn new(threshold: f64) -> Self {
        Self {
            value: 0.0,
            threshold,
            subscribers: Vec::new(),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Register a subscriber. Subscribers are called in registration order.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn(ValueChange) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Store `new_value` and notify subscribers if the change exceeds the threshold.
    ///
    /// Returns the change when subscribers were notified.
    pub fn update_value(&mut self, new_value: f64) -> Option<ValueChange> {
        let old = self.value;
        self.value = new_value;

        if (new_value - old).abs() > self.threshold {
            let change = ValueChange { old, new: new_value };
            for subscriber in &self.subscribers {
                subscriber(change);
            }
            Some(change)
        } else {
            None
        }
    }
}

impl Default for SensorValue {
    fn default() -> Self {
        Self::new(DEFAULT_CHANGE_THRESHOLD)
    }
}

impl fmt::Debug for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorValue")
            .field("value", &self.value)
            .field("threshold", &self.threshold)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
