//! Keyed cooldown timers
//!
//! A key with no entry is ready. Starting a cooldown records both the
//! remaining and the original duration so progress can be reported.
//! The owner advances every timer once per tick with `update`.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Remaining and original duration of one running cooldown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CooldownTimer {
    pub remaining: f32,
    pub total: f32,
}

impl CooldownTimer {
    /// Fraction elapsed, 0.0 just after start and 1.0 when done
    pub fn progress(&self) -> f32 {
        if self.total <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.total).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CooldownRegistry {
    timers: AHashMap<String, CooldownTimer>,
}

impl CooldownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the cooldown for `key`
    ///
    /// Overwrites any running cooldown for the key. A non-positive duration
    /// leaves the key ready.
    pub fn start(&mut self, key: impl Into<String>, duration: f32) {
        let key = key.into();
        if !(duration > 0.0) {
            self.timers.remove(&key);
            return;
        }
        self.timers.insert(
            key,
            CooldownTimer {
                remaining: duration,
                total: duration,
            },
        );
    }

    /// Is `key` still cooling down?
    pub fn is_active(&self, key: &str) -> bool {
        self.timers.get(key).is_some_and(|t| t.remaining > 0.0)
    }

    /// Seconds until `key` is ready (0 if not cooling down)
    pub fn remaining(&self, key: &str) -> f32 {
        self.timers.get(key).map(|t| t.remaining).unwrap_or(0.0)
    }

    /// Progress toward ready, from 0.0 (just started) to 1.0 (ready)
    pub fn progress(&self, key: &str) -> f32 {
        self.timers.get(key).map(CooldownTimer::progress).unwrap_or(1.0)
    }

    pub fn timer(&self, key: &str) -> Option<&CooldownTimer> {
        self.timers.get(key)
    }

    /// Make `key` ready immediately
    pub fn reset(&mut self, key: &str) {
        self.timers.remove(key);
    }

    /// Make every key ready immediately
    pub fn reset_all(&mut self) {
        self.timers.clear();
    }

    /// Number of keys currently cooling down
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Advance every timer by `dt` seconds, dropping the ones that finish
    pub fn update(&mut self, dt: f32) {
        let dt = crate::core::types::sanitize_dt(dt);
        if dt == 0.0 {
            return;
        }

        self.timers.retain(|key, timer| {
            timer.remaining = (timer.remaining - dt).max(0.0);
            if timer.remaining == 0.0 {
                tracing::debug!("Cooldown {} finished", key);
                false
            } else {
                true
            }
        });
    }
}
