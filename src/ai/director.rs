//! Adaptive AI director
//!
//! Watches player performance and nudges the difficulty dial. The
//! performance tracker keeps a sliding window of kill and death times on a
//! caller-supplied clock; the director turns periodic samples into a tension
//! value and pushes it into a `DifficultyController`.

use crate::ai::difficulty::DifficultyController;
use crate::ai::personality::PersonalityProfile;
use crate::core::config::DirectorConfig;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Kill count in the window above which the player counts as aggressive
const AGGRESSIVE_KILL_COUNT: usize = 10;

/// Snapshot of how the player is doing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    /// Kills per minute over the window
    pub kill_rate: f32,
    pub health_percent: f32,
    /// Deaths within the window
    pub recent_deaths: u32,
    /// Seconds since the last kill (`f32::MAX` if none yet)
    pub time_since_last_kill: f32,
    pub player_aggressive: bool,
}

impl Default for PerformanceSample {
    fn default() -> Self {
        Self {
            kill_rate: 0.0,
            health_percent: 1.0,
            recent_deaths: 0,
            time_since_last_kill: f32::MAX,
            player_aggressive: false,
        }
    }
}

/// Sliding window of kill and death timestamps (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceTracker {
    window: f32,
    kills: VecDeque<f32>,
    deaths: VecDeque<f32>,
    last_kill: Option<f32>,
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self::new(DirectorConfig::default().performance_window)
    }
}

impl PerformanceTracker {
    pub fn new(window: f32) -> Self {
        Self {
            window: window.max(1.0),
            kills: VecDeque::new(),
            deaths: VecDeque::new(),
            last_kill: None,
        }
    }

    pub fn record_kill(&mut self, now: f32) {
        self.kills.push_back(now);
        self.last_kill = Some(now);
        self.prune(now);
    }

    pub fn record_death(&mut self, now: f32) {
        self.deaths.push_back(now);
        self.prune(now);
    }

    /// Drop events older than the window
    pub fn prune(&mut self, now: f32) {
        let window = self.window;
        while self.kills.front().is_some_and(|&t| now - t > window) {
            self.kills.pop_front();
        }
        while self.deaths.front().is_some_and(|&t| now - t > window) {
            self.deaths.pop_front();
        }
    }

    pub fn kills_in_window(&self) -> usize {
        self.kills.len()
    }

    pub fn deaths_in_window(&self) -> usize {
        self.deaths.len()
    }

    /// Summarize the window as of `now`
    pub fn sample(&mut self, now: f32, health_percent: f32) -> PerformanceSample {
        self.prune(now);
        let minutes = self.window / 60.0;
        PerformanceSample {
            kill_rate: self.kills.len() as f32 / minutes,
            health_percent: health_percent.clamp(0.0, 1.0),
            recent_deaths: self.deaths.len() as u32,
            time_since_last_kill: self.last_kill.map(|t| now - t).unwrap_or(f32::MAX),
            player_aggressive: self.kills.len() > AGGRESSIVE_KILL_COUNT,
        }
    }
}

/// How the director read the last sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectorVerdict {
    /// Player is dominating, tension raised
    Escalate,
    /// Player is struggling, tension lowered
    Ease,
    /// No change
    Hold,
}

#[derive(Debug, Clone)]
pub struct AiDirector {
    config: DirectorConfig,
    tension: f32,
    since_update: f32,
}

impl Default for AiDirector {
    fn default() -> Self {
        Self::new(DirectorConfig::default())
    }
}

impl AiDirector {
    /// Non-finite tension settings fall back to their defaults
    pub fn new(mut config: DirectorConfig) -> Self {
        let defaults = DirectorConfig::default();
        if !(config.min_tension.is_finite() && config.max_tension.is_finite()) {
            tracing::warn!(
                "Non-finite director tension bounds ({}, {}), using defaults",
                config.min_tension,
                config.max_tension
            );
            config.min_tension = defaults.min_tension;
            config.max_tension = defaults.max_tension;
        }
        if config.min_tension > config.max_tension {
            std::mem::swap(&mut config.min_tension, &mut config.max_tension);
        }
        if !config.initial_tension.is_finite() {
            config.initial_tension = defaults.initial_tension;
        }

        let tension = config
            .initial_tension
            .clamp(config.min_tension, config.max_tension);
        Self {
            config,
            tension,
            since_update: 0.0,
        }
    }

    pub fn tension(&self) -> f32 {
        self.tension
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Advance the evaluation timer; evaluates once per interval
    ///
    /// Returns the verdict when an evaluation ran this call.
    pub fn update(
        &mut self,
        dt: f32,
        sample: &PerformanceSample,
        difficulty: &mut DifficultyController,
    ) -> Option<DirectorVerdict> {
        if !self.config.enabled {
            return None;
        }

        self.since_update += crate::core::types::sanitize_dt(dt);
        if self.since_update < self.config.update_interval {
            return None;
        }
        self.since_update = 0.0;

        Some(self.evaluate(sample, difficulty))
    }

    /// Read a sample, move tension and push it to the difficulty dial
    pub fn evaluate(
        &mut self,
        sample: &PerformanceSample,
        difficulty: &mut DifficultyController,
    ) -> DirectorVerdict {
        let c = &self.config;
        let verdict = if sample.kill_rate > c.dominating_kill_rate
            && sample.health_percent > c.dominating_health
        {
            DirectorVerdict::Escalate
        } else if sample.health_percent < c.struggling_health
            && sample.recent_deaths > c.struggling_deaths
        {
            DirectorVerdict::Ease
        } else {
            DirectorVerdict::Hold
        };

        match verdict {
            DirectorVerdict::Escalate => {
                tracing::debug!("Player dominating, increasing intensity");
                self.tension += c.tension_step;
            }
            DirectorVerdict::Ease => {
                tracing::debug!("Player struggling, easing difficulty");
                self.tension -= c.tension_step;
            }
            DirectorVerdict::Hold => {}
        }

        self.tension = self.tension.clamp(c.min_tension, c.max_tension);
        difficulty.set_level(self.tension);
        verdict
    }

    /// Ease off immediately after a player death
    pub fn on_player_died(&mut self) {
        self.tension = (self.tension - self.config.death_penalty).max(self.config.min_tension);
        tracing::debug!("Player died, tension reduced to {:.2}", self.tension);
    }

    /// Personality for a newly spawned enemy given the current situation
    pub fn personality_for(&self, sample: &PerformanceSample, ally_count: u32) -> PersonalityProfile {
        PersonalityProfile::normalized(
            if sample.health_percent > 0.5 { 0.8 } else { 0.4 },
            if sample.kill_rate > 5.0 { 0.7 } else { 0.3 },
            if ally_count > 3 { 0.9 } else { 0.2 },
            if sample.player_aggressive { 0.8 } else { 0.3 },
        )
    }

    /// Enemy headcount the director would like on the field
    pub fn desired_enemy_count(&self) -> u32 {
        (10.0 + self.tension * 20.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dominating() -> PerformanceSample {
        PerformanceSample {
            kill_rate: 12.0,
            health_percent: 0.9,
            ..Default::default()
        }
    }

    fn struggling() -> PerformanceSample {
        PerformanceSample {
            kill_rate: 1.0,
            health_percent: 0.2,
            recent_deaths: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_non_finite_tension_bounds_use_defaults() {
        let config = DirectorConfig {
            min_tension: f32::NAN,
            max_tension: 0.9,
            initial_tension: f32::INFINITY,
            ..DirectorConfig::default()
        };
        let director = AiDirector::new(config);
        let defaults = DirectorConfig::default();
        assert_eq!(director.tension(), defaults.initial_tension);
        assert_eq!(director.config().min_tension, defaults.min_tension);
        assert_eq!(director.config().max_tension, defaults.max_tension);
    }

    #[test]
    fn test_inverted_tension_bounds_swapped() {
        let config = DirectorConfig {
            min_tension: 0.8,
            max_tension: 0.3,
            initial_tension: 1.0,
            ..DirectorConfig::default()
        };
        let mut director = AiDirector::new(config);
        assert_eq!(director.tension(), 0.8);
        director.on_player_died();
        assert!((director.tension() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_tracker_window_prunes_old_events() {
        let mut tracker = PerformanceTracker::new(300.0);
        tracker.record_kill(0.0);
        tracker.record_kill(100.0);
        tracker.record_death(50.0);

        let sample = tracker.sample(360.0, 1.0);
        assert_eq!(tracker.kills_in_window(), 1);
        assert_eq!(sample.recent_deaths, 0);
        assert_eq!(sample.time_since_last_kill, 260.0);
    }

    #[test]
    fn test_tracker_kill_rate_per_minute() {
        let mut tracker = PerformanceTracker::new(300.0);
        for i in 0..15 {
            tracker.record_kill(i as f32);
        }
        let sample = tracker.sample(20.0, 0.75);
        assert_eq!(sample.kill_rate, 3.0);
        assert!(sample.player_aggressive);
        assert_eq!(sample.health_percent, 0.75);
    }

    #[test]
    fn test_no_kills_yet() {
        let mut tracker = PerformanceTracker::default();
        let sample = tracker.sample(10.0, 1.0);
        assert_eq!(sample.time_since_last_kill, f32::MAX);
        assert!(!sample.player_aggressive);
    }

    #[test]
    fn test_evaluate_escalates() {
        let mut director = AiDirector::default();
        let mut difficulty = DifficultyController::default();
        let verdict = director.evaluate(&dominating(), &mut difficulty);

        assert_eq!(verdict, DirectorVerdict::Escalate);
        assert!((director.tension() - 0.6).abs() < 1e-6);
        assert_eq!(difficulty.level(), director.tension());
    }

    #[test]
    fn test_evaluate_eases() {
        let mut director = AiDirector::default();
        let mut difficulty = DifficultyController::default();
        assert_eq!(director.evaluate(&struggling(), &mut difficulty), DirectorVerdict::Ease);
        assert!((director.tension() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_tension_bounded() {
        let mut director = AiDirector::default();
        let mut difficulty = DifficultyController::default();
        for _ in 0..20 {
            director.evaluate(&struggling(), &mut difficulty);
        }
        assert_eq!(director.tension(), 0.2);
        for _ in 0..20 {
            director.evaluate(&dominating(), &mut difficulty);
        }
        assert_eq!(director.tension(), 1.0);
        assert_eq!(difficulty.level(), 1.0);
    }

    #[test]
    fn test_update_waits_for_interval() {
        let mut director = AiDirector::default();
        let mut difficulty = DifficultyController::default();
        assert!(director.update(1.0, &dominating(), &mut difficulty).is_none());
        assert_eq!(
            director.update(1.0, &dominating(), &mut difficulty),
            Some(DirectorVerdict::Escalate)
        );
        assert!(director.update(0.5, &dominating(), &mut difficulty).is_none());
    }

    #[test]
    fn test_disabled_director_is_inert() {
        let mut director = AiDirector::default();
        director.set_enabled(false);
        let mut difficulty = DifficultyController::new(0.0, 1.0, 0.3);
        assert!(director.update(10.0, &dominating(), &mut difficulty).is_none());
        assert_eq!(difficulty.level(), 0.3);
    }

    #[test]
    fn test_player_death_drops_tension() {
        let mut director = AiDirector::default();
        director.on_player_died();
        assert!((director.tension() - 0.2).abs() < 1e-6);
        director.on_player_died();
        assert_eq!(director.tension(), 0.2);
    }

    #[test]
    fn test_situational_personality() {
        let director = AiDirector::default();
        let p = director.personality_for(&dominating(), 5);
        assert_eq!(p.aggression, 0.8);
        assert_eq!(p.caution, 0.7);
        assert_eq!(p.teamwork, 0.9);
        assert!(p.is_normalized());
    }

    #[test]
    fn test_desired_enemy_count() {
        let director = AiDirector::default();
        assert_eq!(director.desired_enemy_count(), 20);
    }
}
