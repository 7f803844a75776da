//! Random distraction scheduling.
//!
//! The scheduler is polled on a fixed interval while the timer is counting.
//! Each poll consults the time since the last distraction:
//!
//! | Since last fire         | Chance to fire            |
//! |-------------------------|---------------------------|
//! | < cooldown (60s)        | never                     |
//! | cooldown ..= escalation | base probability (0.3)    |
//! | > escalation (300s)     | min(2 × base, 1.0)        |
//!
//! A scheduler that has never fired treats the elapsed time as unbounded.

use chrono::{DateTime, Duration, Utc};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const CATALOG: [(&str, &str); 10] = [
    (
        "Social Media Notification",
        "Your friend just posted a new photo. Check it out?",
    ),
    ("Email Alert", "You've received a new email. Want to read it now?"),
    ("Text Message", "You have a new text message. Respond now?"),
    (
        "YouTube Recommendation",
        "A new video you might like is trending. Watch it?",
    ),
    ("News Alert", "Breaking news just came in. Read the headline?"),
    ("App Update", "A new update is available for your app. Update now?"),
    (
        "Game Invitation",
        "Your friend invited you to play a game. Join them?",
    ),
    (
        "Random Thought",
        "Hmm, I wonder what's in the refrigerator right now...",
    ),
    ("Phone Call", "Unknown number is calling. Answer the phone?"),
    ("Shopping Deal", "Flash sale on your wishlist item! Check it out?"),
];

/// An interruption waiting for the player to ignore or yield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distraction {
    pub title: String,
    pub description: String,
}

impl Distraction {
    /// Number of prompts in the catalog.
    pub fn catalog_len() -> usize {
        CATALOG.len()
    }

    /// Catalog entry by index, wrapping on overflow.
    pub fn from_catalog(index: usize) -> Self {
        let (title, description) = CATALOG[index % CATALOG.len()];
        Self {
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// Tunables for the firing gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistractionSettings {
    /// Base chance per poll (0.0 to 1.0)
    pub probability: f64,
    /// No distraction fires within this many seconds of the last one
    pub cooldown_secs: i64,
    /// Past this many seconds the chance doubles
    pub escalation_secs: i64,
}

impl DistractionSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(ValidationError::InvalidValue {
                field: "distraction.probability".into(),
                message: format!("must be within 0.0..=1.0, got {}", self.probability),
            });
        }
        if self.cooldown_secs < 0 || self.cooldown_secs > self.escalation_secs {
            return Err(ValidationError::InvalidValue {
                field: "distraction.cooldown_secs".into(),
                message: format!(
                    "must be between 0 and escalation_secs ({}), got {}",
                    self.escalation_secs, self.cooldown_secs
                ),
            });
        }
        Ok(())
    }

    /// Chance to fire after `elapsed` since the last distraction.
    ///
    /// `None` means no distraction has fired yet.
    pub fn chance(&self, elapsed: Option<Duration>) -> f64 {
        match elapsed {
            Some(e) if e < Duration::seconds(self.cooldown_secs) => 0.0,
            Some(e) if e <= Duration::seconds(self.escalation_secs) => self.probability,
            _ => (self.probability * 2.0).min(1.0),
        }
    }

    /// Pure firing decision for a uniform roll in `[0, 1)`.
    pub fn decide(&self, elapsed: Option<Duration>, roll: f64) -> bool {
        roll < self.chance(elapsed)
    }
}

impl Default for DistractionSettings {
    fn default() -> Self {
        Self {
            probability: 0.3,
            cooldown_secs: 60,
            escalation_secs: 300,
        }
    }
}

/// Stateful gate owning the "last distraction" clock and its own RNG.
#[derive(Debug, Clone)]
pub struct DistractionScheduler {
    settings: DistractionSettings,
    last_fired_at: Option<DateTime<Utc>>,
    rng: Mcg128Xsl64,
}

impl DistractionScheduler {
    /// `seed` makes firing reproducible; `None` seeds from entropy.
    pub fn new(settings: DistractionSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self {
            settings,
            last_fired_at: None,
            rng,
        }
    }

    pub fn settings(&self) -> &DistractionSettings {
        &self.settings
    }

    pub fn last_fired_at(&self) -> Option<DateTime<Utc>> {
        self.last_fired_at
    }

    /// Roll for a distraction at `now`. Records the firing time on success.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<Distraction> {
        let elapsed = self.last_fired_at.map(|last| now - last);
        let roll: f64 = self.rng.gen();
        if !self.settings.decide(elapsed, roll) {
            tracing::trace!(roll, ?elapsed, "distraction poll held");
            return None;
        }
        Some(self.fire_now(now))
    }

    /// Fire unconditionally at `now`, bypassing the gate.
    pub fn fire_now(&mut self, now: DateTime<Utc>) -> Distraction {
        self.last_fired_at = Some(now);
        let index = self.rng.gen_range(0..CATALOG.len());
        Distraction::from_catalog(index)
    }

    /// Forget the last firing time.
    pub fn reset(&mut self) {
        self.last_fired_at = None;
    }
}

impl Default for DistractionScheduler {
    fn default() -> Self {
        Self::new(DistractionSettings::default(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secs(n: i64) -> Option<Duration> {
        Some(Duration::seconds(n))
    }

    #[test]
    fn cooldown_blocks_every_roll() {
        let s = DistractionSettings::default();
        assert!(!s.decide(secs(0), 0.0));
        assert!(!s.decide(secs(59), 0.0));
    }

    #[test]
    fn base_window_uses_base_probability() {
        let s = DistractionSettings::default();
        assert!(s.decide(secs(60), 0.29));
        assert!(!s.decide(secs(60), 0.3));
        assert!(s.decide(secs(300), 0.29));
        assert!(!s.decide(secs(300), 0.31));
    }

    #[test]
    fn past_escalation_doubles_probability() {
        let s = DistractionSettings::default();
        assert!(s.decide(secs(301), 0.59));
        assert!(!s.decide(secs(301), 0.6));
    }

    #[test]
    fn never_fired_counts_as_escalated() {
        let s = DistractionSettings::default();
        assert!((s.chance(None) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn doubled_probability_is_capped() {
        let s = DistractionSettings {
            probability: 0.8,
            ..Default::default()
        };
        assert_eq!(s.chance(secs(1000)), 1.0);
        assert!(s.decide(secs(1000), 0.999_999));
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let mut s = DistractionSettings::default();
        s.probability = 1.5;
        assert!(s.validate().is_err());
        let mut s = DistractionSettings::default();
        s.cooldown_secs = 400;
        assert!(s.validate().is_err());
        assert!(DistractionSettings::default().validate().is_ok());
    }

    #[test]
    fn certain_probability_fires_after_cooldown() {
        let settings = DistractionSettings {
            probability: 1.0,
            ..Default::default()
        };
        let mut scheduler = DistractionScheduler::new(settings, Some(7));
        let t0 = Utc::now();
        assert!(scheduler.poll(t0).is_some());
        assert_eq!(scheduler.last_fired_at(), Some(t0));
        assert!(scheduler.poll(t0 + Duration::seconds(30)).is_none());
        assert!(scheduler.poll(t0 + Duration::seconds(60)).is_some());
    }

    #[test]
    fn zero_probability_never_fires() {
        let settings = DistractionSettings {
            probability: 0.0,
            ..Default::default()
        };
        let mut scheduler = DistractionScheduler::new(settings, Some(1));
        let t0 = Utc::now();
        for i in 0..100 {
            assert!(scheduler.poll(t0 + Duration::seconds(i * 10)).is_none());
        }
        assert!(scheduler.last_fired_at().is_none());
    }

    #[test]
    fn reset_clears_the_clock() {
        let mut scheduler = DistractionScheduler::new(DistractionSettings::default(), Some(3));
        scheduler.fire_now(Utc::now());
        assert!(scheduler.last_fired_at().is_some());
        scheduler.reset();
        assert!(scheduler.last_fired_at().is_none());
    }

    #[test]
    fn same_seed_same_sequence() {
        let t0 = Utc::now();
        let run = |seed| {
            let mut s = DistractionScheduler::new(DistractionSettings::default(), Some(seed));
            (0..200)
                .map(|i| s.poll(t0 + Duration::seconds(i * 10)).map(|d| d.title))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn catalog_wraps() {
        assert_eq!(Distraction::catalog_len(), 10);
        assert_eq!(Distraction::from_catalog(10), Distraction::from_catalog(0));
        assert_eq!(Distraction::from_catalog(1).title, "Email Alert");
    }

    proptest! {
        #[test]
        fn never_fires_twice_within_cooldown(
            seed in any::<u64>(),
            probability in 0.0f64..=1.0,
            gaps in prop::collection::vec(0i64..120, 1..200),
        ) {
            let settings = DistractionSettings { probability, ..Default::default() };
            let mut scheduler = DistractionScheduler::new(settings, Some(seed));
            let mut now = Utc::now();
            let mut last_fire: Option<DateTime<Utc>> = None;
            for gap in gaps {
                now += Duration::seconds(gap);
                if scheduler.poll(now).is_some() {
                    if let Some(prev) = last_fire {
                        prop_assert!(now - prev >= Duration::seconds(60));
                    }
                    last_fire = Some(now);
                }
            }
        }
    }
}
