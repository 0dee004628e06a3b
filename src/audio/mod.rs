//! Audio: procedural ambience and effects
//!
//! Everything is synthesized at runtime - no external files. The scheduling
//! and noise generation here are platform independent; the Web Audio graph
//! lives in `web` and is only built for wasm32.

use rand::Rng;

use crate::sim::GameEvent;

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

/// Length of the looping rain buffer (seconds)
pub const RAIN_LOOP_SECS: f32 = 3.0;
/// Length of the noise bite layered under a scream (seconds)
pub const SCREAM_NOISE_SECS: f32 = 0.18;
/// How often the storm considers a thunder clap (seconds)
pub const THUNDER_INTERVAL_SECS: f32 = 4.5;
/// Chance of thunder at each interval
pub const THUNDER_CHANCE: f64 = 0.28;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Distant rumble during the storm
    Thunder,
    /// A kid got scared
    Scream,
    /// A kid spotted the ghost
    Alarm,
    /// Scare attempt with nobody around
    Whoosh,
}

impl SoundEffect {
    /// The effect a gameplay event should trigger, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::KidScared { .. } => Some(SoundEffect::Scream),
            GameEvent::KidSpotted { .. } => Some(SoundEffect::Alarm),
            GameEvent::ScareMissed => Some(SoundEffect::Whoosh),
            GameEvent::LevelChanged { .. } | GameEvent::Victory | GameEvent::Defeat => None,
        }
    }

    /// Ambient effects follow the ambience volume, the rest the SFX volume
    pub fn is_ambient(self) -> bool {
        matches!(self, SoundEffect::Thunder)
    }
}

/// Decides when the storm rumbles
#[derive(Debug, Clone)]
pub struct ThunderSchedule {
    elapsed: f32,
    interval: f32,
    chance: f64,
}

impl Default for ThunderSchedule {
    fn default() -> Self {
        Self::new(THUNDER_INTERVAL_SECS, THUNDER_CHANCE)
    }
}

impl ThunderSchedule {
    pub fn new(interval: f32, chance: f64) -> Self {
        Self {
            elapsed: 0.0,
            interval: interval.max(f32::EPSILON),
            chance: chance.clamp(0.0, 1.0),
        }
    }

    /// Advance by `dt` seconds; true if thunder should play now.
    /// Several elapsed intervals still produce at most one clap.
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> bool {
        self.elapsed += dt.max(0.0);
        let mut fire = false;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            if rng.random_bool(self.chance) {
                fire = true;
            }
        }
        fire
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Soft rain hiss with occasional louder drops
pub fn rain_noise<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f32> {
    (0..len)
        .map(|_| {
            let sample = rng.random::<f32>() * 2.0 - 1.0;
            let level = if rng.random::<f32>() > 0.995 { 0.6 } else { 0.12 };
            sample * level
        })
        .collect()
}

/// White noise fading linearly to silence
pub fn scream_noise<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f32> {
    let n = len.max(1) as f32;
    (0..len)
        .map(|i| (rng.random::<f32>() * 2.0 - 1.0) * (1.0 - i as f32 / n))
        .collect()
}

/// Sample count for `secs` of audio, at least one frame
pub fn frames_for(secs: f32, sample_rate: f32) -> usize {
    ((secs * sample_rate) as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_event_mapping() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::KidScared { level: 0, kid: 1 }),
            Some(SoundEffect::Scream)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::KidSpotted { level: 2, kid: 0 }),
            Some(SoundEffect::Alarm)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::ScareMissed),
            Some(SoundEffect::Whoosh)
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::Victory), None);
        assert!(SoundEffect::Thunder.is_ambient());
        assert!(!SoundEffect::Scream.is_ambient());
    }

    #[test]
    fn test_thunder_waits_for_interval() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut schedule = ThunderSchedule::new(4.5, 1.0);
        assert!(!schedule.advance(4.0, &mut rng));
        assert!(schedule.advance(0.6, &mut rng));
        assert!(!schedule.advance(1.0, &mut rng));
    }

    #[test]
    fn test_thunder_chance_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut never = ThunderSchedule::new(1.0, 0.0);
        assert!((0..50).all(|_| !never.advance(1.0, &mut rng)));

        // Roughly 28% over many intervals
        let mut storm = ThunderSchedule::default();
        let claps = (0..2000)
            .filter(|_| storm.advance(THUNDER_INTERVAL_SECS, &mut rng))
            .count();
        assert!((400..720).contains(&claps), "claps = {claps}");
    }

    #[test]
    fn test_rain_noise_levels() {
        let mut rng = Pcg32::seed_from_u64(1);
        let noise = rain_noise(frames_for(RAIN_LOOP_SECS, 8000.0), &mut rng);
        assert_eq!(noise.len(), 24000);
        assert!(noise.iter().all(|s| s.abs() <= 0.6));
        let quiet = noise.iter().filter(|s| s.abs() <= 0.12).count();
        assert!(quiet > noise.len() * 9 / 10);
    }

    #[test]
    fn test_scream_noise_decays() {
        let mut rng = Pcg32::seed_from_u64(3);
        let noise = scream_noise(1000, &mut rng);
        assert!(noise.iter().all(|s| s.abs() <= 1.0));
        assert!(noise[990..].iter().all(|s| s.abs() <= 0.01));
        assert!(scream_noise(0, &mut rng).is_empty());
    }
}
