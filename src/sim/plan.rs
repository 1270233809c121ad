//! Spin planning: winner, revolutions and duration, resolved up front
//!
//! A plan is immutable; no randomness is consumed once animation begins.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arc::resolve_target_angle;
use super::prize::{PrizeSet, Segment};
use crate::consts::FULL_TURN_DEG;
use crate::error::{Result, SpinError};
use crate::settings::SpinConfiguration;

/// Fully resolved description of one spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinPlan {
    /// Index of the winner in the prize set at planning time
    pub winning_index: usize,
    pub winning_segment: Segment,
    pub start_rotation_deg: f64,
    /// Always strictly greater than `start_rotation_deg`
    pub target_rotation_deg: f64,
    /// Stopping point inside the winning slice (local frame)
    pub landing_angle_deg: f64,
    pub revolutions: u32,
    pub duration_ms: u64,
}

impl SpinPlan {
    /// Total angular travel
    pub fn travel_deg(&self) -> f64 {
        self.target_rotation_deg - self.start_rotation_deg
    }
}

/// Plan a spin from the current wheel state
pub fn plan<R: Rng>(
    prizes: &PrizeSet,
    config: &SpinConfiguration,
    current_rotation_deg: f64,
    rng: &mut R,
) -> Result<SpinPlan> {
    if prizes.is_empty() {
        return Err(SpinError::InvalidState("no prizes on the wheel".into()));
    }
    config.validate()?;

    let count = prizes.len();
    let winning_index = rng.random_range(0..count);
    let winning_segment = prizes
        .get(winning_index)
        .cloned()
        .ok_or_else(|| SpinError::InvalidState(format!("segment {} vanished", winning_index)))?;

    let aligned = resolve_target_angle(
        winning_index,
        count,
        current_rotation_deg,
        config.safe_margin_percent,
        rng,
    )?;

    let revolutions = rng.random_range(config.min_revolutions..=config.max_revolutions);
    let target_rotation_deg = aligned.target_rotation_deg + revolutions as f64 * FULL_TURN_DEG;

    Ok(SpinPlan {
        winning_index,
        winning_segment,
        start_rotation_deg: current_rotation_deg,
        target_rotation_deg,
        landing_angle_deg: aligned.landing_angle_deg,
        revolutions,
        duration_ms: config.duration_for(revolutions),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arc::segment_under_pointer;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn four_prizes() -> PrizeSet {
        let mut set = PrizeSet::new();
        for name in ["A", "B", "C", "D"] {
            set.push(name, "#123456", "*", true);
        }
        set
    }

    #[test]
    fn test_empty_set_is_invalid_state() {
        let mut rng = Pcg32::seed_from_u64(1);
        let result = plan(&PrizeSet::new(), &SpinConfiguration::default(), 0.0, &mut rng);
        assert!(matches!(result, Err(SpinError::InvalidState(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut rng = Pcg32::seed_from_u64(1);
        let config = SpinConfiguration {
            min_revolutions: 5,
            max_revolutions: 2,
            ..Default::default()
        };
        let result = plan(&four_prizes(), &config, 0.0, &mut rng);
        assert!(matches!(result, Err(SpinError::ConfigurationInvalid(_))));
    }

    #[test]
    fn test_fixed_revolutions_fixed_duration() {
        let config = SpinConfiguration {
            min_revolutions: 10,
            max_revolutions: 10,
            base_duration_ms: 2000,
            duration_per_revolution_ms: 1000,
            safe_margin_percent: 5.0,
        };
        let prizes = four_prizes();
        let mut rng = Pcg32::seed_from_u64(42);
        let mut rotation = 0.0;
        for _ in 0..200 {
            let p = plan(&prizes, &config, rotation, &mut rng).unwrap();
            assert_eq!(p.duration_ms, 12_000);
            assert_eq!(p.revolutions, 10);
            rotation = p.target_rotation_deg;
        }
    }

    #[test]
    fn test_plans_move_forward_and_land_on_winner() {
        let prizes = four_prizes();
        let config = SpinConfiguration::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut rotation = 123.4;
        for _ in 0..500 {
            let p = plan(&prizes, &config, rotation, &mut rng).unwrap();
            assert!(p.target_rotation_deg > rotation);
            assert!(p.travel_deg() >= config.min_revolutions as f64 * FULL_TURN_DEG);
            assert_eq!(
                segment_under_pointer(p.target_rotation_deg, prizes.len()),
                Some(p.winning_index)
            );
            assert_eq!(prizes.get(p.winning_index), Some(&p.winning_segment));
            rotation = p.target_rotation_deg;
        }
    }

    #[test]
    fn test_duration_grows_with_revolutions() {
        let config = SpinConfiguration::default();
        let prizes = four_prizes();
        let mut rng = Pcg32::seed_from_u64(99);
        let plans: Vec<SpinPlan> = (0..300)
            .map(|_| plan(&prizes, &config, 0.0, &mut rng).unwrap())
            .collect();
        for a in &plans {
            for b in &plans {
                if a.revolutions < b.revolutions {
                    assert!(a.duration_ms < b.duration_ms);
                }
            }
        }
    }

    #[test]
    fn test_winner_distribution_is_uniform() {
        let prizes = four_prizes();
        let config = SpinConfiguration::default();
        let mut rng = Pcg32::seed_from_u64(2024);
        let spins = 10_000;
        let mut wins = [0usize; 4];
        let mut rotation = 0.0;
        for _ in 0..spins {
            let p = plan(&prizes, &config, rotation, &mut rng).unwrap();
            wins[p.winning_index] += 1;
            rotation = p.target_rotation_deg;
        }
        for (i, w) in wins.iter().enumerate() {
            let freq = *w as f64 / spins as f64;
            assert!((freq - 0.25).abs() < 0.02, "segment {} won {:.3}", i, freq);
        }
    }
}
