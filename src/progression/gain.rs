//! Mana-to-progress gain curve
//!
//! Casting a spell grants percentage progress in its school. Gain shrinks
//! both as the school's own progress grows and as the actor's total points
//! across all schools grow; the two factors multiply.

use crate::core::config::GainConfig;

/// `max(minimum, 1 / (1 + amount^decay))`, or 1.0 for nothing accumulated
pub fn scaling_factor(amount: u32, decay_strength: f32, minimum_factor: f32) -> f32 {
    if amount == 0 {
        return 1.0;
    }

    let factor = 1.0 / (1.0 + f64::from(amount).powf(f64::from(decay_strength)));
    (factor as f32).max(minimum_factor)
}

/// Percentage progress earned by spending `mana` in a school
///
/// `current_percentage` is the school's progress so far (0 to 100) and
/// `total_points` the actor's earned points across every school.
pub fn percentage_increase(mana: f32, current_percentage: f32, total_points: u32, config: &GainConfig) -> f32 {
    let base = mana * config.multiplier;

    let school = scaling_factor(
        current_percentage.max(0.0) as u32,
        config.school_decay_strength,
        config.school_minimum_factor,
    );
    let global = scaling_factor(
        total_points,
        config.global_decay_strength,
        config.global_minimum_factor,
    );

    (base * school * global).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_factor_bounds() {
        assert_eq!(scaling_factor(0, 3.0, 0.1), 1.0);
        assert_eq!(scaling_factor(1, 1.0, 0.1), 0.5);
        assert_eq!(scaling_factor(50, 3.0, 0.1), 0.1);
    }

    #[test]
    fn test_fresh_actor_gets_full_gain() {
        let config = GainConfig::default();
        let gain = percentage_increase(1000.0, 0.0, 0, &config);
        assert!((gain - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_gain_decays_with_progress() {
        let config = GainConfig::default();
        let fresh = percentage_increase(1000.0, 0.0, 0, &config);
        let advanced = percentage_increase(1000.0, 40.0, 0, &config);
        let veteran = percentage_increase(1000.0, 40.0, 30, &config);

        assert!(advanced < fresh);
        assert!(veteran < advanced);
        // Both floors apply: 0.1 * 0.2
        assert!((veteran - fresh * 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_negative_mana_grants_nothing() {
        let config = GainConfig::default();
        assert_eq!(percentage_increase(-50.0, 0.0, 0, &config), 0.0);
    }
}
