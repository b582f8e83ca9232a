//! Twist synchronisation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::axes::{ComponentWiseError, Twist, NUM_AXES};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// The longest time any moving axis would take to remove its error at its
/// current velocity.
///
/// Axes with zero velocity are ignored. Returns `None` if no axis gives a
/// finite time.
pub fn time_to_goal(limited: &Twist, error: &ComponentWiseError) -> Option<f64> {
    let v = limited.to_array();
    let e = error.to_array();

    (0..NUM_AXES)
        .filter(|i| v[*i] != 0.0)
        .map(|i| (e[i] / v[i]).abs())
        .filter(|t| t.is_finite())
        .fold(None, |max, t| match max {
            Some(m) if m >= t => Some(m),
            _ => Some(t),
        })
}

/// Rescale the limited velocity so that every moving axis reaches zero error
/// at the same time as the slowest one.
///
/// Each axis with non-zero velocity is set to `error / t_max`. If there is no
/// finite positive `t_max` the limited velocity is returned unchanged.
pub fn synchronize(limited: &Twist, error: &ComponentWiseError) -> Twist {
    let t_max = match time_to_goal(limited, error) {
        Some(t) if t > 0.0 => t,
        _ => return *limited,
    };

    let v = limited.to_array();
    let e = error.to_array();

    let mut out = [0f64; NUM_AXES];
    for i in 0..NUM_AXES {
        if v[i] != 0.0 {
            out[i] = e[i] / t_max;
        }
    }

    Twist::from(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::base_ctrl::{compute_velocity, limit};
    use crate::axes::{GainConfig, VelocityLimits};

    #[test]
    fn test_single_axis_unchanged() {
        let e = ComponentWiseError::from([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let v = Twist::from([0.65, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let out = synchronize(&v, &e);

        assert!((out.linear_x - 0.65).abs() < 1e-12);
        assert!(out.to_array()[1..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_zero_twist() {
        let e = ComponentWiseError::from([1.0, 2.0, 0.0, 0.0, 0.0, 0.5]);
        assert_eq!(synchronize(&Twist::zero(), &e), Twist::zero());
        assert_eq!(time_to_goal(&Twist::zero(), &e), None);
    }

    #[test]
    fn test_slow_axis_sets_pace() {
        // x is clamped from 2.0 to 0.5 so takes 4 s, y would finish in 1 s
        let e = ComponentWiseError::from([2.0, -0.3, 0.0, 0.0, 0.0, 0.0]);
        let v = Twist::from([0.5, -0.3, 0.0, 0.0, 0.0, 0.0]);

        assert_eq!(time_to_goal(&v, &e), Some(4.0));

        let out = synchronize(&v, &e);
        assert!((out.linear_x - 0.5).abs() < 1e-12);
        assert!((out.linear_y - -0.075).abs() < 1e-12);
    }

    #[test]
    fn test_equal_time_to_goal() {
        let gains = GainConfig::from([1.4, 1.4, 1.4, 1.4, 1.4, 1.2]);
        let limits = VelocityLimits::from([0.65, 0.6, 0.0, 0.0, 0.0, 0.6]);
        let e = ComponentWiseError::from([3.0, -0.4, 0.2, 0.1, 0.1, 1.5]);

        let limited = limit(&compute_velocity(&e, &gains), &limits);
        let out = synchronize(&limited, &e);

        let o = out.to_array();
        let ea = e.to_array();
        let times: Vec<f64> = (0..NUM_AXES)
            .filter(|i| o[*i] != 0.0)
            .map(|i| (ea[i] / o[i]).abs())
            .collect();

        assert_eq!(times.len(), 3);
        for t in times.iter() {
            assert!((t - times[0]).abs() < 1e-9);
        }

        // Rescaling never exceeds the limits
        for (out, lim) in o.iter().zip(limits.to_array().iter()) {
            assert!(out.abs() <= lim + 1e-12);
        }
    }
}
