//! Link thickness from a count.
//!
//! Both helpers map `val` within `min..=max` onto the client's 1..=5 stroke
//! widths, for use with [`Entity::set_link_thickness`](crate::Entity::set_link_thickness).
//! When `min == max`, `min` is taken as 0 so a single observation still
//! scales against its own magnitude.

/// Thickness on a roughly logarithmic scale: the first 1% of the range maps
/// to 1, up to 10% to 2, up to 30% to 3, up to 60% to 4, the rest to 5.
pub fn thickness(val: u64, min: u64, max: u64) -> u32 {
    let min = if min == max { 0 } else { min };
    let delta = max.saturating_sub(min) as f64;
    let val = val as f64;

    if val <= delta * 0.01 {
        1
    } else if val <= delta * 0.1 {
        2
    } else if val <= delta * 0.3 {
        3
    } else if val <= delta * 0.6 {
        4
    } else {
        5
    }
}

/// Thickness on a linear scale of five equal intervals.
pub fn thickness_interval(val: u64, min: u64, max: u64) -> u32 {
    let min = if min == max { 0 } else { min };
    let interval = max.saturating_sub(min) / 5;

    (1..=4)
        .find(|k| val <= interval * u64::from(*k))
        .unwrap_or(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logarithmic_steps() {
        assert_eq!(thickness(0, 0, 1000), 1);
        assert_eq!(thickness(10, 0, 1000), 1);
        assert_eq!(thickness(11, 0, 1000), 2);
        assert_eq!(thickness(100, 0, 1000), 2);
        assert_eq!(thickness(300, 0, 1000), 3);
        assert_eq!(thickness(600, 0, 1000), 4);
        assert_eq!(thickness(601, 0, 1000), 5);
        assert_eq!(thickness(5000, 0, 1000), 5);
    }

    #[test]
    fn equal_bounds_scale_from_zero() {
        // min == max == 50 behaves like 0..=50.
        assert_eq!(thickness(50, 50, 50), 5);
        assert_eq!(thickness_interval(50, 50, 50), 5);
        assert_eq!(thickness_interval(10, 50, 50), 1);
    }

    #[test]
    fn linear_steps() {
        assert_eq!(thickness_interval(0, 0, 100), 1);
        assert_eq!(thickness_interval(20, 0, 100), 1);
        assert_eq!(thickness_interval(21, 0, 100), 2);
        assert_eq!(thickness_interval(60, 0, 100), 3);
        assert_eq!(thickness_interval(80, 0, 100), 4);
        assert_eq!(thickness_interval(81, 0, 100), 5);
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        assert_eq!(thickness(3, 10, 1), 5);
        assert_eq!(thickness_interval(0, 10, 1), 1);
    }
}
