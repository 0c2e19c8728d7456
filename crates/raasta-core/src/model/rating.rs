// ── Five-star growth rating ──

use std::fmt;

const MAX_STARS: usize = 5;

/// A 0–5 rating split into full, half and empty stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarRating {
    pub full: usize,
    pub half: usize,
    pub empty: usize,
}

impl StarRating {
    /// Whole part gives full stars, any remainder one half star.
    /// Out-of-range or non-finite ratings are clamped.
    pub fn from_rating(rating: f64) -> Self {
        let r = if rating.is_finite() {
            rating.clamp(0.0, 5.0)
        } else {
            0.0
        };
        let full = (1..=5u8).filter(|i| f64::from(*i) <= r).count();
        let half = usize::from(r.fract() > 0.0);
        Self {
            full,
            half,
            empty: MAX_STARS - full - half,
        }
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            "★".repeat(self.full),
            "½".repeat(self.half),
            "☆".repeat(self.empty)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_rating() {
        let s = StarRating::from_rating(3.0);
        assert_eq!((s.full, s.half, s.empty), (3, 0, 2));
        assert_eq!(s.to_string(), "★★★☆☆");
    }

    #[test]
    fn half_rating() {
        let s = StarRating::from_rating(3.5);
        assert_eq!((s.full, s.half, s.empty), (3, 1, 1));
        assert_eq!(s.to_string(), "★★★½☆");
    }

    #[test]
    fn zero_rating() {
        let s = StarRating::from_rating(0.0);
        assert_eq!((s.full, s.half, s.empty), (0, 0, 5));
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(StarRating::from_rating(9.0).full, 5);
        assert_eq!(StarRating::from_rating(-1.0).empty, 5);
        assert_eq!(StarRating::from_rating(f64::NAN).empty, 5);
    }
}
