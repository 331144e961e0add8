//! Progress rules: course completion percentage, module progress
//! normalization, and SM-2 flashcard scheduling.

use chrono::{DateTime, Duration, Utc};

/// Starting ease factor for a card that was never reviewed.
pub const INITIAL_EASE: f64 = 2.5;
/// Ease never drops below this value.
pub const MIN_EASE: f64 = 1.3;

/// `round(100 * completed / total)`, and 0 for an empty course.
pub fn course_percent(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    let completed = completed.clamp(0, total);
    ((completed as f64 * 100.0) / total as f64).round() as i64
}

/// Resolve the persisted percentage for a progress write.
///
/// A completed module is always at 100.
pub fn normalize_progress(completed: bool, progress_percent: Option<i32>) -> i32 {
    if completed {
        100
    } else {
        progress_percent.unwrap_or(0).clamp(0, 100)
    }
}

/// Scheduling state of a single card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewState {
    pub ease_factor: f64,
    pub interval_days: i64,
    pub repetitions: i64,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            ease_factor: INITIAL_EASE,
            interval_days: 0,
            repetitions: 0,
        }
    }
}

impl ReviewState {
    /// Apply one review graded `quality` (0..=5).
    pub fn review(self, quality: u8) -> ReviewState {
        let q = quality.min(5) as f64;
        let ease = (self.ease_factor + 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02)).max(MIN_EASE);

        if quality < 3 {
            return ReviewState {
                ease_factor: ease,
                interval_days: 1,
                repetitions: 0,
            };
        }

        let interval_days = match self.repetitions {
            0 => 1,
            1 => 6,
            _ => ((self.interval_days as f64) * self.ease_factor).round() as i64,
        };

        ReviewState {
            ease_factor: ease,
            interval_days: interval_days.max(1),
            repetitions: self.repetitions + 1,
        }
    }

    pub fn next_review_at(&self, reviewed_at: DateTime<Utc>) -> DateTime<Utc> {
        reviewed_at + Duration::days(self.interval_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_percent_rounds() {
        assert_eq!(course_percent(1, 3), 33);
        assert_eq!(course_percent(2, 3), 67);
        assert_eq!(course_percent(3, 3), 100);
    }

    #[test]
    fn test_course_percent_empty_course_is_zero() {
        assert_eq!(course_percent(0, 0), 0);
    }

    #[test]
    fn test_normalize_progress() {
        assert_eq!(normalize_progress(true, Some(40)), 100);
        assert_eq!(normalize_progress(false, Some(140)), 100);
        assert_eq!(normalize_progress(false, Some(-5)), 0);
        assert_eq!(normalize_progress(false, None), 0);
    }

    #[test]
    fn test_review_intervals_grow() {
        let first = ReviewState::default().review(5);
        assert_eq!(first.interval_days, 1);
        assert_eq!(first.repetitions, 1);

        let second = first.review(5);
        assert_eq!(second.interval_days, 6);

        let third = second.review(4);
        assert_eq!(third.interval_days, (6.0 * second.ease_factor).round() as i64);
        assert_eq!(third.repetitions, 3);
    }

    #[test]
    fn test_failed_review_resets() {
        let state = ReviewState {
            ease_factor: 2.5,
            interval_days: 15,
            repetitions: 4,
        };
        let next = state.review(1);
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.repetitions, 0);
        assert!(next.ease_factor < 2.5);
    }

    #[test]
    fn test_ease_has_floor() {
        let mut state = ReviewState::default();
        for _ in 0..10 {
            state = state.review(0);
        }
        assert!((state.ease_factor - MIN_EASE).abs() < f64::EPSILON);
    }
}
