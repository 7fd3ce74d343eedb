//! Daily average mood scores over a trailing window.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::store::MoodEntry;

/// One day of the trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Short label such as `"Oct 18"`.
    pub label: String,
    /// Mean score of that day's entries, or `None` for a day without any.
    pub average_score: Option<f64>,
}

/// The last `days` days ending at `today`, oldest first.
///
/// Entries are bucketed by the UTC calendar date of `created_at`.
pub fn daily_mood_trend(entries: &[MoodEntry], days: u32, today: NaiveDate) -> Vec<TrendPoint> {
    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|date| {
            let scores: Vec<i32> = entries
                .iter()
                .filter(|e| e.created_at.date_naive() == date)
                .map(|e| e.mood_score)
                .collect();
            let average_score = if scores.is_empty() {
                None
            } else {
                Some(f64::from(scores.iter().sum::<i32>()) / scores.len() as f64)
            };
            TrendPoint {
                date,
                label: date.format("%b %-d").to_string(),
                average_score,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::Mood;
    use chrono::{TimeZone, Utc};

    fn entry(day: u32, hour: u32, mood: Mood) -> MoodEntry {
        MoodEntry {
            id: format!("m-{day}-{hour}"),
            user_id: "u1".into(),
            mood,
            mood_score: mood.score(),
            created_at: Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn window_is_oldest_first_and_ends_today() {
        let trend = daily_mood_trend(&[], 7, today());
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].label, "Oct 12");
        assert_eq!(trend[6].label, "Oct 18");
        assert!(trend.iter().all(|p| p.average_score.is_none()));
    }

    #[test]
    fn averages_same_day_entries() {
        let entries = [
            entry(18, 8, Mood::Happy),
            entry(18, 20, Mood::Sad),
            entry(17, 9, Mood::Anxious),
            entry(1, 9, Mood::Happy),
        ];
        let trend = daily_mood_trend(&entries, 3, today());
        let scores: Vec<Option<f64>> = trend.iter().map(|p| p.average_score).collect();
        assert_eq!(scores, vec![None, Some(-2.0), Some(0.5)]);
    }

    #[test]
    fn zero_days_is_empty() {
        assert!(daily_mood_trend(&[entry(18, 8, Mood::Calm)], 0, today()).is_empty());
    }
}
