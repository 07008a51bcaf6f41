use std::ops::Range;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{ExerciseID, ReadError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait ExerciseLogService {
    /// Weight and notes of the most recently touched log entry of an exercise.
    ///
    /// Returns empty values if the exercise has not been logged yet.
    async fn get_previous_log(&self, exercise_id: ExerciseID) -> Result<PreviousLog, ReadError>;

    /// Records today's performance of an exercise.
    ///
    /// The entry of the current UTC day is updated in place if it exists, otherwise a new
    /// entry is created. Saves for the same exercise and day are serialized.
    async fn save_exercise_log(
        &self,
        exercise_id: ExerciseID,
        weight: String,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<ExerciseLog, UpdateError>;

    async fn get_exercise_logs(&self, exercise_id: ExerciseID)
    -> Result<Vec<ExerciseLog>, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseLogRepository {
    /// All entries of an exercise ordered by creation time.
    async fn read_exercise_logs(&self, exercise_id: ExerciseID)
    -> Result<Vec<ExerciseLog>, ReadError>;
    /// The entry with the latest `updated_ts`.
    async fn read_latest_exercise_log(
        &self,
        exercise_id: ExerciseID,
    ) -> Result<Option<ExerciseLog>, ReadError>;
    /// Updates the entry whose anchor timestamp lies in the half-open `window` or creates a
    /// new one if there is none.
    ///
    /// Lookup and write are a single atomic operation of the store.
    async fn upsert_exercise_log(
        &self,
        exercise_id: ExerciseID,
        anchor: DayAnchor,
        window: Range<DateTime<Utc>>,
        weight: String,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<ExerciseLog, UpdateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseLog {
    pub id: ExerciseLogID,
    pub exercise_id: ExerciseID,
    pub weight: String,
    pub notes: String,
    pub created_ts: DateTime<Utc>,
    pub updated_ts: DateTime<Utc>,
}

impl ExerciseLog {
    #[must_use]
    pub fn timestamp(&self, anchor: DayAnchor) -> DateTime<Utc> {
        match anchor {
            DayAnchor::Created => self.created_ts,
            DayAnchor::Updated => self.updated_ts,
        }
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.created_ts.date_naive()
    }
}

#[derive(Deref, Debug, Display, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseLogID(Uuid);

impl From<Uuid> for ExerciseLogID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseLogID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PreviousLog {
    pub weight: String,
    pub notes: String,
}

impl From<ExerciseLog> for PreviousLog {
    fn from(value: ExerciseLog) -> Self {
        Self {
            weight: value.weight,
            notes: value.notes,
        }
    }
}

/// Timestamp which decides whether an existing entry belongs to the current day.
#[derive(
    strum::AsRefStr,
    strum::Display,
    strum::EnumString,
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
)]
#[strum(serialize_all = "snake_case")]
pub enum DayAnchor {
    #[default]
    Created,
    Updated,
}

/// The UTC calendar day containing `now` as a half-open range.
#[must_use]
pub fn day_window(now: DateTime<Utc>) -> Range<DateTime<Utc>> {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let end = start
        .checked_add_days(Days::new(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    start..end
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[rstest]
    #[case::morning(utc(2024, 1, 1, 10, 0, 0))]
    #[case::midnight(utc(2024, 1, 1, 0, 0, 0))]
    #[case::last_second(utc(2024, 1, 1, 23, 59, 59))]
    fn test_day_window(#[case] now: DateTime<Utc>) {
        assert_eq!(
            day_window(now),
            utc(2024, 1, 1, 0, 0, 0)..utc(2024, 1, 2, 0, 0, 0)
        );
    }

    #[test]
    fn test_day_window_is_half_open() {
        let window = day_window(utc(2024, 2, 28, 12, 0, 0));
        assert!(window.contains(&utc(2024, 2, 28, 0, 0, 0)));
        assert!(!window.contains(&utc(2024, 2, 29, 0, 0, 0)));
    }

    #[test]
    fn test_exercise_log_timestamp() {
        let log = ExerciseLog {
            id: 1.into(),
            exercise_id: 2.into(),
            weight: "100".to_string(),
            notes: String::new(),
            created_ts: utc(2024, 1, 1, 23, 59, 0),
            updated_ts: utc(2024, 1, 2, 0, 1, 0),
        };
        assert_eq!(log.timestamp(DayAnchor::Created), log.created_ts);
        assert_eq!(log.timestamp(DayAnchor::Updated), log.updated_ts);
        assert_eq!(log.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_previous_log_default_is_empty() {
        assert_eq!(
            PreviousLog::default(),
            PreviousLog {
                weight: String::new(),
                notes: String::new()
            }
        );
    }

    #[rstest]
    #[case("created", Ok(DayAnchor::Created))]
    #[case("updated", Ok(DayAnchor::Updated))]
    #[case("midnight", Err(strum::ParseError::VariantNotFound))]
    fn test_day_anchor_from_str(
        #[case] value: &str,
        #[case] expected: Result<DayAnchor, strum::ParseError>,
    ) {
        assert_eq!(DayAnchor::from_str(value), expected);
    }
}
