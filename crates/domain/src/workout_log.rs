use chrono::{DateTime, Utc};
use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{CreateError, ReadError, WorkoutID};

#[allow(async_fn_in_trait)]
pub trait WorkoutLogService {
    /// Records a workout submission. Every call creates a new entry.
    async fn log_workout(
        &self,
        workout_id: WorkoutID,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<WorkoutLog, CreateError>;
    async fn get_workout_logs(&self, workout_id: WorkoutID) -> Result<Vec<WorkoutLog>, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutLogRepository {
    async fn read_workout_logs(&self, workout_id: WorkoutID)
    -> Result<Vec<WorkoutLog>, ReadError>;
    async fn create_workout_log(
        &self,
        workout_id: WorkoutID,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<WorkoutLog, CreateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutLog {
    pub id: WorkoutLogID,
    pub workout_id: WorkoutID,
    pub notes: String,
    pub created_ts: DateTime<Utc>,
    pub updated_ts: DateTime<Utc>,
}

#[derive(Deref, Debug, Display, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutLogID(Uuid);

impl From<Uuid> for WorkoutLogID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutLogID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}
