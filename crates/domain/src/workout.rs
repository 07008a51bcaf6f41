use std::fmt;

use derive_more::{Deref, Display, Into};
use uuid::Uuid;

use crate::{CreateError, ExerciseID, Name, ReadError};

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    async fn get_workouts(&self) -> Result<Vec<Workout>, ReadError>;
    async fn get_workout(&self, id: WorkoutID) -> Result<Workout, ReadError>;
    async fn get_workout_by_name(&self, name: &Name) -> Result<Workout, ReadError>;
    async fn create_workout(
        &self,
        name: Name,
        description: String,
        exercises: Vec<ExerciseSpec>,
    ) -> Result<Workout, CreateError>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_workouts(&self) -> Result<Vec<Workout>, ReadError>;
    async fn read_workout(&self, id: WorkoutID) -> Result<Workout, ReadError>;
    async fn read_workout_by_name(&self, name: &Name) -> Result<Workout, ReadError>;
    async fn create_workout(
        &self,
        name: Name,
        description: String,
        exercises: Vec<ExerciseSpec>,
    ) -> Result<Workout, CreateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workout {
    pub id: WorkoutID,
    pub name: Name,
    pub description: String,
    pub exercises: Vec<ExerciseSpec>,
}

impl Workout {
    #[must_use]
    pub fn num_sets(&self) -> u32 {
        self.exercises.iter().map(|e| u32::from(e.sets)).sum()
    }
}

#[derive(Deref, Debug, Display, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutID(Uuid);

impl From<Uuid> for WorkoutID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Prescription of one exercise within a workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseSpec {
    pub exercise_id: ExerciseID,
    pub sets: Sets,
    pub reps: Reps,
    pub rte: RTE,
}

impl fmt::Display for ExerciseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} @ RTE {}", self.sets, self.reps, self.rte)
    }
}

#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sets(u32);

impl Sets {
    pub fn new(value: u32) -> Result<Self, SetsError> {
        if value == 0 {
            return Err(SetsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Sets {
    type Error = SetsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Sets::new(parsed_value),
            Err(_) => Err(SetsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SetsError {
    #[error("Sets must be 1 or more")]
    OutOfRange,
    #[error("Sets must be an integer")]
    ParseError,
}

#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if value == 0 {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be 1 or more")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

/// Rate of target effort, the prescribed intensity on a scale from 1 to 10.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct RTE(u8);

impl RTE {
    pub const MIN: RTE = RTE(1);
    pub const MAX: RTE = RTE(10);

    pub fn new(value: u8) -> Result<Self, RTEError> {
        if !(Self::MIN.0..=Self::MAX.0).contains(&value) {
            return Err(RTEError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for RTE {
    type Error = RTEError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u8>() {
            Ok(parsed_value) => RTE::new(parsed_value),
            Err(_) => Err(RTEError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RTEError {
    #[error("RTE must be in the range 1 to 10")]
    OutOfRange,
    #[error("RTE must be an integer")]
    ParseError,
}
