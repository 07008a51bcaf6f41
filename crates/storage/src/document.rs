use chrono::{DateTime, Utc};
use liftlog_domain as domain;
use strum::{AsRefStr, Display};
use uuid::Uuid;

#[derive(AsRefStr, Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    #[strum(serialize = "exercises")]
    Exercises,
    #[strum(serialize = "workouts")]
    Workouts,
    #[strum(serialize = "exercise_log")]
    ExerciseLog,
    #[strum(serialize = "workout_log")]
    WorkoutLog,
}

/// The complete content of a store, one array per collection.
#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Documents {
    pub exercises: Vec<Exercise>,
    pub workouts: Vec<Workout>,
    pub exercise_log: Vec<ExerciseLog>,
    pub workout_log: Vec<WorkoutLog>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("invalid document {id} in {collection}: {reason}")]
pub struct InvalidDocument {
    pub collection: Collection,
    pub id: Uuid,
    pub reason: String,
}

impl InvalidDocument {
    fn new(collection: Collection, id: Uuid, reason: &impl ToString) -> Self {
        Self {
            collection,
            id,
            reason: reason.to_string(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub directions: String,
    #[serde(default)]
    pub muscle_group: Option<String>,
    pub rest: u32,
}

impl From<domain::Exercise> for Exercise {
    fn from(value: domain::Exercise) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            directions: value.directions,
            muscle_group: value.muscle_group,
            rest: value.rest.into(),
        }
    }
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = InvalidDocument;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)
                .map_err(|err| InvalidDocument::new(Collection::Exercises, value.id, &err))?,
            directions: value.directions,
            muscle_group: value.muscle_group,
            rest: domain::Rest::minutes(value.rest),
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Workout {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub exercises: Vec<ExerciseSpec>,
}

impl From<domain::Workout> for Workout {
    fn from(value: domain::Workout) -> Self {
        Self {
            id: *value.id,
            name: value.name.to_string(),
            description: value.description,
            exercises: value.exercises.into_iter().map(ExerciseSpec::from).collect(),
        }
    }
}

impl TryFrom<Workout> for domain::Workout {
    type Error = InvalidDocument;

    fn try_from(value: Workout) -> Result<Self, Self::Error> {
        let invalid = |err: &dyn std::fmt::Display| {
            InvalidDocument::new(Collection::Workouts, value.id, &err.to_string())
        };
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name).map_err(|err| invalid(&err))?,
            description: value.description.clone(),
            exercises: value
                .exercises
                .iter()
                .map(|e| e.to_domain().map_err(|err| invalid(&err)))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseSpec {
    pub exercise_id: Uuid,
    pub sets: u32,
    pub reps: u32,
    pub rte: u8,
}

impl ExerciseSpec {
    fn to_domain(self) -> Result<domain::ExerciseSpec, ExerciseSpecError> {
        Ok(domain::ExerciseSpec {
            exercise_id: self.exercise_id.into(),
            sets: domain::Sets::new(self.sets)?,
            reps: domain::Reps::new(self.reps)?,
            rte: domain::RTE::new(self.rte)?,
        })
    }
}

impl From<domain::ExerciseSpec> for ExerciseSpec {
    fn from(value: domain::ExerciseSpec) -> Self {
        Self {
            exercise_id: *value.exercise_id,
            sets: value.sets.into(),
            reps: value.reps.into(),
            rte: value.rte.into(),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseSpecError {
    #[error(transparent)]
    InvalidSets(#[from] domain::SetsError),
    #[error(transparent)]
    InvalidReps(#[from] domain::RepsError),
    #[error(transparent)]
    InvalidRTE(#[from] domain::RTEError),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExerciseLog {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub weight: String,
    pub notes: String,
    pub created_ts: DateTime<Utc>,
    pub updated_ts: DateTime<Utc>,
}

impl From<domain::ExerciseLog> for ExerciseLog {
    fn from(value: domain::ExerciseLog) -> Self {
        Self {
            id: *value.id,
            exercise_id: *value.exercise_id,
            weight: value.weight,
            notes: value.notes,
            created_ts: value.created_ts,
            updated_ts: value.updated_ts,
        }
    }
}

impl From<ExerciseLog> for domain::ExerciseLog {
    fn from(value: ExerciseLog) -> Self {
        Self {
            id: value.id.into(),
            exercise_id: value.exercise_id.into(),
            weight: value.weight,
            notes: value.notes,
            created_ts: value.created_ts,
            updated_ts: value.updated_ts,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub notes: String,
    pub created_ts: DateTime<Utc>,
    pub updated_ts: DateTime<Utc>,
}

impl From<domain::WorkoutLog> for WorkoutLog {
    fn from(value: domain::WorkoutLog) -> Self {
        Self {
            id: *value.id,
            workout_id: *value.workout_id,
            notes: value.notes,
            created_ts: value.created_ts,
            updated_ts: value.updated_ts,
        }
    }
}

impl From<WorkoutLog> for domain::WorkoutLog {
    fn from(value: WorkoutLog) -> Self {
        Self {
            id: value.id.into(),
            workout_id: value.workout_id.into(),
            notes: value.notes,
            created_ts: value.created_ts,
            updated_ts: value.updated_ts,
        }
    }
}
