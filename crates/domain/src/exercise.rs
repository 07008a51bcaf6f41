use derive_more::{Deref, Display, Into};
use uuid::Uuid;

use crate::{CreateError, Name, ReadError};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn get_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError>;
    async fn get_exercise_by_name(&self, name: &Name) -> Result<Exercise, ReadError>;
    async fn create_exercise(
        &self,
        name: Name,
        directions: String,
        muscle_group: Option<String>,
        rest: Rest,
    ) -> Result<Exercise, CreateError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn read_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError>;
    async fn read_exercise_by_name(&self, name: &Name) -> Result<Exercise, ReadError>;
    async fn create_exercise(
        &self,
        name: Name,
        directions: String,
        muscle_group: Option<String>,
        rest: Rest,
    ) -> Result<Exercise, CreateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub directions: String,
    pub muscle_group: Option<String>,
    pub rest: Rest,
}

#[derive(Deref, Debug, Display, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Rest between sets in whole minutes.
#[derive(Debug, Display, Default, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rest(u32);

impl Rest {
    #[must_use]
    pub const fn minutes(value: u32) -> Self {
        Self(value)
    }
}

impl TryFrom<&str> for Rest {
    type Error = RestError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Ok(Rest(parsed_value)),
            Err(_) => Err(RestError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RestError {
    #[error("Rest must be a non-negative number of minutes")]
    ParseError,
}
