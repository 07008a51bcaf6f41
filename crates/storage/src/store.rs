use std::{
    ops::Range,
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use liftlog_domain as domain;
use log::trace;
use uuid::Uuid;

use crate::document::{Documents, Exercise, ExerciseLog, Workout, WorkoutLog};

/// Loads and persists the complete set of documents.
pub trait Backend {
    fn load(&self) -> Result<Documents, domain::StorageError>;
    fn save(&self, documents: &Documents) -> Result<(), domain::StorageError>;

    /// Runs `f` while no other user of the same backing storage can access it.
    fn exclusive<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<domain::StorageError>,
    {
        f()
    }
}

/// Document store on top of a [`Backend`].
///
/// Every operation loads the documents from the backend. Operations are executed one at a
/// time and inside [`Backend::exclusive`], so a read-modify-write never interleaves with
/// another operation on the same backing storage.
pub struct DocumentStore<B> {
    backend: B,
    lock: Mutex<()>,
}

impl<B: Backend> DocumentStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read<T, E>(&self, f: impl FnOnce(&Documents) -> Result<T, E>) -> Result<T, E>
    where
        E: From<domain::StorageError>,
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.backend.exclusive(|| {
            let documents = self.backend.load()?;
            f(&documents)
        })
    }

    fn write<T, E>(&self, f: impl FnOnce(&mut Documents) -> Result<T, E>) -> Result<T, E>
    where
        E: From<domain::StorageError>,
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.backend.exclusive(|| {
            let mut documents = self.backend.load()?;
            let result = f(&mut documents)?;
            self.backend.save(&documents)?;
            Ok(result)
        })
    }
}

fn invalid(err: impl std::error::Error + Send + Sync + 'static) -> domain::StorageError {
    domain::StorageError::Other(Box::new(err))
}

impl<B: Backend> domain::ExerciseRepository for DocumentStore<B> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        self.read(|documents| {
            documents
                .exercises
                .iter()
                .cloned()
                .map(|e| domain::Exercise::try_from(e).map_err(|err| invalid(err).into()))
                .collect()
        })
    }

    async fn read_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::Exercise, domain::ReadError> {
        self.read(|documents| {
            let exercise = documents
                .exercises
                .iter()
                .find(|e| e.id == *id)
                .ok_or(domain::ReadError::NotFound)?;
            Ok(domain::Exercise::try_from(exercise.clone()).map_err(invalid)?)
        })
    }

    async fn read_exercise_by_name(
        &self,
        name: &domain::Name,
    ) -> Result<domain::Exercise, domain::ReadError> {
        self.read(|documents| {
            let exercise = documents
                .exercises
                .iter()
                .find(|e| e.name == name.as_str())
                .ok_or(domain::ReadError::NotFound)?;
            Ok(domain::Exercise::try_from(exercise.clone()).map_err(invalid)?)
        })
    }

    async fn create_exercise(
        &self,
        name: domain::Name,
        directions: String,
        muscle_group: Option<String>,
        rest: domain::Rest,
    ) -> Result<domain::Exercise, domain::CreateError> {
        self.write(|documents| {
            if documents.exercises.iter().any(|e| e.name == name.as_str()) {
                return Err(domain::CreateError::Conflict);
            }
            let exercise = domain::Exercise {
                id: Uuid::new_v4().into(),
                name,
                directions,
                muscle_group,
                rest,
            };
            documents.exercises.push(Exercise::from(exercise.clone()));
            trace!("created exercise {}", exercise.id);
            Ok(exercise)
        })
    }
}

impl<B: Backend> domain::WorkoutRepository for DocumentStore<B> {
    async fn read_workouts(&self) -> Result<Vec<domain::Workout>, domain::ReadError> {
        self.read(|documents| {
            documents
                .workouts
                .iter()
                .cloned()
                .map(|w| domain::Workout::try_from(w).map_err(|err| invalid(err).into()))
                .collect()
        })
    }

    async fn read_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::Workout, domain::ReadError> {
        self.read(|documents| {
            let workout = documents
                .workouts
                .iter()
                .find(|w| w.id == *id)
                .ok_or(domain::ReadError::NotFound)?;
            Ok(domain::Workout::try_from(workout.clone()).map_err(invalid)?)
        })
    }

    async fn read_workout_by_name(
        &self,
        name: &domain::Name,
    ) -> Result<domain::Workout, domain::ReadError> {
        self.read(|documents| {
            let workout = documents
                .workouts
                .iter()
                .find(|w| w.name == name.as_str())
                .ok_or(domain::ReadError::NotFound)?;
            Ok(domain::Workout::try_from(workout.clone()).map_err(invalid)?)
        })
    }

    async fn create_workout(
        &self,
        name: domain::Name,
        description: String,
        exercises: Vec<domain::ExerciseSpec>,
    ) -> Result<domain::Workout, domain::CreateError> {
        self.write(|documents| {
            if documents.workouts.iter().any(|w| w.name == name.as_str()) {
                return Err(domain::CreateError::Conflict);
            }
            let workout = domain::Workout {
                id: Uuid::new_v4().into(),
                name,
                description,
                exercises,
            };
            documents.workouts.push(Workout::from(workout.clone()));
            trace!("created workout {}", workout.id);
            Ok(workout)
        })
    }
}

impl<B: Backend> domain::ExerciseLogRepository for DocumentStore<B> {
    async fn read_exercise_logs(
        &self,
        exercise_id: domain::ExerciseID,
    ) -> Result<Vec<domain::ExerciseLog>, domain::ReadError> {
        self.read(|documents| {
            let mut logs = documents
                .exercise_log
                .iter()
                .filter(|l| l.exercise_id == *exercise_id)
                .cloned()
                .map(domain::ExerciseLog::from)
                .collect::<Vec<_>>();
            logs.sort_by_key(|l| l.created_ts);
            Ok(logs)
        })
    }

    async fn read_latest_exercise_log(
        &self,
        exercise_id: domain::ExerciseID,
    ) -> Result<Option<domain::ExerciseLog>, domain::ReadError> {
        self.read(|documents| {
            Ok(documents
                .exercise_log
                .iter()
                .filter(|l| l.exercise_id == *exercise_id)
                .max_by_key(|l| l.updated_ts)
                .cloned()
                .map(domain::ExerciseLog::from))
        })
    }

    async fn upsert_exercise_log(
        &self,
        exercise_id: domain::ExerciseID,
        anchor: domain::DayAnchor,
        window: Range<DateTime<Utc>>,
        weight: String,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<domain::ExerciseLog, domain::UpdateError> {
        self.write(|documents| {
            let existing = documents.exercise_log.iter_mut().find(|l| {
                let log = domain::ExerciseLog::from((*l).clone());
                log.exercise_id == exercise_id && window.contains(&log.timestamp(anchor))
            });
            let log = if let Some(log) = existing {
                log.weight = weight;
                log.notes = notes;
                log.updated_ts = now;
                trace!("updated exercise log {}", log.id);
                log.clone()
            } else {
                let log = ExerciseLog {
                    id: Uuid::new_v4(),
                    exercise_id: *exercise_id,
                    weight,
                    notes,
                    created_ts: now,
                    updated_ts: now,
                };
                documents.exercise_log.push(log.clone());
                trace!("created exercise log {}", log.id);
                log
            };
            Ok(domain::ExerciseLog::from(log))
        })
    }
}

impl<B: Backend> domain::WorkoutLogRepository for DocumentStore<B> {
    async fn read_workout_logs(
        &self,
        workout_id: domain::WorkoutID,
    ) -> Result<Vec<domain::WorkoutLog>, domain::ReadError> {
        self.read(|documents| {
            let mut logs = documents
                .workout_log
                .iter()
                .filter(|l| l.workout_id == *workout_id)
                .cloned()
                .map(domain::WorkoutLog::from)
                .collect::<Vec<_>>();
            logs.sort_by_key(|l| l.created_ts);
            Ok(logs)
        })
    }

    async fn create_workout_log(
        &self,
        workout_id: domain::WorkoutID,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<domain::WorkoutLog, domain::CreateError> {
        self.write(|documents| {
            let log = domain::WorkoutLog {
                id: Uuid::new_v4().into(),
                workout_id,
                notes,
                created_ts: now,
                updated_ts: now,
            };
            documents.workout_log.push(WorkoutLog::from(log.clone()));
            trace!("created workout log {}", log.id);
            Ok(log)
        })
    }
}
