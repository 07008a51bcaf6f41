use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, warn};

use crate::{
    CreateError, DayAnchor, Exercise, ExerciseID, ExerciseLog, ExerciseLogRepository,
    ExerciseLogService, ExerciseRepository, ExerciseService, ExerciseSpec, KeyedLock, Name,
    PlannedExercise, PreviousLog, ReadError, Rest, SessionPlan, SessionService, UpdateError,
    Workout, WorkoutID, WorkoutLog, WorkoutLogRepository, WorkoutLogService, WorkoutRepository,
    WorkoutService, day_window,
};

pub struct Service<R> {
    repository: R,
    day_anchor: DayAnchor,
    day_locks: KeyedLock<(ExerciseID, NaiveDate)>,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            day_anchor: DayAnchor::default(),
            day_locks: KeyedLock::new(),
        }
    }

    #[must_use]
    pub fn with_day_anchor(mut self, day_anchor: DayAnchor) -> Self {
        self.day_anchor = day_anchor;
        self
    }

}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal $(, $quiet: pat)*) => {{
        let result = $func.await;
        if let Err(ref err) = result {
            match err {
                $error::Storage(crate::StorageError::NoConnection) $(| $quiet)* => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            }
        }
        result
    }};
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn get_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError> {
        log_on_error!(
            self.repository.read_exercise(id),
            ReadError,
            "get",
            "exercise",
            ReadError::NotFound
        )
    }

    async fn get_exercise_by_name(&self, name: &Name) -> Result<Exercise, ReadError> {
        log_on_error!(
            self.repository.read_exercise_by_name(name),
            ReadError,
            "get",
            "exercise",
            ReadError::NotFound
        )
    }

    async fn create_exercise(
        &self,
        name: Name,
        directions: String,
        muscle_group: Option<String>,
        rest: Rest,
    ) -> Result<Exercise, CreateError> {
        log_on_error!(
            self.repository
                .create_exercise(name, directions, muscle_group, rest),
            CreateError,
            "create",
            "exercise",
            CreateError::Conflict
        )
    }
}

impl<R: WorkoutRepository> WorkoutService for Service<R> {
    async fn get_workouts(&self) -> Result<Vec<Workout>, ReadError> {
        log_on_error!(
            self.repository.read_workouts(),
            ReadError,
            "get",
            "workouts"
        )
    }

    async fn get_workout(&self, id: WorkoutID) -> Result<Workout, ReadError> {
        log_on_error!(
            self.repository.read_workout(id),
            ReadError,
            "get",
            "workout",
            ReadError::NotFound
        )
    }

    async fn get_workout_by_name(&self, name: &Name) -> Result<Workout, ReadError> {
        log_on_error!(
            self.repository.read_workout_by_name(name),
            ReadError,
            "get",
            "workout",
            ReadError::NotFound
        )
    }

    async fn create_workout(
        &self,
        name: Name,
        description: String,
        exercises: Vec<ExerciseSpec>,
    ) -> Result<Workout, CreateError> {
        log_on_error!(
            self.repository.create_workout(name, description, exercises),
            CreateError,
            "create",
            "workout",
            CreateError::Conflict
        )
    }
}

impl<R: ExerciseLogRepository> ExerciseLogService for Service<R> {
    async fn get_previous_log(&self, exercise_id: ExerciseID) -> Result<PreviousLog, ReadError> {
        let latest = log_on_error!(
            self.repository.read_latest_exercise_log(exercise_id),
            ReadError,
            "get",
            "previous exercise log"
        )?;
        Ok(latest.map(PreviousLog::from).unwrap_or_default())
    }

    async fn save_exercise_log(
        &self,
        exercise_id: ExerciseID,
        weight: String,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<ExerciseLog, UpdateError> {
        debug!("saving exercise log of exercise {exercise_id}");
        log_on_error!(
            self.day_locks.run(
                (exercise_id, now.date_naive()),
                self.repository.upsert_exercise_log(
                    exercise_id,
                    self.day_anchor,
                    day_window(now),
                    weight,
                    notes,
                    now,
                )
            ),
            UpdateError,
            "save",
            "exercise log"
        )
    }

    async fn get_exercise_logs(
        &self,
        exercise_id: ExerciseID,
    ) -> Result<Vec<ExerciseLog>, ReadError> {
        log_on_error!(
            self.repository.read_exercise_logs(exercise_id),
            ReadError,
            "get",
            "exercise logs"
        )
    }
}

impl<R: WorkoutLogRepository> WorkoutLogService for Service<R> {
    async fn log_workout(
        &self,
        workout_id: WorkoutID,
        notes: String,
        now: DateTime<Utc>,
    ) -> Result<WorkoutLog, CreateError> {
        log_on_error!(
            self.repository.create_workout_log(workout_id, notes, now),
            CreateError,
            "create",
            "workout log"
        )
    }

    async fn get_workout_logs(&self, workout_id: WorkoutID) -> Result<Vec<WorkoutLog>, ReadError> {
        log_on_error!(
            self.repository.read_workout_logs(workout_id),
            ReadError,
            "get",
            "workout logs"
        )
    }
}

impl<R> SessionService for Service<R>
where
    R: WorkoutRepository + ExerciseRepository + ExerciseLogRepository,
{
    async fn get_session_plan(&self, workout_name: &Name) -> Result<SessionPlan, ReadError> {
        let workout = self.get_workout_by_name(workout_name).await?;
        let mut exercises = Vec::with_capacity(workout.exercises.len());
        for spec in &workout.exercises {
            let exercise = match self.get_exercise(spec.exercise_id).await {
                Ok(exercise) => Some(exercise),
                Err(ReadError::NotFound) => {
                    warn!(
                        "exercise {} of workout {} not found",
                        spec.exercise_id, workout.name
                    );
                    None
                }
                Err(err) => return Err(err),
            };
            let previous = if exercise.is_some() {
                self.get_previous_log(spec.exercise_id).await?
            } else {
                PreviousLog::default()
            };
            exercises.push(PlannedExercise {
                spec: *spec,
                exercise,
                previous,
            });
        }
        Ok(SessionPlan { workout, exercises })
    }
}
