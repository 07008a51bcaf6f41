use crate::{Exercise, ExerciseSpec, Name, PreviousLog, ReadError, Workout};

#[allow(async_fn_in_trait)]
pub trait SessionService {
    /// Everything needed to present a workout for logging.
    ///
    /// Exercises which cannot be resolved are kept in the plan without details.
    async fn get_session_plan(&self, workout_name: &Name) -> Result<SessionPlan, ReadError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub workout: Workout,
    pub exercises: Vec<PlannedExercise>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedExercise {
    pub spec: ExerciseSpec,
    pub exercise: Option<Exercise>,
    pub previous: PreviousLog,
}
