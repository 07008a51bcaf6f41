use std::io::Write;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use liftlog_domain::{
    CreateError, ExerciseLogService, ExerciseService, ExerciseSpec, Name, ReadError, SessionPlan,
    SessionService, WorkoutLogService, WorkoutService,
};
use log::info;

use crate::cli::{AddExercise, AddWorkout, Command, ExerciseCommand, LogCommand, WorkoutCommand};

/// Executes a command and writes the result to `out`.
pub async fn run<S>(
    service: &S,
    command: Command,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    S: ExerciseService + WorkoutService + ExerciseLogService + WorkoutLogService + SessionService,
{
    match command {
        Command::Exercise(ExerciseCommand::Add(add)) => add_exercise(service, add, out).await,
        Command::Exercise(ExerciseCommand::List) => list_exercises(service, out).await,
        Command::Workout(WorkoutCommand::Add(add)) => add_workout(service, add, out).await,
        Command::Workout(WorkoutCommand::List) => list_workouts(service, out).await,
        Command::Workout(WorkoutCommand::Show { name }) => show_workout(service, &name, out).await,
        Command::Log(LogCommand::Exercise {
            name,
            weight,
            notes,
        }) => log_exercise(service, &name, weight, notes, now, out).await,
        Command::Log(LogCommand::Workout { name, notes }) => {
            log_workout(service, &name, notes, now, out).await
        }
        Command::History { name } => history(service, &name, out).await,
    }
}

async fn add_exercise(
    service: &impl ExerciseService,
    add: AddExercise,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let name = Name::new(&add.name)?;
    let exercise = match service
        .create_exercise(name, add.directions, add.muscle_group, add.rest)
        .await
    {
        Err(CreateError::Conflict) => bail!("exercise \"{}\" already exists", add.name),
        result => result?,
    };
    info!("created exercise {}", exercise.id);
    writeln!(out, "Added exercise {}", exercise.name)?;
    Ok(())
}

async fn list_exercises(service: &impl ExerciseService, out: &mut impl Write) -> anyhow::Result<()> {
    let exercises = service.get_exercises().await?;
    if exercises.is_empty() {
        writeln!(out, "No exercises")?;
    }
    for exercise in exercises {
        match exercise.muscle_group {
            Some(muscle_group) => writeln!(
                out,
                "{} ({muscle_group}), rest {} min",
                exercise.name, exercise.rest
            )?,
            None => writeln!(out, "{}, rest {} min", exercise.name, exercise.rest)?,
        }
    }
    Ok(())
}

async fn add_workout<S>(service: &S, add: AddWorkout, out: &mut impl Write) -> anyhow::Result<()>
where
    S: ExerciseService + WorkoutService,
{
    let name = Name::new(&add.name)?;
    let mut exercises = Vec::with_capacity(add.exercises.len());
    for arg in add.exercises {
        let exercise = service
            .get_exercise_by_name(&arg.name)
            .await
            .with_context(|| format!("failed to find exercise \"{}\"", arg.name))?;
        exercises.push(ExerciseSpec {
            exercise_id: exercise.id,
            sets: arg.sets,
            reps: arg.reps,
            rte: arg.rte,
        });
    }
    let workout = match service
        .create_workout(name, add.description, exercises)
        .await
    {
        Err(CreateError::Conflict) => bail!("workout \"{}\" already exists", add.name),
        result => result?,
    };
    info!("created workout {}", workout.id);
    writeln!(
        out,
        "Added workout {} with {} exercises",
        workout.name,
        workout.exercises.len()
    )?;
    Ok(())
}

async fn list_workouts(service: &impl WorkoutService, out: &mut impl Write) -> anyhow::Result<()> {
    let workouts = service.get_workouts().await?;
    if workouts.is_empty() {
        writeln!(out, "No workouts")?;
    }
    for workout in workouts {
        writeln!(
            out,
            "{}: {} exercises, {} sets",
            workout.name,
            workout.exercises.len(),
            workout.num_sets()
        )?;
    }
    Ok(())
}

async fn show_workout(
    service: &impl SessionService,
    name: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let name = Name::new(name)?;
    match service.get_session_plan(&name).await {
        Ok(plan) => write_plan(&plan, out)?,
        Err(ReadError::NotFound) => writeln!(out, "No workout named {name}")?,
        Err(err) => {
            return Err(err).with_context(|| format!("failed to load workout \"{name}\""));
        }
    }
    Ok(())
}

fn write_plan(plan: &SessionPlan, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{}", plan.workout.name)?;
    if !plan.workout.description.is_empty() {
        writeln!(out, "{}", plan.workout.description)?;
    }
    for planned in &plan.exercises {
        writeln!(out)?;
        let Some(exercise) = &planned.exercise else {
            writeln!(
                out,
                "Unknown exercise {}: {}",
                planned.spec.exercise_id, planned.spec
            )?;
            continue;
        };
        writeln!(
            out,
            "{}: {}, rest {} min",
            exercise.name, planned.spec, exercise.rest
        )?;
        if !exercise.directions.is_empty() {
            writeln!(out, "  {}", exercise.directions)?;
        }
        writeln!(out, "  Previous weight: {}", planned.previous.weight)?;
        writeln!(out, "  Previous notes: {}", planned.previous.notes)?;
    }
    Ok(())
}

async fn log_exercise<S>(
    service: &S,
    name: &str,
    weight: String,
    notes: String,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    S: ExerciseService + ExerciseLogService,
{
    let name = Name::new(name)?;
    let exercise = service
        .get_exercise_by_name(&name)
        .await
        .with_context(|| format!("failed to find exercise \"{name}\""))?;
    let log = service
        .save_exercise_log(exercise.id, weight, notes, now)
        .await?;
    writeln!(
        out,
        "Saved {} on {}: {}",
        exercise.name,
        log.date(),
        log.weight
    )?;
    Ok(())
}

async fn log_workout<S>(
    service: &S,
    name: &str,
    notes: String,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    S: WorkoutService + WorkoutLogService,
{
    let name = Name::new(name)?;
    let workout = service
        .get_workout_by_name(&name)
        .await
        .with_context(|| format!("failed to find workout \"{name}\""))?;
    let log = service.log_workout(workout.id, notes, now).await?;
    writeln!(
        out,
        "Logged {} on {}",
        workout.name,
        log.created_ts.date_naive()
    )?;
    Ok(())
}

async fn history<S>(service: &S, name: &str, out: &mut impl Write) -> anyhow::Result<()>
where
    S: ExerciseService + ExerciseLogService,
{
    let name = Name::new(name)?;
    let exercise = service
        .get_exercise_by_name(&name)
        .await
        .with_context(|| format!("failed to find exercise \"{name}\""))?;
    let logs = service.get_exercise_logs(exercise.id).await?;
    if logs.is_empty() {
        writeln!(out, "No entries for {}", exercise.name)?;
    }
    for log in logs {
        if log.notes.is_empty() {
            writeln!(out, "{}  {}", log.date(), log.weight)?;
        } else {
            writeln!(out, "{}  {}  {}", log.date(), log.weight, log.notes)?;
        }
    }
    Ok(())
}
