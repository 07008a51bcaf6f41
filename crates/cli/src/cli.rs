use std::{path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand};
use liftlog_domain::{
    Name, NameError, RTE, RTEError, Reps, RepsError, Rest, RestError, Sets, SetsError,
};

#[derive(Parser, Debug)]
#[command(name = "liftlog")]
#[command(about = "Strength training log")]
pub struct Cli {
    /// Path of the JSON store
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Path of the settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase the log level (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Manage exercises
    #[command(subcommand)]
    Exercise(ExerciseCommand),
    /// Manage workouts
    #[command(subcommand)]
    Workout(WorkoutCommand),
    /// Record a performance
    #[command(subcommand)]
    Log(LogCommand),
    /// Show all log entries of an exercise
    History {
        /// Exercise name
        name: String,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ExerciseCommand {
    /// Add an exercise
    Add(AddExercise),
    /// List all exercises
    List,
}

#[derive(Args, Debug, PartialEq)]
pub struct AddExercise {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub directions: String,
    #[arg(long)]
    pub muscle_group: Option<String>,
    /// Rest between sets in minutes
    #[arg(long, default_value = "0", value_parser = parse_rest)]
    pub rest: Rest,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum WorkoutCommand {
    /// Add a workout
    Add(AddWorkout),
    /// List all workouts
    List,
    /// Show a workout with the previous performance of each exercise
    Show {
        /// Workout name
        name: String,
    },
}

#[derive(Args, Debug, PartialEq)]
pub struct AddWorkout {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Exercise prescription, can be given multiple times
    #[arg(long = "exercise", value_name = "NAME:SETS:REPS:RTE")]
    pub exercises: Vec<ExerciseArg>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum LogCommand {
    /// Save today's weight and notes of an exercise
    Exercise {
        /// Exercise name
        name: String,
        #[arg(long)]
        weight: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Record the completion of a workout
    Workout {
        /// Workout name
        name: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

fn parse_rest(value: &str) -> Result<Rest, RestError> {
    Rest::try_from(value)
}

/// An exercise prescription referring to the exercise by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseArg {
    pub name: Name,
    pub sets: Sets,
    pub reps: Reps,
    pub rte: RTE,
}

impl FromStr for ExerciseArg {
    type Err = ExerciseArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(4, ':');
        let (Some(rte), Some(reps), Some(sets), Some(name)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ExerciseArgError::Format);
        };
        Ok(Self {
            name: Name::new(name)?,
            sets: Sets::try_from(sets)?,
            reps: Reps::try_from(reps)?,
            rte: RTE::try_from(rte)?,
        })
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseArgError {
    #[error("expected NAME:SETS:REPS:RTE")]
    Format,
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Sets(#[from] SetsError),
    #[error(transparent)]
    Reps(#[from] RepsError),
    #[error(transparent)]
    RTE(#[from] RTEError),
}
