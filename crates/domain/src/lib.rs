#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod exercise;
mod exercise_log;
mod lock;
mod name;
mod service;
mod session;
mod workout;
mod workout_log;

pub use error::*;
pub use exercise::*;
pub use exercise_log::*;
pub use lock::*;
pub use name::*;
pub use service::*;
pub use session::*;
pub use workout::*;
pub use workout_log::*;
