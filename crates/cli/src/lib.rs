#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod command;
pub mod log;
pub mod settings;
