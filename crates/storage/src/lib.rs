#![warn(clippy::pedantic)]

pub mod document;
pub mod json_file;
pub mod memory;
mod store;

pub use json_file::{JsonFile, JsonFileStore};
pub use memory::{Memory, MemoryStore};
pub use store::{Backend, DocumentStore};
