use std::sync::{Mutex, PoisonError};

use liftlog_domain as domain;

use crate::{Backend, DocumentStore, document::Documents};

pub type MemoryStore = DocumentStore<Memory>;

/// Volatile backend, mainly for tests and dry runs.
#[derive(Default)]
pub struct Memory {
    documents: Mutex<Documents>,
}

impl Memory {
    #[must_use]
    pub fn new(documents: Documents) -> Self {
        Self {
            documents: Mutex::new(documents),
        }
    }

    #[must_use]
    pub fn documents(&self) -> Documents {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Backend for Memory {
    fn load(&self) -> Result<Documents, domain::StorageError> {
        Ok(self.documents())
    }

    fn save(&self, documents: &Documents) -> Result<(), domain::StorageError> {
        *self.documents.lock().unwrap_or_else(PoisonError::into_inner) = documents.clone();
        Ok(())
    }
}

impl MemoryStore {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Memory::default())
    }
}
