use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use liftlog_domain as domain;
use log::debug;
use tempfile::NamedTempFile;

use crate::{Backend, DocumentStore, document::Documents};

pub type JsonFileStore = DocumentStore<JsonFile>;

/// Backend keeping all collections in a single JSON file.
///
/// A missing file is an empty store. The directory containing the file must exist. Every
/// operation holds an exclusive lock on `<file>.lock`, which serializes stores of different
/// processes using the same file. New content is written to a unique temporary file in the
/// same directory and renamed over the old one.
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Backend for JsonFile {
    fn load(&self) -> Result<Documents, domain::StorageError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist, starting empty", self.path.display());
                return Ok(Documents::default());
            }
            Err(err) => return Err(other(err)),
        };
        serde_json::from_slice(&content).map_err(other)
    }

    fn save(&self, documents: &Documents) -> Result<(), domain::StorageError> {
        let content = serde_json::to_vec_pretty(documents).map_err(other)?;
        let mut file = NamedTempFile::new_in(self.directory()).map_err(other)?;
        file.write_all(&content).map_err(other)?;
        file.persist(&self.path).map_err(|err| other(err.error))?;
        Ok(())
    }

    fn exclusive<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<domain::StorageError>,
    {
        let file = match OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
        {
            Ok(file) => file,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
                ) =>
            {
                debug!("cannot access {}: {err}", self.directory().display());
                return Err(domain::StorageError::NoConnection.into());
            }
            Err(err) => return Err(other(err).into()),
        };
        let mut lock = fd_lock::RwLock::new(file);
        let _guard = lock.write().map_err(other)?;
        f()
    }
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFile::new(path))
    }
}

fn other(err: impl std::error::Error + Send + Sync + 'static) -> domain::StorageError {
    domain::StorageError::Other(Box::new(err))
}

#[cfg(test)]
mod tests {
    use std::{sync::Barrier, thread};

    use chrono::{DateTime, Days, TimeZone, Utc};
    use liftlog_domain::{
        DayAnchor, ExerciseID, ExerciseLogRepository, ExerciseLogService, ExerciseRepository,
        Service, WorkoutRepository, day_window,
    };
    use pretty_assertions::assert_eq;

    use crate::tests::data::EXERCISE;

    use super::*;

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("liftlog.json"));

        assert!(store.read_exercises().await.unwrap().is_empty());
        assert!(!store.backend().path().exists());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftlog.json");

        let exercise = {
            let store = JsonFileStore::open(&path);
            store
                .create_exercise(
                    EXERCISE.name.clone(),
                    EXERCISE.directions.clone(),
                    EXERCISE.muscle_group.clone(),
                    EXERCISE.rest,
                )
                .await
                .unwrap()
        };

        let store = JsonFileStore::open(&path);
        assert_eq!(store.read_exercises().await.unwrap(), vec![exercise]);
        assert_eq!(store.backend().load().unwrap().exercises.len(), 1);
        assert_eq!(
            file_names(dir.path()),
            vec!["liftlog.json".to_string(), "liftlog.json.lock".to_string()]
        );
    }

    #[tokio::test]
    async fn test_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftlog.json");
        let store = JsonFileStore::open(&path);
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();

        store
            .upsert_exercise_log(
                EXERCISE.id,
                DayAnchor::Created,
                day_window(now),
                "135".to_string(),
                "felt heavy".to_string(),
                now,
            )
            .await
            .unwrap();

        let content: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(content["exercises"], serde_json::json!([]));
        assert_eq!(content["workouts"], serde_json::json!([]));
        assert_eq!(content["workout_log"], serde_json::json!([]));
        assert_eq!(
            content["exercise_log"][0]["exercise_id"],
            serde_json::json!(EXERCISE.id.to_string())
        );
        assert_eq!(
            content["exercise_log"][0]["created_ts"],
            serde_json::json!("2024-01-01T10:00:00Z")
        );
    }

    #[tokio::test]
    async fn test_upsert_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftlog.json");
        let service = Service::new(JsonFileStore::open(&path));
        let at = |h| Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap();

        service
            .save_exercise_log(EXERCISE.id, "135".to_string(), "felt heavy".to_string(), at(10))
            .await
            .unwrap();
        service
            .save_exercise_log(EXERCISE.id, "140".to_string(), "better".to_string(), at(15))
            .await
            .unwrap();

        let reopened = JsonFileStore::open(&path);
        let logs = reopened.read_exercise_logs(EXERCISE.id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].weight, "140");
        assert_eq!(logs[0].created_ts, at(10));
        assert_eq!(logs[0].updated_ts, at(15));
    }

    #[tokio::test]
    async fn test_missing_directory_is_no_connection() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("missing").join("liftlog.json"));

        assert!(matches!(
            store
                .create_workout(EXERCISE.name.clone(), String::new(), vec![])
                .await,
            Err(domain::CreateError::Storage(domain::StorageError::NoConnection))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftlog.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::open(&path);

        assert!(matches!(
            store.read_workouts().await,
            Err(domain::ReadError::Storage(domain::StorageError::Other(_)))
        ));
    }

    #[test]
    fn test_failed_replace_is_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftlog.json");
        fs::create_dir(&path).unwrap();
        let store = JsonFileStore::open(&path);

        assert!(matches!(
            store.backend().save(&Documents::default()),
            Err(domain::StorageError::Other(_))
        ));
        assert_eq!(file_names(dir.path()), vec!["liftlog.json".to_string()]);
    }

    #[test]
    fn test_lock_path() {
        assert_eq!(
            JsonFile::new("/data/liftlog.json").lock_path(),
            PathBuf::from("/data/liftlog.json.lock")
        );
    }

    #[test]
    fn test_concurrent_stores_on_same_file() {
        const DAYS: u64 = 50;
        const SHARED: u128 = 3;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftlog.json");
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let day = |n: u64| -> DateTime<Utc> { start.checked_add_days(Days::new(n)).unwrap() };
        let barrier = Barrier::new(2);

        thread::scope(|scope| {
            for own in [1_u128, 2] {
                let (path, barrier) = (&path, &barrier);
                scope.spawn(move || {
                    let runtime = tokio::runtime::Builder::new_current_thread()
                        .build()
                        .unwrap();
                    let service = Service::new(JsonFileStore::open(path));
                    barrier.wait();
                    runtime.block_on(async {
                        for n in 0..DAYS {
                            for exercise_id in [own, SHARED] {
                                service
                                    .save_exercise_log(
                                        ExerciseID::from(exercise_id),
                                        own.to_string(),
                                        String::new(),
                                        day(n),
                                    )
                                    .await
                                    .unwrap();
                            }
                        }
                    });
                });
            }
        });

        let documents = JsonFileStore::open(&path).backend().load().unwrap();
        for exercise_id in [1_u128, 2, SHARED] {
            let id = *ExerciseID::from(exercise_id);
            assert_eq!(
                documents
                    .exercise_log
                    .iter()
                    .filter(|l| l.exercise_id == id)
                    .count(),
                usize::try_from(DAYS).unwrap(),
                "exercise {exercise_id}"
            );
        }
        assert_eq!(
            file_names(dir.path()),
            vec!["liftlog.json".to_string(), "liftlog.json.lock".to_string()]
        );
    }
}
