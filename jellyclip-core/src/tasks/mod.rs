mod error;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

pub use error::{TaskError, TaskResult};

/// Lifecycle of a background task. `Completed`, `Failed` and `Cancelled` are
/// terminal; a task never leaves a terminal state.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState<T> {
    Pending,
    Running,
    Completed(T),
    Failed(String),
    Cancelled,
}

impl<T> TaskState<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed(_) | TaskState::Failed(_) | TaskState::Cancelled
        )
    }

    pub fn label(&self) -> TaskStatus {
        match self {
            TaskState::Pending => TaskStatus::Pending,
            TaskState::Running => TaskStatus::Running,
            TaskState::Completed(_) => TaskStatus::Completed,
            TaskState::Failed(_) => TaskStatus::Failed,
            TaskState::Cancelled => TaskStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

struct TaskShared<T> {
    key: String,
    id: Uuid,
    started_at: DateTime<Utc>,
    state: watch::Sender<TaskState<T>>,
    finished_at: OnceLock<Instant>,
    abort: OnceLock<AbortHandle>,
}

impl<T> TaskShared<T> {
    fn mark_running(&self) {
        self.state.send_if_modified(|current| {
            if matches!(current, TaskState::Pending) {
                *current = TaskState::Running;
                true
            } else {
                false
            }
        });
    }

    /// Moves to a terminal state unless one was already reached.
    fn settle(&self, next: TaskState<T>) -> bool {
        let settled = self.state.send_if_modified(|current| {
            if current.is_terminal() {
                false
            } else {
                *current = next;
                true
            }
        });
        if settled {
            let _ = self.finished_at.set(Instant::now());
        }
        settled
    }

    fn cancel(&self) {
        if let Some(abort) = self.abort.get() {
            abort.abort();
        }
        self.settle(TaskState::Cancelled);
    }

    fn is_finished(&self) -> bool {
        self.state.borrow().is_terminal()
    }

    fn finished_for_at_least(&self, retention: Duration) -> bool {
        self.finished_at
            .get()
            .map(|finished| finished.elapsed() >= retention)
            .unwrap_or(false)
    }
}

/// Shared view of one background task. Clones refer to the same task.
pub struct TaskHandle<T> {
    shared: Arc<TaskShared<T>>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> PartialEq for TaskHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("key", &self.shared.key)
            .field("id", &self.shared.id)
            .field("status", &self.status())
            .finish()
    }
}

impl<T> TaskHandle<T> {
    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.shared.started_at
    }

    pub fn status(&self) -> TaskStatus {
        self.shared.state.borrow().label()
    }

    pub fn is_finished(&self) -> bool {
        self.shared.is_finished()
    }
}

impl<T: Clone> TaskHandle<T> {
    pub fn state(&self) -> TaskState<T> {
        self.shared.state.borrow().clone()
    }

    /// Waits for the task to reach a terminal state. Every caller observes
    /// the same outcome; the computation itself runs once.
    pub async fn wait(&self) -> TaskResult<T> {
        let mut receiver = self.shared.state.subscribe();
        let settled = match receiver.wait_for(TaskState::is_terminal).await {
            Ok(state) => state.clone(),
            Err(_) => TaskState::Cancelled,
        };
        let key = self.shared.key.clone();
        match settled {
            TaskState::Completed(value) => Ok(value),
            TaskState::Failed(message) => Err(TaskError::Failed { key, message }),
            TaskState::Pending | TaskState::Running | TaskState::Cancelled => {
                Err(TaskError::Cancelled { key })
            }
        }
    }
}

/// Owns at most one live background task per key.
///
/// Tasks are spawned onto the ambient Tokio runtime and outlive the caller
/// that started them. Finished tasks stay retrievable for `retention`, or
/// until a new task is started under the same key.
pub struct TaskRegistry<T> {
    tasks: Arc<Mutex<HashMap<String, TaskHandle<T>>>>,
    retention: Duration,
}

impl<T> Clone for TaskRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            retention: self.retention,
        }
    }
}

impl<T> fmt::Debug for TaskRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("tasks", &self.lock().len())
            .field("retention", &self.retention)
            .finish()
    }
}

impl<T> TaskRegistry<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(retention: Duration) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            retention,
        }
    }

    /// Returns the live task for `key`, or spawns `computation` as a new one.
    /// A suppressed duplicate's computation is dropped without being polled.
    pub fn start<F, E>(&self, key: impl Into<String>, computation: F) -> TaskHandle<T>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let key = key.into();
        let mut tasks = self.lock();
        if let Some(existing) = tasks.get(&key).filter(|handle| !handle.is_finished()) {
            warn!(key = %key, task_id = %existing.id(), "task already in progress, reusing it");
            return existing.clone();
        }
        let handle = spawn_task(key.clone(), computation);
        info!(key = %key, task_id = %handle.id(), "task started");
        tasks.insert(key, handle.clone());
        handle
    }

    /// Like [`TaskRegistry::start`], but refuses to attach to a live task.
    pub fn try_start<F, E>(&self, key: impl Into<String>, computation: F) -> TaskResult<TaskHandle<T>>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let key = key.into();
        let mut tasks = self.lock();
        if tasks.get(&key).is_some_and(|handle| !handle.is_finished()) {
            warn!(key = %key, "refusing to start a second live task");
            return Err(TaskError::AlreadyRunning { key });
        }
        let handle = spawn_task(key.clone(), computation);
        info!(key = %key, task_id = %handle.id(), "task started");
        tasks.insert(key, handle.clone());
        Ok(handle)
    }

    /// Aborts the live task for `key` and forgets it. Owned subprocesses are
    /// killed when the aborted computation is dropped.
    pub fn cancel(&self, key: &str) -> TaskResult<()> {
        let mut tasks = self.lock();
        let live = tasks.get(key).is_some_and(|handle| !handle.is_finished());
        if !live {
            warn!(key, "no live task to cancel");
            return Err(TaskError::NotFound {
                key: key.to_string(),
            });
        }
        if let Some(handle) = tasks.remove(key) {
            handle.shared.cancel();
            info!(key, task_id = %handle.id(), "task cancelled");
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> TaskResult<TaskHandle<T>> {
        let mut tasks = self.lock();
        let expired = tasks
            .get(key)
            .is_some_and(|handle| handle.shared.finished_for_at_least(self.retention));
        if expired {
            tasks.remove(key);
        }
        tasks.get(key).cloned().ok_or_else(|| TaskError::NotFound {
            key: key.to_string(),
        })
    }

    /// Drops finished tasks older than the retention window.
    pub fn evict_expired(&self) -> usize {
        let mut tasks = self.lock();
        let before = tasks.len();
        tasks.retain(|_, handle| !handle.shared.finished_for_at_least(self.retention));
        before - tasks.len()
    }

    pub fn live_keys(&self) -> Vec<String> {
        let tasks = self.lock();
        let mut keys: Vec<String> = tasks
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

impl<T> TaskRegistry<T> {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, TaskHandle<T>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn spawn_task<T, F, E>(key: String, computation: F) -> TaskHandle<T>
where
    T: Clone + Send + Sync + 'static,
    F: Future<Output = Result<T, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let (state, _) = watch::channel(TaskState::Pending);
    let shared = Arc::new(TaskShared {
        key,
        id: Uuid::new_v4(),
        started_at: Utc::now(),
        state,
        finished_at: OnceLock::new(),
        abort: OnceLock::new(),
    });
    let task = Arc::clone(&shared);
    let join = tokio::spawn(async move {
        task.mark_running();
        let next = match AssertUnwindSafe(computation).catch_unwind().await {
            Ok(Ok(value)) => {
                info!(key = %task.key, task_id = %task.id, "task completed");
                TaskState::Completed(value)
            }
            Ok(Err(err)) => {
                warn!(key = %task.key, task_id = %task.id, error = %err, "task failed");
                TaskState::Failed(err.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(key = %task.key, task_id = %task.id, panic = %message, "task panicked");
                TaskState::Failed(format!("task panicked: {message}"))
            }
        };
        task.settle(next);
    });
    let _ = shared.abort.set(join.abort_handle());
    TaskHandle { shared }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
