use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Priority, Task, TaskInput, TaskSnapshot};
use crate::storage::{SnapshotStore, StorageError};

/// Filters for [`TaskRepository::list`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub sort_by_created: bool,
}

struct TaskCollection {
    tasks: Vec<Task>,
    next_id: u64,
}

/// Owns the task list and flushes the whole list after every mutation
pub struct TaskRepository {
    inner: Mutex<TaskCollection>,
    store: Arc<dyn SnapshotStore<TaskSnapshot>>,
}

impl TaskRepository {
    /// Load the persisted snapshot (if any) from `store`
    pub async fn load(
        store: Arc<dyn SnapshotStore<TaskSnapshot>>,
    ) -> std::result::Result<Self, StorageError> {
        let tasks = store.load().await?.unwrap_or_default().tasks;
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;

        tracing::info!("Loaded {} tasks (next id {})", tasks.len(), next_id);

        Ok(Self {
            inner: Mutex::new(TaskCollection { tasks, next_id }),
            store,
        })
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.tasks.len()
    }

    pub async fn list(&self, filter: TaskFilter) -> Vec<Task> {
        let inner = self.inner.lock().await;
        let mut result: Vec<Task> = inner
            .tasks
            .iter()
            .filter(|t| filter.completed.map_or(true, |c| t.completed == c))
            .cloned()
            .collect();

        if filter.sort_by_created {
            result.sort_by_key(|t| t.created_at);
        }

        result
    }

    pub async fn list_by_priority(&self, priority: Priority) -> Vec<Task> {
        let inner = self.inner.lock().await;
        inner
            .tasks
            .iter()
            .filter(|t| t.priority == priority)
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: u64) -> Result<Task> {
        let inner = self.inner.lock().await;
        inner
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(AppError::TaskNotFound)
    }

    pub async fn create(&self, input: TaskInput) -> Result<Task> {
        let mut inner = self.inner.lock().await;

        let task = Task {
            id: inner.next_id,
            title: input.title,
            description: input.description,
            completed: input.completed,
            priority: input.priority,
            created_at: Utc::now(),
        };

        let mut staged = inner.tasks.clone();
        staged.push(task.clone());
        self.persist(&staged).await?;

        inner.tasks = staged;
        inner.next_id += 1;

        tracing::info!("Task {} created", task.id);
        Ok(task)
    }

    /// Replace the mutable fields of a task, keeping its id and creation time
    pub async fn update(&self, id: u64, input: TaskInput) -> Result<Task> {
        let mut inner = self.inner.lock().await;

        let index = inner
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(AppError::TaskNotFound)?;

        let mut staged = inner.tasks.clone();
        let task = &mut staged[index];
        task.title = input.title;
        task.description = input.description;
        task.completed = input.completed;
        task.priority = input.priority;
        let updated = task.clone();

        self.persist(&staged).await?;
        inner.tasks = staged;

        tracing::info!("Task {} updated", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        let mut inner = self.inner.lock().await;

        let index = inner
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(AppError::TaskNotFound)?;

        let mut staged = inner.tasks.clone();
        staged.remove(index);

        self.persist(&staged).await?;
        inner.tasks = staged;

        tracing::info!("Task {} deleted", id);
        Ok(())
    }

    async fn persist(&self, tasks: &[Task]) -> Result<()> {
        let snapshot = TaskSnapshot {
            tasks: tasks.to_vec(),
        };
        self.store.save(&snapshot).await?;
        Ok(())
    }
}
