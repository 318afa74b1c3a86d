// Task list store: in-memory list, edit session and durable mirror

use crate::durable::{DurableStore, TASKS_KEY};
use crate::models::{EditSession, Task, TaskId};
use crate::snapshot;
use eyre::{Result, eyre};
use tracing::{debug, error, info, warn};

/// Owns the task list for one session and mirrors it to a durable store
///
/// The durable snapshot is read once in [`TaskListStore::load`]; from then on
/// the in-memory list is authoritative and every mutation rewrites the
/// snapshot in full. Persistence failures are logged and never undo a
/// mutation.
pub struct TaskListStore<S: DurableStore> {
    durable: S,
    tasks: Vec<Task>,
    editing: Option<EditSession>,
}

impl<S: DurableStore> TaskListStore<S> {
    /// Load the list from `durable`, falling back to an empty list
    pub fn load(durable: S) -> Self {
        let tasks = match durable.get(TASKS_KEY) {
            Ok(Some(raw)) => match snapshot::decode(&raw) {
                Ok(tasks) => {
                    info!(count = tasks.len(), "Loaded task list");
                    tasks
                }
                Err(e) => {
                    warn!(error = ?e, "Stored task list is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                info!("No stored task list, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(error = ?e, "Failed to read task list, starting empty");
                Vec::new()
            }
        };

        Self {
            durable,
            tasks,
            editing: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn durable(&self) -> &S {
        &self.durable
    }

    pub fn durable_mut(&mut self) -> &mut S {
        &mut self.durable
    }

    pub fn into_durable(self) -> S {
        self.durable
    }

    /// Append a new open task; blank input is ignored
    pub fn add(&mut self, raw_text: &str) -> &[Task] {
        let text = raw_text.trim();
        if text.is_empty() {
            debug!("Ignoring blank task");
            return &self.tasks;
        }

        let id = self.fresh_id();
        debug!(id = %id, "Adding task");
        self.tasks.push(Task::new(id, text));
        self.persist();

        &self.tasks
    }

    /// Flip the completion flag of the task with `id`
    pub fn toggle_completed(&mut self, id: &TaskId) -> &[Task] {
        match self.tasks.iter_mut().find(|t| &t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                debug!(id = %id, completed = task.completed, "Toggled task");
                self.persist();
            }
            None => debug!(id = %id, "Toggle of unknown task ignored"),
        }

        &self.tasks
    }

    /// Begin editing the task with `id`, discarding any other session
    ///
    /// An unknown id leaves the current session as it was and returns `None`.
    pub fn start_edit(&mut self, id: &TaskId) -> Option<&EditSession> {
        let Some(task) = self.tasks.iter().find(|t| &t.id == id) else {
            debug!(id = %id, "Edit of unknown task ignored");
            return None;
        };

        self.editing = Some(EditSession {
            id: task.id.clone(),
            text: task.text.clone(),
        });
        self.editing.as_ref()
    }

    /// Replace the pending text of the active session
    pub fn set_edit_text(&mut self, text: &str) {
        if let Some(session) = self.editing.as_mut() {
            session.text = text.to_string();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Apply the active session
    ///
    /// Pending text that trims to nothing deletes the task instead of
    /// leaving it empty.
    pub fn commit_edit(&mut self) -> &[Task] {
        let Some(session) = self.editing.take() else {
            return &self.tasks;
        };

        let text = session.text.trim();
        if text.is_empty() {
            debug!(id = %session.id, "Edit emptied task, deleting");
            return self.delete(&session.id);
        }

        let changed = self.tasks.iter_mut().find(|t| t.id == session.id).filter(|t| t.text != text);
        if let Some(task) = changed {
            task.text = text.to_string();
            debug!(id = %session.id, "Committed edit");
            self.persist();
        }

        &self.tasks
    }

    /// Remove the task with `id`, ending any edit of it
    pub fn delete(&mut self, id: &TaskId) -> &[Task] {
        if self.editing.as_ref().is_some_and(|s| &s.id == id) {
            self.editing = None;
        }

        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);

        if self.tasks.len() == before {
            debug!(id = %id, "Delete of unknown task ignored");
        } else {
            debug!(id = %id, "Deleted task");
            self.persist();
        }

        &self.tasks
    }

    /// Find a task by full id or unique id prefix
    pub fn resolve_id(&self, needle: &str) -> Result<TaskId> {
        let needle = needle.trim();
        if needle.is_empty() {
            return Err(eyre!("Task id cannot be empty"));
        }

        if let Some(task) = self.tasks.iter().find(|t| t.id.as_str() == needle) {
            return Ok(task.id.clone());
        }

        let mut matches = self.tasks.iter().filter(|t| t.id.as_str().starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id.clone()),
            (Some(_), Some(_)) => Err(eyre!("Task id prefix {} is ambiguous", needle)),
            (None, _) => Err(eyre!("No task with id {}", needle)),
        }
    }

    fn fresh_id(&self) -> TaskId {
        loop {
            let id = TaskId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&mut self) {
        let result = snapshot::encode(&self.tasks).and_then(|raw| self.durable.set(TASKS_KEY, &raw));
        if let Err(e) = result {
            error!(error = ?e, count = self.tasks.len(), "Failed to save task list");
        }
    }
}
