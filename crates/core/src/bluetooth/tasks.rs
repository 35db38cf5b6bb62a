//! Handles of background connect and send tasks

use tokio::task::JoinHandle;

/// Tasks owned by the current connection, aborted together on disconnect
#[derive(Debug, Default)]
pub struct TaskGroup {
    handles: Vec<JoinHandle<()>>,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new task, dropping handles of tasks that already finished
    pub fn push(&mut self, handle: JoinHandle<()>) {
        self.handles.retain(|h| !h.is_finished());
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Abort every tracked task. Returns how many were still running.
    pub fn abort_all(&mut self) -> usize {
        let mut running = 0;
        for handle in self.handles.drain(..) {
            if !handle.is_finished() {
                running += 1;
            }
            handle.abort();
        }
        running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn finished_task() -> JoinHandle<()> {
        let handle = tokio::spawn(async {});
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
        handle
    }

    #[tokio::test]
    async fn test_push_drops_finished_tasks() {
        let mut tasks = TaskGroup::new();
        for _ in 0..100 {
            tasks.push(finished_task().await);
        }

        // Only the most recent handle survives the pruning
        assert_eq!(tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_running_tasks_are_kept() {
        let mut tasks = TaskGroup::new();
        tasks.push(tokio::spawn(std::future::pending::<()>()));
        tasks.push(finished_task().await);
        tasks.push(tokio::spawn(std::future::pending::<()>()));

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks.abort_all(), 2);
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_abort_all_counts_only_running_tasks() {
        let mut tasks = TaskGroup::new();
        assert_eq!(tasks.abort_all(), 0);

        tasks.push(finished_task().await);
        assert_eq!(tasks.abort_all(), 0);

        let pending = tokio::spawn(std::future::pending::<()>());
        tasks.push(pending);
        assert_eq!(tasks.abort_all(), 1);
    }
}
