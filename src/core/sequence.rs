use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[async_trait]
pub trait Task: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self) -> Result<()>;
}

/// 以 `sh -c` 執行單一命令的任務
pub struct ShellTask {
    name: String,
    command: String,
}

impl ShellTask {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }
}

#[async_trait]
impl Task for ShellTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<()> {
        tracing::debug!("[{}] $ {}", self.name, self.command);
        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            tracing::info!("[{}] {}", self.name, line);
        }

        if !output.status.success() {
            return Err(EtlError::TaskError {
                name: self.name.clone(),
                message: format!("exit status {}", output.status),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TaskReport {
    pub task_name: String,
    pub duration: Duration,
}

/// Runs tasks strictly in order, stopping at the first failure. There is no
/// fan-out or conditional branching.
pub struct TaskSequence {
    name: String,
    tasks: Vec<Box<dyn Task>>,
}

impl TaskSequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    pub fn add_task(&mut self, task: Box<dyn Task>) {
        self.tasks.push(task);
    }

    pub async fn run_all(&self) -> Result<Vec<TaskReport>> {
        tracing::info!("Running task sequence '{}' ({} tasks)", self.name, self.tasks.len());
        let mut reports = Vec::with_capacity(self.tasks.len());

        for task in &self.tasks {
            let started = Instant::now();
            tracing::info!("▶ {}", task.name());
            task.run().await?;
            reports.push(TaskReport {
                task_name: task.name().to_string(),
                duration: started.elapsed(),
            });
        }

        Ok(reports)
    }

    pub fn execution_summary(reports: &[TaskReport]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();
        summary.insert(
            "total_tasks".to_string(),
            serde_json::Value::Number(reports.len().into()),
        );
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number(
                (reports.iter().map(|r| r.duration.as_millis()).sum::<u128>() as u64).into(),
            ),
        );
        summary.insert(
            "executed_tasks".to_string(),
            serde_json::Value::Array(
                reports
                    .iter()
                    .map(|r| serde_json::Value::String(r.task_name.clone()))
                    .collect(),
            ),
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct CountingTask {
        name: String,
        order: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl Task for CountingTask {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(&self) -> Result<()> {
            self.order.lock().unwrap().push(self.name.clone());
            if self.fail {
                return Err(EtlError::TaskError {
                    name: self.name.clone(),
                    message: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_shell_task_success() {
        let task = ShellTask::new("wget", "echo \"hello world\"");
        task.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_shell_task_failure() {
        let task = ShellTask::new("broken", "exit 3");
        let err = task.run().await.unwrap_err();
        match err {
            EtlError::TaskError { name, .. } => assert_eq!(name, "broken"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sequence_runs_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut sequence = TaskSequence::new("toy");
        sequence.add_task(Box::new(CountingTask {
            name: "wget".to_string(),
            order: order.clone(),
            fail: false,
        }));
        sequence.add_task(Box::new(CountingTask {
            name: "ingest".to_string(),
            order: order.clone(),
            fail: false,
        }));

        let reports = sequence.run_all().await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(*order.lock().unwrap(), vec!["wget", "ingest"]);
    }

    #[tokio::test]
    async fn test_sequence_stops_at_first_failure() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut sequence = TaskSequence::new("toy");
        sequence.add_task(Box::new(CountingTask {
            name: "first".to_string(),
            order: order.clone(),
            fail: true,
        }));
        sequence.add_task(Box::new(CountingTask {
            name: "second".to_string(),
            order: order.clone(),
            fail: false,
        }));

        assert!(sequence.run_all().await.is_err());
        assert_eq!(*order.lock().unwrap(), vec!["first"]);
    }

    #[test]
    fn test_execution_summary() {
        let reports = vec![
            TaskReport {
                task_name: "wget".to_string(),
                duration: Duration::from_millis(100),
            },
            TaskReport {
                task_name: "ingest".to_string(),
                duration: Duration::from_millis(200),
            },
        ];

        let summary = TaskSequence::execution_summary(&reports);
        assert_eq!(
            summary.get("total_tasks").unwrap(),
            &serde_json::Value::Number(2.into())
        );
        assert_eq!(
            summary.get("total_duration_ms").unwrap(),
            &serde_json::Value::Number(300.into())
        );
        let executed = summary.get("executed_tasks").unwrap().as_array().unwrap();
        assert_eq!(executed.len(), 2);
    }
}
