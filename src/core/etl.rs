use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::StageMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: StageMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: StageMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting ETL process...");

        let batch = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rows", batch.len());
        self.monitor.log_stage("Extract");

        let batch = self.pipeline.transform(batch).await?;
        tracing::info!("{} rows after transform", batch.len());
        self.monitor.log_stage("Transform");

        let destination = self.pipeline.load(batch).await?;
        tracing::info!("Loaded into: {}", destination);
        self.monitor.log_stage("Load");

        self.monitor.log_summary();
        Ok(destination)
    }
}
