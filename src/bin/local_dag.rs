use anyhow::Result;
use trip_etl::core::sequence::{ShellTask, TaskSequence};
use trip_etl::utils::logger::{init_logger, LogFormat};

/// Two placeholder shell tasks chained in sequence. Demonstrates task wiring
/// only; there is no data-processing content.
#[tokio::main]
async fn main() -> Result<()> {
    init_logger(LogFormat::Compact, false);

    let mut sequence = TaskSequence::new("local_ingestion");
    sequence.add_task(Box::new(ShellTask::new("wget", "echo \"hello world\"")));
    sequence.add_task(Box::new(ShellTask::new("ingest", "echo \"hello world\"")));

    let reports = sequence.run_all().await?;
    let summary = TaskSequence::execution_summary(&reports);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
