use clap::Parser;
use std::time::Duration;
use trip_etl::config::file::FileConfig;
use trip_etl::utils::logger::{init_logger, LogFormat};
use trip_etl::utils::validation::Validate;
use trip_etl::{CliConfig, DataDir, EtlEngine, FetchCache, IngestPipeline, PgDestination};

async fn run(config: CliConfig) -> trip_etl::Result<String> {
    let monitor_enabled = config.monitor;

    let destination = PgDestination::connect(&config.db_config()).await?;
    let storage = DataDir::new(config.data_dir.clone());
    let cache = (!config.no_cache).then(|| {
        FetchCache::new(
            config.cache_dir.clone(),
            Duration::from_secs(config.cache_ttl_secs),
        )
    });

    let mut pipeline = IngestPipeline::new(storage, config, destination);
    if let Some(cache) = cache {
        pipeline = pipeline.with_cache(cache);
    }

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);
    engine.run().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::parse();

    // 初始化日誌
    init_logger(LogFormat::Compact, config.verbose);

    tracing::info!("Starting trip-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 合併設定檔
    if let Some(path) = config.config.clone() {
        let file = FileConfig::from_path(&path)?;
        config.apply_file(&file);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run(config).await {
        Ok(table) => {
            tracing::info!("✅ ETL process completed successfully!");
            println!("✅ ETL process completed successfully!");
            println!("📦 Rows appended to table: {}", table);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                trip_etl::utils::error::ErrorSeverity::Low => 0,
                trip_etl::utils::error::ErrorSeverity::Medium => 2,
                trip_etl::utils::error::ErrorSeverity::High => 1,
                trip_etl::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
