use anyhow::Result;
use clap::Parser;
use trip_etl::adapters::s3::{s3_client, S3ObjectStore};
use trip_etl::core::registrar::{ensure_external_table, ExternalTableSpec};
use trip_etl::core::retry::{retry, RetryPolicy};
use trip_etl::core::{ArtifactStore, ObjectStore};
use trip_etl::utils::logger::{init_logger, LogFormat};
use trip_etl::{DataDir, DbConfig, PgWarehouse};

/// Downloads one year of monthly trip files, uploads each to an object-store
/// bucket, and optionally registers a warehouse external table over the
/// uploaded file pattern.
#[derive(Debug, Parser)]
#[command(name = "web-to-bucket")]
#[command(about = "Mirror monthly trip files into a bucket and register an external table")]
struct Args {
    #[arg(long, default_value = "trip-data")]
    bucket: String,

    #[arg(long, default_value = "raw")]
    prefix: String,

    #[arg(long, default_value_t = 2022)]
    year: u16,

    #[arg(long, default_value = "ap-southeast-2")]
    region: String,

    #[arg(long, default_value = "https://d37ci6vzurychx.cloudfront.net/trip-data")]
    base_url: String,

    /// Directory each downloaded file is also kept in
    #[arg(long, default_value = "./data")]
    data_dir: String,

    #[arg(long, default_value_t = 3)]
    retry_attempts: u32,

    /// Also create the warehouse external table definition
    #[arg(long)]
    register: bool,

    #[arg(long, default_value = "trips_data_all")]
    dataset: String,

    #[arg(long, default_value = "root")]
    wh_user: String,

    #[arg(long, default_value = "root")]
    wh_password: String,

    #[arg(long, default_value = "localhost")]
    wh_host: String,

    #[arg(long, default_value_t = 5432)]
    wh_port: u16,

    #[arg(long, default_value = "ny_taxi")]
    wh_database: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger(LogFormat::Json, false);

    let args = Args::parse();
    let policy = RetryPolicy::new(args.retry_attempts);

    let store = S3ObjectStore::new(s3_client(&args.region).await, args.bucket.clone());
    let storage = DataDir::new(args.data_dir.clone());
    let http = reqwest::Client::new();

    for month in 1..=12u32 {
        let file_name = format!("green_tripdata_{}-{:02}.parquet", args.year, month);
        let url = format!("{}/{}", args.base_url, file_name);

        let http_ref = &http;
        let url_ref = url.as_str();
        let bytes = retry(policy, "download", move || async move {
            let response = http_ref.get(url_ref).send().await?.error_for_status()?;
            Ok(response.bytes().await?.to_vec())
        })
        .await?;

        storage.persist(&file_name, &bytes).await?;

        let key = format!("{}/{}", args.prefix, file_name);
        let store_ref = &store;
        let key_ref = key.as_str();
        let bytes_ref = bytes.as_slice();
        retry(policy, "upload", move || async move {
            store_ref.upload(key_ref, bytes_ref).await
        })
        .await?;

        tracing::info!("Uploaded {} ({} bytes)", key, bytes.len());
    }

    if args.register {
        let warehouse_config = DbConfig {
            user: args.wh_user.clone(),
            password: args.wh_password.clone(),
            host: args.wh_host.clone(),
            port: args.wh_port,
            database: args.wh_database.clone(),
        };
        let warehouse = PgWarehouse::connect(&warehouse_config).await?;

        let spec = ExternalTableSpec {
            dataset: args.dataset.clone(),
            name: format!("green_{}", args.year),
            format: "PARQUET".to_string(),
            source_uris: vec![format!("s3://{}/{}/*.parquet", args.bucket, args.prefix)],
        };
        ensure_external_table(&warehouse, &spec).await?;
    }

    println!("✅ Bucket mirror completed");
    Ok(())
}
