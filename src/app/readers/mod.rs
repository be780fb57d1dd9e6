pub mod csv;
pub mod parquet;

use crate::domain::model::Batch;
use crate::utils::error::Result;
use flate2::read::GzDecoder;

/// Source file formats the fetcher understands, derived from the URL suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    CsvGz,
    Parquet,
}

impl SourceFormat {
    pub fn from_url(url: &str) -> SourceFormat {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path.ends_with(".csv.gz") {
            SourceFormat::CsvGz
        } else if path.ends_with(".parquet") {
            SourceFormat::Parquet
        } else {
            SourceFormat::Csv
        }
    }

    /// Fixed local file name the download is written to, overwriting the
    /// previous run's copy.
    pub fn local_name(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "output.csv",
            SourceFormat::CsvGz => "output.csv.gz",
            SourceFormat::Parquet => "output.parquet",
        }
    }
}

/// Parses only the first `chunk_size` rows of the downloaded bytes into a
/// Batch. The rest of the file is discarded.
pub fn read_chunk(
    data: &[u8],
    format: SourceFormat,
    chunk_size: usize,
    timestamp_columns: &[String],
) -> Result<Batch> {
    match format {
        SourceFormat::Csv => csv::read_chunk(data, chunk_size, timestamp_columns),
        SourceFormat::CsvGz => {
            let mut decoded = Vec::new();
            std::io::Read::read_to_end(&mut GzDecoder::new(data), &mut decoded)?;
            csv::read_chunk(&decoded, chunk_size, timestamp_columns)
        }
        // Parquet carries its own types; no text coercion applies.
        SourceFormat::Parquet => parquet::read_chunk(data, chunk_size),
    }
}
