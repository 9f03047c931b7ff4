//! Streaming CSV encoding for link reports.
//!
//! Rows are pulled from the repository stream only when the consumer asks for
//! the next chunk, so a slow uploader slows down the database scan instead of
//! buffering the whole table.

use bytes::Bytes;
use chrono::SecondsFormat;
use csv::WriterBuilder;
use futures_util::stream::{self, StreamExt};
use std::io;

use crate::domain::entities::ExportRow;
use crate::domain::repositories::ExportRowStream;
use crate::domain::storage::ByteStream;

/// Column titles of the report header row.
pub const CSV_HEADER: [&str; 4] = ["Original URL", "Shortened URL", "Access Count", "Created At"];

/// Content type of generated reports.
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Maximum number of already-available rows encoded into one chunk.
const ROWS_PER_CHUNK: usize = 256;

/// Turns a row stream into CSV bytes: one header chunk, then the rows.
///
/// A storage error ends the output with an `io::Error` carrying it.
pub fn csv_report_stream(rows: ExportRowStream) -> ByteStream {
    let header =
        stream::once(async { encode_records(std::iter::once(CSV_HEADER.map(String::from))) });

    let body = rows.ready_chunks(ROWS_PER_CHUNK).map(|batch| {
        let rows = batch
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(io::Error::other)?;

        encode_records(rows.iter().map(row_record))
    });

    Box::pin(header.chain(body))
}

fn row_record(row: &ExportRow) -> [String; 4] {
    [
        row.original_url.clone(),
        row.shortened_url.clone(),
        row.access_count.to_string(),
        row.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    ]
}

fn encode_records<I>(records: I) -> io::Result<Bytes>
where
    I: IntoIterator<Item = [String; 4]>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::with_capacity(256));

    for record in records {
        writer.write_record(&record).map_err(io::Error::other)?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| io::Error::other(e.to_string()))?;
    Ok(Bytes::from(buffer))
}
