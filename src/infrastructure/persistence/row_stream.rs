//! Bounded hand-off between a database scan task and a report consumer.

use futures_util::stream::{self, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::entities::ExportRow;
use crate::domain::errors::StorageResult;
use crate::domain::repositories::ExportRowStream;

/// Rows buffered between the scan task and the consumer.
pub const EXPORT_CHANNEL_CAPACITY: usize = 64;

/// Forwards `rows` into `tx` until the source ends, fails, or the receiver is dropped.
///
/// `send` waits while the channel is full, so the consumer's pace gates the scan.
/// Returns the number of rows forwarded.
pub async fn pump_rows<S>(rows: S, tx: mpsc::Sender<StorageResult<ExportRow>>) -> usize
where
    S: Stream<Item = StorageResult<ExportRow>>,
{
    let mut rows = std::pin::pin!(rows);
    let mut forwarded = 0;

    while let Some(row) = rows.next().await {
        let failed = row.is_err();

        if tx.send(row).await.is_err() {
            debug!(forwarded, "Export consumer dropped, stopping scan");
            return forwarded;
        }

        if failed {
            return forwarded;
        }
        forwarded += 1;
    }

    forwarded
}

/// Exposes the receiving half of the channel as a row stream.
pub fn receiver_stream(rx: mpsc::Receiver<StorageResult<ExportRow>>) -> ExportRowStream {
    Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|row| (row, rx))
    }))
}
