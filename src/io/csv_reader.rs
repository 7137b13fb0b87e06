use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::{Stream, StreamExt};
use tokio::fs::File;
use tokio_util::compat::TokioAsyncReadCompatExt;

use super::error::IoError;
use super::parse::{RawOrderRecord, SeedOrder};

/// Async stream of seed orders from an `order,user` CSV
pub struct OrderSeedStream {
    inner: Pin<Box<dyn Stream<Item = Result<SeedOrder, IoError>> + Send>>,
}

impl OrderSeedStream {
    /// Create a new seed stream from an async reader
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let csv_reader = AsyncReaderBuilder::new()
            .trim(csv_async::Trim::All)
            .flexible(true)
            .create_deserializer(reader);

        let stream = csv_reader
            .into_deserialize::<RawOrderRecord>()
            .map(|result| result.map_err(IoError::from).and_then(RawOrderRecord::parse));

        Self {
            inner: Box::pin(stream),
        }
    }

    /// Open a seed file and stream its rows
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::new(file.compat()))
    }
}

impl Stream for OrderSeedStream {
    type Item = Result<SeedOrder, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
