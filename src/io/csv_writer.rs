use tokio::io::AsyncWrite;

use super::error::IoError;
use crate::storage::OrderStore;

/// Write an `order,user,status,accrual` snapshot of every order
pub async fn write_snapshot<S, W>(store: &S, writer: W) -> Result<(), IoError>
where
    S: OrderStore,
    W: AsyncWrite + Unpin + Send,
{
    store.snapshot(writer).await?;
    Ok(())
}
