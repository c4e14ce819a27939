use crate::model::BorrowId;
use crate::repository::RepositoryError;
use ledger_framework::RecordStore;
use tracing::debug;

/// Key of the record holding the last issued borrow id, as decimal text.
pub const COUNTER_KEY: &str = "counterB";

/// Issues borrow ids from the persisted counter.
///
/// The read-increment-write runs against the caller's store, so inside a
/// [`Transaction`](ledger_framework::Transaction) it commits or aborts together with the
/// borrow that consumes the id. Two borrows racing for the counter conflict on its key
/// and one of them is re-executed, which is what keeps ids unique and gap-free.
pub struct IdentifierAllocator;

impl IdentifierAllocator {
    /// Reserves and returns the next borrow id.
    ///
    /// A missing counter counts as 0, so the first id issued is 1.
    pub async fn next<S: RecordStore + ?Sized>(store: &mut S) -> Result<BorrowId, RepositoryError> {
        let last = Self::current(store).await?;
        let next = last
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Allocation(format!("counter exhausted at {last}")))?;
        store
            .put(COUNTER_KEY, next.to_string().into_bytes())
            .await?;
        debug!(borrow_id = next, "Allocated borrow id");
        Ok(BorrowId(next))
    }

    /// The last issued id, without reserving a new one.
    pub async fn current<S: RecordStore + ?Sized>(store: &S) -> Result<u64, RepositoryError> {
        let Some(bytes) = store.get(COUNTER_KEY).await? else {
            return Ok(0);
        };
        let text = std::str::from_utf8(&bytes)
            .map_err(|_| RepositoryError::Allocation("counter is not text".to_string()))?;
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RepositoryError::Allocation(format!(
                "counter holds {text:?}, not a decimal number"
            )));
        }
        text.parse::<u64>()
            .map_err(|_| RepositoryError::Allocation(format!("counter {text} does not fit in 64 bits")))
    }

    /// Writes a zero counter if none exists. Returns whether it wrote one.
    pub async fn ensure_initialized<S: RecordStore + ?Sized>(
        store: &mut S,
    ) -> Result<bool, RepositoryError> {
        if store.get(COUNTER_KEY).await?.is_some() {
            return Ok(false);
        }
        store.put(COUNTER_KEY, b"0".to_vec()).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_framework::LedgerActor;

    #[tokio::test]
    async fn test_ids_start_at_one_and_increase() {
        let (actor, mut client) = LedgerActor::new(8);
        tokio::spawn(actor.run());

        assert_eq!(IdentifierAllocator::next(&mut client).await.unwrap(), BorrowId(1));
        assert_eq!(IdentifierAllocator::next(&mut client).await.unwrap(), BorrowId(2));
        assert_eq!(client.get(COUNTER_KEY).await.unwrap(), Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn test_ensure_initialized_keeps_existing_counter() {
        let (actor, mut client) = LedgerActor::new(8);
        tokio::spawn(actor.run());

        assert!(IdentifierAllocator::ensure_initialized(&mut client).await.unwrap());
        IdentifierAllocator::next(&mut client).await.unwrap();
        assert!(!IdentifierAllocator::ensure_initialized(&mut client).await.unwrap());
        assert_eq!(IdentifierAllocator::current(&client).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_garbage_counter_is_allocation_error() {
        let (actor, mut client) = LedgerActor::new(8);
        tokio::spawn(actor.run());

        client.put(COUNTER_KEY, b"seven".to_vec()).await.unwrap();
        let err = IdentifierAllocator::next(&mut client).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Allocation(_)));

        client.put(COUNTER_KEY, b"18446744073709551615".to_vec()).await.unwrap();
        let err = IdentifierAllocator::next(&mut client).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Allocation(ref m) if m.contains("exhausted")));

        client.put(COUNTER_KEY, b"99999999999999999999".to_vec()).await.unwrap();
        let err = IdentifierAllocator::next(&mut client).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Allocation(_)));
    }
}
