use crate::repository::RepositoryError;
use ledger_framework::{Record, RecordStore, StoreError};
use tracing::debug;

/// Typed access to the records of a [`RecordStore`].
///
/// Key derivation and JSON encoding stay in here; callers only deal with ids and
/// entities. The repository borrows the store mutably for its lifetime, so the store
/// itself is reachable through [`store`](Self::store) and [`store_mut`](Self::store_mut)
/// for everything else it offers (events, the borrow counter).
pub struct EntityRepository<'s, S: RecordStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: RecordStore + ?Sized> EntityRepository<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &*self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut *self.store
    }

    /// Loads a record, or `None` when its key is absent.
    pub async fn find<R: Record>(&self, id: R::Id) -> Result<Option<R>, RepositoryError> {
        let key = R::key_for(id);
        match self.store.get(&key).await? {
            Some(bytes) => decode(&key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Loads a record that must exist.
    pub async fn load<R: Record>(&self, id: R::Id) -> Result<R, RepositoryError> {
        self.find(id).await?.ok_or(RepositoryError::NotFound {
            kind: R::KIND,
            id: id.into(),
        })
    }

    pub async fn exists<R: Record>(&self, id: R::Id) -> Result<bool, RepositoryError> {
        Ok(self.store.get(&R::key_for(id)).await?.is_some())
    }

    pub async fn save<R: Record>(&mut self, record: &R) -> Result<(), RepositoryError> {
        let key = record.key();
        let bytes = record.encode().map_err(|e| codec_error(&key, e))?;
        debug!(%key, "Saving record");
        self.store.put(&key, bytes).await?;
        Ok(())
    }

    pub async fn remove<R: Record>(&mut self, id: R::Id) -> Result<(), RepositoryError> {
        let key = R::key_for(id);
        debug!(%key, "Removing record");
        self.store.delete(&key).await?;
        Ok(())
    }

    /// All records of one kind, ascending by numeric id.
    ///
    /// Keys under the kind's prefix whose suffix is not a decimal id belong to some
    /// other kind and are skipped.
    pub async fn list<R: Record>(&self) -> Result<Vec<R>, RepositoryError> {
        let mut records = Vec::new();
        for entry in self.store.scan_prefix(R::KIND).await? {
            let Some(id) = R::parse_key(&entry.key) else {
                continue;
            };
            let id: u64 = id.into();
            let record: R = decode(&entry.key, &entry.value)?;
            records.push((id, record));
        }
        records.sort_by_key(|(id, _)| *id);
        Ok(records.into_iter().map(|(_, record)| record).collect())
    }
}

fn decode<R: Record>(key: &str, bytes: &[u8]) -> Result<R, RepositoryError> {
    R::decode(bytes).map_err(|e| codec_error(key, e))
}

fn codec_error(key: &str, error: StoreError) -> RepositoryError {
    match error {
        StoreError::Codec(reason) => RepositoryError::Codec {
            key: key.to_string(),
            reason,
        },
        other => RepositoryError::Storage(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Car, CarId, User, UserId};
    use ledger_framework::LedgerActor;

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let (actor, mut client) = LedgerActor::new(8);
        tokio::spawn(actor.run());
        let repo = EntityRepository::new(&mut client);

        let err = repo.load::<Car>(CarId(9)).await.unwrap_err();
        assert_eq!(err, RepositoryError::NotFound { kind: "car", id: 9 });
        assert!(repo.find::<Car>(CarId(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sorts_numerically_and_skips_foreign_keys() {
        let (actor, mut client) = LedgerActor::new(8);
        tokio::spawn(actor.run());
        let mut repo = EntityRepository::new(&mut client);

        for id in [10, 2, 1] {
            repo.save(&Car::new(CarId(id), id * 100)).await.unwrap();
        }
        repo.save(&User::new(UserId(1), "Alice")).await.unwrap();
        repo.store_mut()
            .put("carpool", b"not a car".to_vec())
            .await
            .unwrap();
        repo.store_mut()
            .put("car01", Car::new(CarId(1), 1).encode().unwrap())
            .await
            .unwrap();

        let ids: Vec<u64> = repo
            .list::<Car>()
            .await
            .unwrap()
            .into_iter()
            .map(|car| car.id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 10]);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_codec_error() {
        let (actor, mut client) = LedgerActor::new(8);
        tokio::spawn(actor.run());
        client.put("user4", b"{broken".to_vec()).await.unwrap();
        let repo = EntityRepository::new(&mut client);

        let err = repo.load::<User>(UserId(4)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Codec { ref key, .. } if key == "user4"));
    }
}
