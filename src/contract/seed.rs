use crate::contract::args::{storage_failure, HandlerResult};
use crate::model::{Car, CarId, User, UserId};
use crate::repository::{EntityRepository, IdentifierAllocator, RepositoryError};
use ledger_framework::{RecordStore, Response};
use tracing::info;

/// Cars present on a fresh ledger: `(id, km)`.
pub const SEED_CARS: [(u64, u64); 5] = [(1, 1000), (2, 1500), (3, 1800), (4, 6500), (5, 1690)];

/// Users present on a fresh ledger: `(id, name)`.
pub const SEED_USERS: [(u64, &str); 5] = [
    (1, "Alice"),
    (2, "Bob"),
    (3, "Charlie"),
    (4, "Delta"),
    (5, "Eve"),
];

/// Writes the seed records and the borrow counter, skipping any that already exist.
///
/// Running it again on a ledger in use changes nothing, so a borrow in progress or an
/// issued id is never reset.
pub async fn seed<S: RecordStore + ?Sized>(store: &mut S) -> HandlerResult {
    let written = write_missing(store).await.map_err(storage_failure)?;
    info!(written, "Seeded");
    Ok(Response::no_content())
}

async fn write_missing<S: RecordStore + ?Sized>(store: &mut S) -> Result<usize, RepositoryError> {
    let mut written = 0;
    let mut repo = EntityRepository::new(store);
    for (id, km) in SEED_CARS {
        if !repo.exists::<Car>(CarId(id)).await? {
            repo.save(&Car::new(CarId(id), km)).await?;
            written += 1;
        }
    }
    for (id, name) in SEED_USERS {
        if !repo.exists::<User>(UserId(id)).await? {
            repo.save(&User::new(UserId(id), name)).await?;
            written += 1;
        }
    }
    if IdentifierAllocator::ensure_initialized(repo.store_mut()).await? {
        written += 1;
    }
    Ok(written)
}
