//! Read-only access to borrow records and travel logs.

use crate::contract::args::{expect_args, ok_json, parse_id, storage_failure, HandlerResult};
use crate::model::{BorrowId, CarBorrow, TravelLog, UserId};
use crate::repository::EntityRepository;
use ledger_framework::{status, Record, RecordStore, Response};

async fn by_id<R, S>(store: &mut S, args: &[String], label: &str) -> HandlerResult
where
    R: Record<Id = BorrowId>,
    S: RecordStore + ?Sized,
{
    expect_args(args, 1)?;
    let id: BorrowId = parse_id(&args[0], "borrow id")?;
    let repo = EntityRepository::new(store);
    match repo.find::<R>(id).await.map_err(storage_failure)? {
        Some(record) => ok_json(&record),
        None => Err(Response::error(
            status::NOT_FOUND,
            format!("{label} {id} not found"),
        )),
    }
}

pub async fn borrow_by_id<S: RecordStore + ?Sized>(store: &mut S, args: &[String]) -> HandlerResult {
    by_id::<CarBorrow, S>(store, args, "Borrow").await
}

pub async fn travel_log_by_id<S: RecordStore + ?Sized>(
    store: &mut S,
    args: &[String],
) -> HandlerResult {
    by_id::<TravelLog, S>(store, args, "TravelLog").await
}

/// Every travel log of one user, oldest borrow first. Unknown users have none.
pub async fn travel_logs_for_user<S: RecordStore + ?Sized>(
    store: &mut S,
    args: &[String],
) -> HandlerResult {
    expect_args(args, 1)?;
    let user_id: UserId = parse_id(&args[0], "user id")?;
    let repo = EntityRepository::new(store);
    let logs: Vec<TravelLog> = repo
        .list::<TravelLog>()
        .await
        .map_err(storage_failure)?
        .into_iter()
        .filter(|log| log.user_id == user_id)
        .collect();
    ok_json(&logs)
}
