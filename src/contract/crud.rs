//! Create, read, update, delete and list for provisioned entities (cars and users).
//!
//! These handlers touch one record per call. A record that is lent out cannot be
//! updated or deleted, and a body can never set `borrowId`, so provisioning cannot
//! break a borrow in progress.

use crate::contract::args::{expect_args, json_bytes, ok_json, storage_failure, HandlerResult};
use crate::model::BorrowId;
use crate::repository::EntityRepository;
use ledger_framework::{status, EventSink, Record, RecordStore, Response};
use tracing::info;

/// An entity managed through the CRUD operations.
pub trait Provisioned: Record {
    /// Capitalized name used in messages and event tags ("Car", "User").
    const LABEL: &'static str;

    fn active_borrow(&self) -> Option<BorrowId>;

    /// Builds the entity from a JSON request body, checking it against the path id.
    fn from_body(path_id: Self::Id, body: &str) -> Result<Self, Response>;
}

pub fn bad_request(message: impl Into<String>) -> Response {
    Response::error(status::BAD_REQUEST, message)
}

fn parse_record_id<R: Record>(arg: &str) -> Result<R::Id, Response> {
    match arg.trim().parse::<u64>() {
        Ok(raw) if raw != 0 => Ok(<R::Id as From<u64>>::from(raw)),
        _ => Err(bad_request(format!(
            "{} id must be a positive integer, got {arg:?}",
            R::KIND
        ))),
    }
}

fn not_found<R: Provisioned>(id: R::Id) -> Response {
    Response::error(status::NOT_FOUND, format!("{} {id} not found", R::LABEL))
}

fn ensure_not_lent<R: Provisioned>(record: &R) -> Result<(), Response> {
    match record.active_borrow() {
        Some(borrow) => Err(Response::error(
            status::CONFLICT,
            format!("{} {} is lent out (borrow {borrow})", R::LABEL, record.id()),
        )),
        None => Ok(()),
    }
}

fn publish<R: Provisioned, S: EventSink + ?Sized>(store: &S, action: &str, body: Vec<u8>) {
    store.publish(&format!("{} {action}", R::LABEL), body);
}

pub async fn create<R, S>(store: &mut S, args: &[String]) -> HandlerResult
where
    R: Provisioned,
    S: RecordStore + EventSink + ?Sized,
{
    expect_args(args, 2)?;
    let id = parse_record_id::<R>(&args[0])?;
    let mut repo = EntityRepository::new(store);
    if repo.exists::<R>(id).await.map_err(storage_failure)? {
        return Err(Response::error(
            status::CONFLICT,
            format!("A {} with id {id} already exists", R::KIND),
        ));
    }
    let record = R::from_body(id, &args[1])?;
    repo.save(&record).await.map_err(storage_failure)?;

    let body = json_bytes(&record)?;
    publish::<R, S>(repo.store(), "created", body.clone());
    info!(key = %record.key(), "Created");
    Ok(Response::success(status::CREATED, body))
}

pub async fn get<R, S>(store: &mut S, args: &[String]) -> HandlerResult
where
    R: Provisioned,
    S: RecordStore + ?Sized,
{
    expect_args(args, 1)?;
    let id = parse_record_id::<R>(&args[0])?;
    let repo = EntityRepository::new(store);
    let record = repo
        .find::<R>(id)
        .await
        .map_err(storage_failure)?
        .ok_or_else(|| not_found::<R>(id))?;
    ok_json(&record)
}

pub async fn update<R, S>(store: &mut S, args: &[String]) -> HandlerResult
where
    R: Provisioned,
    S: RecordStore + EventSink + ?Sized,
{
    expect_args(args, 2)?;
    let id = parse_record_id::<R>(&args[0])?;
    let mut repo = EntityRepository::new(store);
    let stored = repo
        .find::<R>(id)
        .await
        .map_err(storage_failure)?
        .ok_or_else(|| not_found::<R>(id))?;
    ensure_not_lent(&stored)?;
    let record = R::from_body(id, &args[1])?;
    repo.save(&record).await.map_err(storage_failure)?;

    let body = json_bytes(&record)?;
    publish::<R, S>(repo.store(), "updated", body.clone());
    info!(key = %record.key(), "Updated");
    Ok(Response::ok(body))
}

pub async fn delete<R, S>(store: &mut S, args: &[String]) -> HandlerResult
where
    R: Provisioned,
    S: RecordStore + EventSink + ?Sized,
{
    expect_args(args, 1)?;
    let id = parse_record_id::<R>(&args[0])?;
    let mut repo = EntityRepository::new(store);
    let stored = repo
        .find::<R>(id)
        .await
        .map_err(storage_failure)?
        .ok_or_else(|| not_found::<R>(id))?;
    ensure_not_lent(&stored)?;
    repo.remove::<R>(id).await.map_err(storage_failure)?;

    let body = json_bytes(&stored)?;
    publish::<R, S>(repo.store(), "deleted", body.clone());
    info!(key = %stored.key(), "Deleted");
    Ok(Response::ok(body))
}

pub async fn list<R, S>(store: &mut S, args: &[String]) -> HandlerResult
where
    R: Record,
    S: RecordStore + ?Sized,
{
    expect_args(args, 0)?;
    let repo = EntityRepository::new(store);
    let records = repo.list::<R>().await.map_err(storage_failure)?;
    ok_json(&records)
}
