//! # Car Ledger Contract
//!
//! [`CarLedger`] is the [`Contract`] the host runs. It dispatches on the operation name
//! (case-insensitive) to the lending transitions, the provisioning operations and the
//! log queries.
//!
//! | Operation | Arguments | Success |
//! |-----------|-----------|---------|
//! | `userBorrowACar` | user id, `{"carId":n}` | 200, the borrow record |
//! | `userReturnACar` | user id, `{"newKm":n,"usage":"..."}` | 200, the travel log |
//! | `createCar` / `createUser` | id, entity JSON | 201, the entity |
//! | `getCarById` / `getUserById` | id | 200, the entity |
//! | `updateCar` / `updateUser` | id, entity JSON | 200, the entity |
//! | `deleteCar` / `deleteUser` | id | 200, the removed entity |
//! | `getAllCars` / `getAllUser` | none | 200, array sorted by id |
//! | `getBorrowLogById` / `getTravelLogById` | borrow id | 200, the record |
//! | `getAllBorrowLogs` / `getAllTravelLogs` | none | 200, array sorted by id |
//! | `getAllTravelLogsForUser` | user id | 200, array sorted by id |
//! | `getAllKeys` / `getAllValues` / `getAllData` | none | 200, the raw key space |
//!
//! A wrong number of arguments is 400 `Parameter Mismatch`; an unknown operation is
//! 501 `Invalid method name`.

pub mod args;
pub mod cars;
pub mod crud;
pub mod dump;
pub mod logs;
pub mod seed;
pub mod users;

use crate::lending::{BorrowPayload, Clock, LendingError, LendingStateMachine, ReturnPayload, SystemClock};
use crate::model::{Car, CarBorrow, TravelLog, User, UserId};
use args::{expect_args, ok_json, rejected, HandlerResult};
use async_trait::async_trait;
use ledger_framework::{status, Contract, Response, Transaction};
use tracing::{debug, warn};

pub const INVALID_METHOD: &str = "Invalid method name";

/// The lending ledger's business logic.
#[derive(Debug, Clone, Default)]
pub struct CarLedger<K: Clock = SystemClock> {
    machine: LendingStateMachine<K>,
}

impl CarLedger<SystemClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Clock> CarLedger<K> {
    pub fn with_clock(clock: K) -> Self {
        Self {
            machine: LendingStateMachine::with_clock(clock),
        }
    }

    pub fn machine(&self) -> &LendingStateMachine<K> {
        &self.machine
    }

    async fn borrow(&self, tx: &mut Transaction, args: &[String]) -> HandlerResult {
        expect_args(args, 2)?;
        let user_id = lending_user_id(&args[0])?;
        let payload = BorrowPayload::parse(&args[1]);
        let record = self
            .machine
            .borrow(tx, user_id, &payload)
            .await
            .map_err(rejected)?;
        ok_json(&record)
    }

    async fn return_car(&self, tx: &mut Transaction, args: &[String]) -> HandlerResult {
        expect_args(args, 2)?;
        let user_id = lending_user_id(&args[0])?;
        let payload = ReturnPayload::parse(&args[1]);
        let log = self
            .machine
            .return_car(tx, user_id, &payload)
            .await
            .map_err(rejected)?;
        ok_json(&log)
    }
}

fn lending_user_id(arg: &str) -> Result<UserId, Response> {
    arg.parse::<UserId>().map_err(|_| {
        rejected(LendingError::InvalidArgument(format!(
            "user id must be an integer, got {arg:?}"
        )))
    })
}

#[async_trait]
impl<K: Clock> Contract for CarLedger<K> {
    async fn init(&self, tx: &mut Transaction) -> Response {
        seed::seed(tx).await.unwrap_or_else(|response| response)
    }

    async fn invoke(&self, tx: &mut Transaction, function: &str, args: &[String]) -> Response {
        debug!(function, ?args, "Invoke");
        let result = match function.to_ascii_lowercase().as_str() {
            "createcar" => crud::create::<Car, _>(tx, args).await,
            "getcarbyid" => crud::get::<Car, _>(tx, args).await,
            "updatecar" => crud::update::<Car, _>(tx, args).await,
            "deletecar" => crud::delete::<Car, _>(tx, args).await,
            "getallcars" => crud::list::<Car, _>(tx, args).await,

            "createuser" => crud::create::<User, _>(tx, args).await,
            "getuserbyid" => crud::get::<User, _>(tx, args).await,
            "updateuser" => crud::update::<User, _>(tx, args).await,
            "deleteuser" => crud::delete::<User, _>(tx, args).await,
            "getalluser" => crud::list::<User, _>(tx, args).await,

            "userborrowacar" => self.borrow(tx, args).await,
            "userreturnacar" => self.return_car(tx, args).await,
            "getalltravellogsforuser" => logs::travel_logs_for_user(tx, args).await,

            "getborrowlogbyid" => logs::borrow_by_id(tx, args).await,
            "gettravellogbyid" => logs::travel_log_by_id(tx, args).await,
            "getallborrowlogs" => crud::list::<CarBorrow, _>(tx, args).await,
            "getalltravellogs" => crud::list::<TravelLog, _>(tx, args).await,

            "getallkeys" => dump::all_keys(tx, args).await,
            "getallvalues" => dump::all_values(tx, args).await,
            "getalldata" => dump::all_data(tx, args).await,

            _ => {
                warn!(function, "Invalid method name");
                Err(Response::error(status::NOT_IMPLEMENTED, INVALID_METHOD))
            }
        };
        result.unwrap_or_else(|response| response)
    }
}
