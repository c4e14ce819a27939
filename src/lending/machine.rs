use crate::lending::events::{publish_json, CarBorrowed, CarReturned, BORROWED_TAG, RETURNED_TAG};
use crate::lending::invariants::{check_pair, ensure_car_available, ensure_linked, ensure_user_available};
use crate::lending::{BorrowPayload, Clock, LendingError, ReturnPayload, SystemClock};
use crate::model::{Car, CarBorrow, TravelLog, User, UserId};
use crate::repository::{EntityRepository, IdentifierAllocator, RepositoryError};
use ledger_framework::{EventSink, RecordStore};
use tracing::{debug, info};

/// The borrow and return transitions.
///
/// The machine holds no state of its own: everything comes from the store it is handed.
/// Each transition reads and validates first and only then stages its writes, so a
/// failure never leaves a partial update behind even on a store without transactions.
/// Under a [`LedgerHost`](ledger_framework::LedgerHost) the store is a transaction and the
/// event is released only once the writes have committed, which makes re-execution
/// after a conflict safe.
#[derive(Debug, Clone, Default)]
pub struct LendingStateMachine<K: Clock = SystemClock> {
    clock: K,
}

impl LendingStateMachine<SystemClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Clock> LendingStateMachine<K> {
    pub fn with_clock(clock: K) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Hands a car to a user.
    ///
    /// Writes the new borrow record, the counter, the user and the car, then publishes
    /// a [`BORROWED_TAG`] event.
    pub async fn borrow<C>(
        &self,
        ctx: &mut C,
        user_id: UserId,
        payload: &BorrowPayload,
    ) -> Result<CarBorrow, LendingError>
    where
        C: RecordStore + EventSink + ?Sized,
    {
        let request = payload.validate(user_id)?;
        debug!(user_id = %request.user_id, car_id = %request.car_id, "Borrow requested");

        let mut repo = EntityRepository::new(ctx);
        let mut user = repo
            .find::<User>(request.user_id)
            .await?
            .ok_or(LendingError::UserNotFound(request.user_id))?;
        let mut car = repo
            .find::<Car>(request.car_id)
            .await?
            .ok_or(LendingError::ResourceNotFound(request.car_id))?;
        ensure_user_available(&user)?;
        ensure_car_available(&car)?;

        let borrow_id = IdentifierAllocator::next(repo.store_mut()).await?;
        if repo.exists::<CarBorrow>(borrow_id).await? {
            return Err(LendingError::InvariantViolation(format!(
                "borrow {borrow_id} already exists, the counter is behind the records"
            )));
        }

        let borrow = CarBorrow {
            id: borrow_id,
            car_id: car.id,
            user_id: user.id,
            start_time: self.clock.now(),
        };
        user.active_borrow = Some(borrow_id);
        car.active_borrow = Some(borrow_id);
        check_pair(&user, &car)?;

        repo.save(&borrow).await?;
        repo.save(&user).await?;
        repo.save(&car).await?;

        publish_json(
            repo.store(),
            BORROWED_TAG,
            &CarBorrowed {
                user_id: user.id,
                car_id: car.id,
                borrow_id,
            },
        );
        info!(borrow_id = %borrow_id, user_id = %user.id, car_id = %car.id, "Car borrowed");
        Ok(borrow)
    }

    /// Takes a car back from a user and writes the travel log for the episode.
    ///
    /// Checks run in this order: the user exists, the user holds a borrow, the payload
    /// is valid, the borrow record is sound, the user, car and borrow agree, and the
    /// reading has not gone backwards.
    pub async fn return_car<C>(
        &self,
        ctx: &mut C,
        user_id: UserId,
        payload: &ReturnPayload,
    ) -> Result<TravelLog, LendingError>
    where
        C: RecordStore + EventSink + ?Sized,
    {
        let mut repo = EntityRepository::new(ctx);
        let mut user = repo
            .find::<User>(user_id)
            .await?
            .ok_or(LendingError::UserNotFound(user_id))?;
        let borrow_id = user
            .active_borrow
            .ok_or(LendingError::NoActiveBorrow(user_id))?;
        let request = payload.validate()?;
        debug!(user_id = %user_id, borrow_id = %borrow_id, new_km = request.end_reading, "Return requested");

        let borrow = match repo.find::<CarBorrow>(borrow_id).await {
            Ok(Some(borrow)) if borrow.car_id.is_valid() => borrow,
            Ok(Some(_)) => {
                return Err(LendingError::BorrowRecordCorrupt {
                    borrow: borrow_id,
                    reason: "it names no car".into(),
                })
            }
            Ok(None) => {
                return Err(LendingError::BorrowRecordCorrupt {
                    borrow: borrow_id,
                    reason: "it does not exist".into(),
                })
            }
            Err(RepositoryError::Codec { reason, .. }) => {
                return Err(LendingError::BorrowRecordCorrupt {
                    borrow: borrow_id,
                    reason,
                })
            }
            Err(e) => return Err(e.into()),
        };

        let mut car = repo.find::<Car>(borrow.car_id).await?.ok_or_else(|| {
            LendingError::InvariantViolation(format!(
                "borrow {borrow_id} names car {}, which does not exist",
                borrow.car_id
            ))
        })?;
        ensure_linked(&user, &car, &borrow)?;
        if repo.exists::<TravelLog>(borrow_id).await? {
            return Err(LendingError::InvariantViolation(format!(
                "borrow {borrow_id} is still active but already has a travel log"
            )));
        }

        if request.end_reading < car.odometer {
            return Err(LendingError::ReadingRegressed {
                car: car.id,
                odometer: car.odometer,
                reading: request.end_reading,
            });
        }
        let driven_km = request.end_reading - car.odometer;

        let log = TravelLog {
            id: borrow.id,
            user_id: user.id,
            car_id: car.id,
            usage: request.usage,
            start_km: car.odometer,
            end_km: request.end_reading,
            driven_km,
            start_time: borrow.start_time,
            end_time: self.clock.now(),
        };
        user.active_borrow = None;
        car.active_borrow = None;
        car.odometer = request.end_reading;
        check_pair(&user, &car)?;

        repo.save(&log).await?;
        repo.save(&user).await?;
        repo.save(&car).await?;

        publish_json(
            repo.store(),
            RETURNED_TAG,
            &CarReturned {
                user_id: user.id,
                car_id: car.id,
                travel_log_id: log.id,
                driven_km,
            },
        );
        info!(borrow_id = %log.id, user_id = %user.id, car_id = %car.id, driven_km, "Car returned");
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lending::{ErrorKind, FixedClock};
    use crate::model::{BorrowId, CarId, Timestamp};
    use crate::repository::COUNTER_KEY;
    use ledger_framework::{KeyValue, LedgerActor, LedgerClient, Transaction};

    async fn seeded() -> LedgerClient {
        let (actor, client) = LedgerActor::new(16);
        tokio::spawn(actor.run());
        let mut tx = Transaction::begin(client.clone());
        {
            let mut repo = EntityRepository::new(&mut tx);
            repo.save(&User::new(UserId(1), "Alice")).await.unwrap();
            repo.save(&User::new(UserId(2), "Bob")).await.unwrap();
            repo.save(&Car::new(CarId(1), 1000)).await.unwrap();
            repo.save(&Car::new(CarId(2), 1500)).await.unwrap();
        }
        tx.put(COUNTER_KEY, b"0".to_vec()).await.unwrap();
        tx.commit().await.unwrap();
        client
    }

    fn machine() -> LendingStateMachine<FixedClock> {
        LendingStateMachine::with_clock(FixedClock::new(
            Timestamp::parse("2024-06-01 08:00:00").unwrap(),
        ))
    }

    async fn snapshot(client: &LedgerClient) -> Vec<KeyValue> {
        client.scan("", "").await.unwrap()
    }

    /// Runs `borrow` in its own transaction and commits it when it succeeds.
    async fn borrow(
        client: &LedgerClient,
        machine: &LendingStateMachine<FixedClock>,
        user: u64,
        car: u64,
    ) -> Result<CarBorrow, LendingError> {
        let mut tx = Transaction::begin(client.clone());
        let result = machine
            .borrow(&mut tx, UserId(user), &BorrowPayload::new(CarId(car)))
            .await;
        if result.is_ok() {
            tx.commit().await.unwrap();
        }
        result
    }

    async fn give_back(
        client: &LedgerClient,
        machine: &LendingStateMachine<FixedClock>,
        user: u64,
        payload: ReturnPayload,
    ) -> Result<TravelLog, LendingError> {
        let mut tx = Transaction::begin(client.clone());
        let result = machine.return_car(&mut tx, UserId(user), &payload).await;
        if result.is_ok() {
            tx.commit().await.unwrap();
        }
        result
    }

    #[tokio::test]
    async fn test_borrow_links_user_and_car() {
        let client = seeded().await;
        let machine = machine();

        let record = borrow(&client, &machine, 1, 2).await.unwrap();
        assert_eq!(record.id, BorrowId(1));
        assert_eq!(record.start_time.to_string(), "2024-06-01 08:00:00");

        let mut store = client.clone();
        let repo = EntityRepository::new(&mut store);
        let user: User = repo.load(UserId(1)).await.unwrap();
        let car: Car = repo.load(CarId(2)).await.unwrap();
        assert_eq!(user.active_borrow, Some(BorrowId(1)));
        assert_eq!(car.active_borrow, Some(BorrowId(1)));
        assert_eq!(repo.load::<CarBorrow>(BorrowId(1)).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_borrow_publishes_into_transaction() {
        let client = seeded().await;
        let mut tx = Transaction::begin(client.clone());
        machine()
            .borrow(&mut tx, UserId(1), &BorrowPayload::new(CarId(1)))
            .await
            .unwrap();

        let events = tx.pending_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tag, BORROWED_TAG);
        let detail: CarBorrowed = serde_json::from_slice(&events[0].detail).unwrap();
        assert_eq!(detail.borrow_id, BorrowId(1));
    }

    #[tokio::test]
    async fn test_borrow_rejections_leave_state_unchanged() {
        let client = seeded().await;
        let machine = machine();
        borrow(&client, &machine, 1, 1).await.unwrap();
        let before = snapshot(&client).await;

        let cases = [
            (2, 1, ErrorKind::ResourceAlreadyBorrowed),
            (1, 2, ErrorKind::UserAlreadyBorrowing),
            (9, 2, ErrorKind::UserNotFound),
            (2, 9, ErrorKind::ResourceNotFound),
            (2, 0, ErrorKind::InvalidArgument),
            (0, 2, ErrorKind::InvalidArgument),
        ];
        for (user, car, expected) in cases {
            let err = borrow(&client, &machine, user, car).await.unwrap_err();
            assert_eq!(err.kind(), expected, "user {user} car {car}");
        }
        assert_eq!(snapshot(&client).await, before);
    }

    #[tokio::test]
    async fn test_user_check_precedes_car_check() {
        let client = seeded().await;
        let machine = machine();
        borrow(&client, &machine, 1, 1).await.unwrap();

        // User 1 already borrows and car 1 is taken: the user rule wins.
        let err = borrow(&client, &machine, 1, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserAlreadyBorrowing);
    }

    #[tokio::test]
    async fn test_round_trip_writes_travel_log() {
        let client = seeded().await;
        let machine = machine();
        borrow(&client, &machine, 1, 2).await.unwrap();
        machine.clock().advance_secs(3600);

        let log = give_back(&client, &machine, 1, ReturnPayload::new(1550, "commute"))
            .await
            .unwrap();
        assert_eq!(log.id, BorrowId(1));
        assert_eq!((log.start_km, log.end_km, log.driven_km), (1500, 1550, 50));
        assert_eq!(log.start_time.to_string(), "2024-06-01 08:00:00");
        assert_eq!(log.end_time.to_string(), "2024-06-01 09:00:00");

        let mut store = client.clone();
        let repo = EntityRepository::new(&mut store);
        let user: User = repo.load(UserId(1)).await.unwrap();
        let car: Car = repo.load(CarId(2)).await.unwrap();
        assert!(user.is_available());
        assert!(car.is_available());
        assert_eq!(car.odometer, 1550);
        assert_eq!(repo.load::<TravelLog>(BorrowId(1)).await.unwrap(), log);
        // The borrow record stays as history.
        assert!(repo.exists::<CarBorrow>(BorrowId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_return_with_same_reading_drives_zero() {
        let client = seeded().await;
        let machine = machine();
        borrow(&client, &machine, 2, 1).await.unwrap();

        let log = give_back(&client, &machine, 2, ReturnPayload::new(1000, "parked"))
            .await
            .unwrap();
        assert_eq!(log.driven_km, 0);
    }

    #[tokio::test]
    async fn test_return_error_order() {
        let client = seeded().await;
        let machine = machine();
        let garbage = ReturnPayload::parse("not json");

        let err = give_back(&client, &machine, 9, garbage.clone()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserNotFound);

        let err = give_back(&client, &machine, 1, garbage.clone()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoActiveBorrow);

        borrow(&client, &machine, 1, 1).await.unwrap();
        let err = give_back(&client, &machine, 1, garbage).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_regressed_reading_is_rejected() {
        let client = seeded().await;
        let machine = machine();
        borrow(&client, &machine, 1, 1).await.unwrap();
        let before = snapshot(&client).await;

        let err = give_back(&client, &machine, 1, ReturnPayload::new(999, "reverse"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadingRegressed);
        assert_eq!(snapshot(&client).await, before);
    }

    #[tokio::test]
    async fn test_missing_borrow_record_is_corrupt() {
        let mut client = seeded().await;
        let machine = machine();
        borrow(&client, &machine, 1, 1).await.unwrap();
        client.delete("borrow1").await.unwrap();

        let err = give_back(&client, &machine, 1, ReturnPayload::new(1200, "x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BorrowRecordCorrupt);
    }

    #[tokio::test]
    async fn test_diverged_car_is_invariant_violation() {
        let client = seeded().await;
        let machine = machine();
        borrow(&client, &machine, 1, 1).await.unwrap();

        let mut store = client.clone();
        let mut repo = EntityRepository::new(&mut store);
        let mut car: Car = repo.load(CarId(1)).await.unwrap();
        car.active_borrow = Some(BorrowId(77));
        repo.save(&car).await.unwrap();
        let before = snapshot(&client).await;

        let err = give_back(&client, &machine, 1, ReturnPayload::new(1200, "x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(err.is_integrity_failure());
        assert_eq!(snapshot(&client).await, before);
    }

    #[tokio::test]
    async fn test_ids_increase_across_returns() {
        let client = seeded().await;
        let machine = machine();

        let mut issued = Vec::new();
        for _ in 0..3 {
            issued.push(borrow(&client, &machine, 1, 1).await.unwrap().id.get());
            give_back(&client, &machine, 1, ReturnPayload::new(2000, "loop"))
                .await
                .unwrap();
            issued.push(borrow(&client, &machine, 2, 2).await.unwrap().id.get());
            give_back(&client, &machine, 2, ReturnPayload::new(2000, "loop"))
                .await
                .unwrap();
        }
        assert_eq!(issued, vec![1, 2, 3, 4, 5, 6]);
    }
}
