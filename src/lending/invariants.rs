//! Cross-entity consistency rules shared by both transitions.

use crate::lending::LendingError;
use crate::model::{Car, CarBorrow, User};

/// A user may hold at most one borrow.
pub fn ensure_user_available(user: &User) -> Result<(), LendingError> {
    match user.active_borrow {
        Some(borrow) => Err(LendingError::UserAlreadyBorrowing {
            user: user.id,
            borrow,
        }),
        None => Ok(()),
    }
}

/// A car may be held by at most one borrow.
pub fn ensure_car_available(car: &Car) -> Result<(), LendingError> {
    match car.active_borrow {
        Some(borrow) => Err(LendingError::ResourceAlreadyBorrowed { car: car.id, borrow }),
        None => Ok(()),
    }
}

/// The user, the car and the borrow record must all describe the same lending episode.
pub fn ensure_linked(user: &User, car: &Car, borrow: &CarBorrow) -> Result<(), LendingError> {
    if car.active_borrow != user.active_borrow {
        return Err(LendingError::InvariantViolation(format!(
            "user {} holds borrow {:?} but car {} holds {:?}",
            user.id, user.active_borrow, car.id, car.active_borrow
        )));
    }
    if borrow.user_id != user.id {
        return Err(LendingError::InvariantViolation(format!(
            "borrow {} belongs to user {}, not user {}",
            borrow.id, borrow.user_id, user.id
        )));
    }
    if borrow.car_id != car.id {
        return Err(LendingError::InvariantViolation(format!(
            "borrow {} names car {}, not car {}",
            borrow.id, borrow.car_id, car.id
        )));
    }
    Ok(())
}

/// After a transition the pair is either both available or both held by the same borrow.
pub fn check_pair(user: &User, car: &Car) -> Result<(), LendingError> {
    if user.active_borrow == car.active_borrow {
        Ok(())
    } else {
        Err(LendingError::InvariantViolation(format!(
            "transition would leave user {} at {:?} and car {} at {:?}",
            user.id, user.active_borrow, car.id, car.active_borrow
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lending::ErrorKind;
    use crate::model::{BorrowId, CarId, Timestamp, UserId};

    fn borrow(id: u64, user: u64, car: u64) -> CarBorrow {
        CarBorrow {
            id: BorrowId(id),
            car_id: CarId(car),
            user_id: UserId(user),
            start_time: Timestamp::parse("2024-01-01 00:00:00").unwrap(),
        }
    }

    #[test]
    fn test_linked_episode_passes() {
        let mut user = User::new(UserId(1), "Alice");
        let mut car = Car::new(CarId(2), 100);
        user.active_borrow = Some(BorrowId(5));
        car.active_borrow = Some(BorrowId(5));
        assert!(ensure_linked(&user, &car, &borrow(5, 1, 2)).is_ok());
        assert!(check_pair(&user, &car).is_ok());
    }

    #[test]
    fn test_mismatches_are_invariant_violations() {
        let mut user = User::new(UserId(1), "Alice");
        let mut car = Car::new(CarId(2), 100);
        user.active_borrow = Some(BorrowId(5));
        car.active_borrow = Some(BorrowId(6));
        let err = ensure_linked(&user, &car, &borrow(5, 1, 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);

        car.active_borrow = Some(BorrowId(5));
        let err = ensure_linked(&user, &car, &borrow(5, 9, 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);

        car.active_borrow = None;
        assert!(check_pair(&user, &car).is_err());
    }

    #[test]
    fn test_availability() {
        let mut user = User::new(UserId(1), "Alice");
        assert!(ensure_user_available(&user).is_ok());
        user.active_borrow = Some(BorrowId(1));
        assert_eq!(
            ensure_user_available(&user).unwrap_err().kind(),
            ErrorKind::UserAlreadyBorrowing
        );

        let mut car = Car::new(CarId(1), 0);
        car.active_borrow = Some(BorrowId(1));
        assert_eq!(
            ensure_car_available(&car).unwrap_err().kind(),
            ErrorKind::ResourceAlreadyBorrowed
        );
    }
}
