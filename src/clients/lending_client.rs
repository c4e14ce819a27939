use crate::clients::ClientError;
use crate::contract::CarLedger;
use crate::lending::{BorrowPayload, Clock, ReturnPayload, SystemClock};
use crate::model::{BorrowId, Car, CarBorrow, CarId, TravelLog, User, UserId};
use ledger_framework::{status, LedgerHost, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

/// Typed access to the car ledger.
///
/// Each method is one contract invocation, so it commits atomically or not at all.
/// Cheap to clone.
pub struct LendingClient<K: Clock = SystemClock> {
    host: LedgerHost<CarLedger<K>>,
}

impl<K: Clock> Clone for LendingClient<K> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
        }
    }
}

impl<K: Clock> LendingClient<K> {
    pub fn new(host: LedgerHost<CarLedger<K>>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &LedgerHost<CarLedger<K>> {
        &self.host
    }

    /// Invokes `function` and returns the raw response, successful or not.
    pub async fn invoke(&self, function: &str, args: &[&str]) -> Response {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        self.host.invoke(function, &args).await
    }

    async fn call<T: DeserializeOwned>(&self, function: &str, args: &[&str]) -> Result<T, ClientError> {
        let response = self.invoke(function, args).await;
        if !response.is_success() {
            return Err(response.into());
        }
        serde_json::from_slice(&response.payload).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Like [`call`](Self::call) but maps 404 to `None`.
    async fn lookup<T: DeserializeOwned>(
        &self,
        function: &str,
        id: u64,
    ) -> Result<Option<T>, ClientError> {
        match self.call(function, &[&id.to_string()]).await {
            Err(ClientError::Rejected {
                status: status::NOT_FOUND,
                ..
            }) => Ok(None),
            other => other.map(Some),
        }
    }

    #[instrument(skip(self))]
    pub async fn borrow_car(&self, user_id: UserId, car_id: CarId) -> Result<CarBorrow, ClientError> {
        debug!("Sending request");
        let payload = json(BorrowPayload::new(car_id).to_json())?;
        self.call("userBorrowACar", &[&user_id.to_string(), &payload])
            .await
    }

    #[instrument(skip(self))]
    pub async fn return_car(
        &self,
        user_id: UserId,
        end_km: u64,
        usage: &str,
    ) -> Result<TravelLog, ClientError> {
        debug!("Sending request");
        let payload = json(ReturnPayload::new(end_km, usage).to_json())?;
        self.call("userReturnACar", &[&user_id.to_string(), &payload])
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_car(&self, id: CarId) -> Result<Option<Car>, ClientError> {
        self.lookup("getCarById", id.get()).await
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, ClientError> {
        self.lookup("getUserById", id.get()).await
    }

    #[instrument(skip(self))]
    pub async fn get_borrow(&self, id: BorrowId) -> Result<Option<CarBorrow>, ClientError> {
        self.lookup("getBorrowLogById", id.get()).await
    }

    #[instrument(skip(self))]
    pub async fn get_travel_log(&self, id: BorrowId) -> Result<Option<TravelLog>, ClientError> {
        self.lookup("getTravelLogById", id.get()).await
    }

    #[instrument(skip(self))]
    pub async fn all_cars(&self) -> Result<Vec<Car>, ClientError> {
        self.call("getAllCars", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn all_users(&self) -> Result<Vec<User>, ClientError> {
        self.call("getAllUser", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn all_borrows(&self) -> Result<Vec<CarBorrow>, ClientError> {
        self.call("getAllBorrowLogs", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn all_travel_logs(&self) -> Result<Vec<TravelLog>, ClientError> {
        self.call("getAllTravelLogs", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn travel_logs_for_user(&self, user_id: UserId) -> Result<Vec<TravelLog>, ClientError> {
        self.call("getAllTravelLogsForUser", &[&user_id.to_string()])
            .await
    }

    #[instrument(skip(self))]
    pub async fn create_car(&self, car: &Car) -> Result<Car, ClientError> {
        debug!("Sending request");
        self.call("createCar", &[&car.id.to_string(), &encode(car)?])
            .await
    }

    #[instrument(skip(self))]
    pub async fn update_car(&self, car: &Car) -> Result<Car, ClientError> {
        debug!("Sending request");
        self.call("updateCar", &[&car.id.to_string(), &encode(car)?])
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_car(&self, id: CarId) -> Result<Car, ClientError> {
        self.call("deleteCar", &[&id.to_string()]).await
    }

    #[instrument(skip(self))]
    pub async fn create_user(&self, user: &User) -> Result<User, ClientError> {
        debug!("Sending request");
        self.call("createUser", &[&user.id.to_string(), &encode(user)?])
            .await
    }

    #[instrument(skip(self))]
    pub async fn update_user(&self, user: &User) -> Result<User, ClientError> {
        debug!("Sending request");
        self.call("updateUser", &[&user.id.to_string(), &encode(user)?])
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<User, ClientError> {
        self.call("deleteUser", &[&id.to_string()]).await
    }
}

fn json(payload: Option<String>) -> Result<String, ClientError> {
    payload.ok_or_else(|| ClientError::Decode("payload cannot be encoded".to_string()))
}

fn encode<T: Serialize>(value: &T) -> Result<String, ClientError> {
    serde_json::to_string(value).map_err(|e| ClientError::Decode(e.to_string()))
}
