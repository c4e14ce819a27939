use car_ledger::config::LendingConfig;
use car_ledger::lifecycle::{setup_tracing, LendingSystem, SystemError};
use car_ledger::model::{CarId, UserId};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    setup_tracing();

    let config = LendingConfig::load()?;
    let system = LendingSystem::start(config).await?;
    let client = system.client();
    let mut events = system.subscribe();

    let span = tracing::info_span!("lending", user_id = 1, car_id = 3);
    let outcome = async {
        let borrow = client.borrow_car(UserId(1), CarId(3)).await?;
        info!(borrow_id = %borrow.id, start = %borrow.start_time, "Car borrowed");

        let log = client.return_car(UserId(1), 1850, "commute").await?;
        info!(borrow_id = %log.id, driven_km = log.driven_km, "Car returned");
        Ok::<_, car_ledger::clients::ClientError>(log)
    }
    .instrument(span)
    .await;

    match outcome {
        Ok(log) => match serde_json::to_string_pretty(&log) {
            Ok(json) => println!("{json}"),
            Err(e) => error!(error = %e, "Cannot print travel log"),
        },
        Err(e) => error!(error = %e, "Lending demo failed"),
    }

    while let Ok(event) = events.try_recv() {
        info!(tag = %event.tag, detail = %event.detail_str(), "Event");
    }

    drop(client);
    system.shutdown().await
}
