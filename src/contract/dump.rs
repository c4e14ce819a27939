//! Raw views of the whole key space, for inspecting a ledger by hand.

use crate::contract::args::{expect_args, ok_json, storage_failure, HandlerResult};
use ledger_framework::{KeyValue, RecordStore, Response};
use serde_json::{Map, Value};

async fn everything<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<KeyValue>, Response> {
    store
        .scan("", "")
        .await
        .map_err(|e| storage_failure(e.into()))
}

/// Stored JSON stays structured; anything else comes back as a string.
fn value_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// `{"ids": [...]}`, every key in order.
pub async fn all_keys<S: RecordStore + ?Sized>(store: &mut S, args: &[String]) -> HandlerResult {
    expect_args(args, 0)?;
    let ids: Vec<String> = everything(store)
        .await?
        .into_iter()
        .map(|entry| entry.key)
        .collect();
    ok_json(&serde_json::json!({ "ids": ids }))
}

/// Every value in key order.
pub async fn all_values<S: RecordStore + ?Sized>(store: &mut S, args: &[String]) -> HandlerResult {
    expect_args(args, 0)?;
    let values: Vec<Value> = everything(store)
        .await?
        .iter()
        .map(|entry| value_of(&entry.value))
        .collect();
    ok_json(&values)
}

/// One object mapping every key to its value.
pub async fn all_data<S: RecordStore + ?Sized>(store: &mut S, args: &[String]) -> HandlerResult {
    expect_args(args, 0)?;
    let data: Map<String, Value> = everything(store)
        .await?
        .into_iter()
        .map(|entry| {
            let value = value_of(&entry.value);
            (entry.key, value)
        })
        .collect();
    ok_json(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_framework::LedgerActor;

    #[tokio::test]
    async fn test_dumps_cover_every_kind() {
        let (actor, mut client) = LedgerActor::new(8);
        tokio::spawn(actor.run());
        client.put("car1", br#"{"id":1,"km":5,"borrowId":0}"#.to_vec()).await.unwrap();
        client.put("counterB", b"0".to_vec()).await.unwrap();
        client.put("note", b"plain text".to_vec()).await.unwrap();

        let keys = all_keys(&mut client, &[]).await.unwrap();
        let keys: Value = serde_json::from_slice(&keys.payload).unwrap();
        assert_eq!(keys, serde_json::json!({ "ids": ["car1", "counterB", "note"] }));

        let values = all_values(&mut client, &[]).await.unwrap();
        let values: Value = serde_json::from_slice(&values.payload).unwrap();
        assert_eq!(values[0]["km"], 5);
        assert_eq!(values[1], 0);
        assert_eq!(values[2], "plain text");

        let data = all_data(&mut client, &[]).await.unwrap();
        let data: Value = serde_json::from_slice(&data.payload).unwrap();
        assert_eq!(data["car1"]["id"], 1);
        assert_eq!(data["note"], "plain text");

        let mismatch = all_data(&mut client, &["x".to_string()]).await.unwrap_err();
        assert_eq!(mismatch.status, 400);
    }
}
