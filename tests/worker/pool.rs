use sclh::{
    model::stream::{BatchMessage, StreamMarker},
    server::{
        config::Config,
        worker::{BatchPool, BatchPoolConfig, BatchSummary},
    },
};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

use super::*;

fn pool(test: &TestSetup, config: &Config) -> BatchPool {
    test.app_state(config).pool
}

/// Expect every profile of a batch to arrive between the markers with more names than workers
#[tokio::test]
async fn batch_larger_than_worker_count_completes() {
    let mut test = TestSetup::new().await;
    let characters = [
        (201, "Alpha One"),
        (202, "Bravo Two"),
        (203, "Charlie Three"),
        (204, "Delta Four"),
        (205, "Echo Five"),
    ];
    let ids = test.esi().create_universe_ids_endpoint(&characters, 1);
    test.track(ids);
    for (offset, (character_id, name)) in characters.iter().enumerate() {
        test.mock_quiet_character(*character_id, name, TEST_CORPORATION_ID + offset as i64);
    }

    let config = Config {
        max_workers: 2,
        ..test.config()
    };
    let names: Vec<String> = characters.iter().map(|(_, name)| name.to_string()).collect();

    let messages: Vec<BatchMessage> = pool(&test, &config)
        .stream(names, CancellationToken::new())
        .collect()
        .await;

    assert_eq!(messages.len(), 7);
    assert!(matches!(
        messages.first(),
        Some(BatchMessage::Marker(StreamMarker::Start { total: 5 }))
    ));
    assert!(matches!(
        messages.last(),
        Some(BatchMessage::Marker(StreamMarker::Done { sent: 5, total: 5 }))
    ));

    let mut ids: Vec<i64> = messages
        .iter()
        .filter_map(|message| match message {
            BatchMessage::Profile(record) => Some(record.character_id),
            BatchMessage::Marker(_) => None,
        })
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, [201, 202, 203, 204, 205]);

    test.assert_mocks();
}

/// Expect a closed stream to cancel the batch without a done marker or upstream calls
#[tokio::test]
async fn disconnected_client_cancels_batch() {
    let test = TestSetup::new().await;
    let pool = pool(&test, &test.config());

    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    let token = CancellationToken::new();

    let summary = pool
        .run(vec![TEST_CHARACTER_NAME.to_string()], tx, token.clone())
        .await;

    assert_eq!(summary, BatchSummary { sent: 0, total: 1 });
    assert!(token.is_cancelled());
}

/// Expect a batch cancelled up front to end without sending any profile
#[tokio::test]
async fn cancelled_batch_sends_no_profiles() {
    let test = TestSetup::new().await;
    let pool = pool(&test, &test.config());

    let token = CancellationToken::new();
    token.cancel();

    let messages: Vec<BatchMessage> = pool
        .stream(vec![TEST_CHARACTER_NAME.to_string()], token)
        .collect()
        .await;

    assert_eq!(messages.len(), 1);
    assert!(matches!(
        messages[0],
        BatchMessage::Marker(StreamMarker::Start { total: 1 })
    ));
}

#[test]
fn worker_count_is_bounded_by_batch_size() {
    let config = BatchPoolConfig::new(10, 100);

    assert_eq!(config.worker_count(3), 3);
    assert_eq!(config.worker_count(50), 10);
    assert_eq!(config.worker_count(0), 1);
}
