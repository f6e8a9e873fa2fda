//! Killmail coalescing and caching against a live mock server.

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use sclh::server::{
    cache::{ExpiringCache, RequestCoalescer},
    gateway::EsiGateway,
    model::{
        esi::Killmail,
        zkill::{KillReference, KillReferenceInfo},
    },
    service::killmail::KillAnalyzer,
    startup,
};

use super::*;

fn esi_gateway(test: &TestSetup) -> EsiGateway {
    let (esi, _) = startup::build_gateways(&test.config()).unwrap();
    esi
}

fn reference(killmail_id: i64) -> KillReference {
    KillReference {
        killmail_id,
        zkb: KillReferenceInfo {
            hash: TEST_KILLMAIL_HASH.to_string(),
        },
    }
}

fn killmail_coalescer(ttl: Duration) -> RequestCoalescer<Killmail> {
    RequestCoalescer::new(Arc::new(ExpiringCache::with_ttl(ttl)))
}

/// Expect concurrent requests for one killmail to reach ESI once
#[tokio::test]
async fn concurrent_fetches_hit_upstream_once() {
    let mut test = TestSetup::new().await;
    let killmail = test.esi().create_killmail_endpoint(
        1001,
        TEST_KILLMAIL_HASH,
        esi_factory::mock_killmail("2024-05-01T12:00:00Z", 605, &[(TEST_CHARACTER_ID, 11176)]),
        1,
    );
    test.track(killmail);

    let esi = esi_gateway(&test);
    let killmails = killmail_coalescer(Duration::from_secs(60));
    let analyzer = KillAnalyzer::new(&esi, &killmails, 10);
    let token = CancellationToken::new();
    let reference = reference(1001);

    let results = join_all((0..8).map(|_| analyzer.fetch_killmail(&reference, &token))).await;

    let first = results[0].as_ref().unwrap();
    assert_eq!(first.victim.ship_type_id, 605);
    for result in &results {
        assert_eq!(result.as_ref().unwrap(), first);
    }

    test.assert_mocks();
}

/// Expect a killmail to be fetched again once its cache entry expires
#[tokio::test]
async fn expired_killmail_is_refetched() {
    let mut test = TestSetup::new().await;
    let killmail = test.esi().create_killmail_endpoint(
        1001,
        TEST_KILLMAIL_HASH,
        esi_factory::mock_killmail("2024-05-01T12:00:00Z", 605, &[(TEST_CHARACTER_ID, 11176)]),
        2,
    );
    test.track(killmail);

    let esi = esi_gateway(&test);
    let killmails = killmail_coalescer(Duration::from_millis(200));
    let analyzer = KillAnalyzer::new(&esi, &killmails, 10);
    let token = CancellationToken::new();
    let reference = reference(1001);

    analyzer.fetch_killmail(&reference, &token).await.unwrap();
    analyzer.fetch_killmail(&reference, &token).await.unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;

    analyzer.fetch_killmail(&reference, &token).await.unwrap();

    test.assert_mocks();
}

/// Expect a killmail that fails to load to be left out of the tally
#[tokio::test]
async fn analysis_skips_unavailable_killmails() {
    let mut test = TestSetup::new().await;
    let available = test.esi().create_killmail_endpoint(
        1001,
        TEST_KILLMAIL_HASH,
        esi_factory::mock_killmail("2024-05-01T12:00:00Z", 605, &[(TEST_CHARACTER_ID, 11176)]),
        1,
    );
    test.track(available);
    let missing = test
        .server
        .mock("GET", "/esi/killmails/1002/abc123/")
        .with_status(404)
        .expect(1)
        .create();
    test.track(missing);

    let esi = esi_gateway(&test);
    let killmails = killmail_coalescer(Duration::from_secs(60));
    let analyzer = KillAnalyzer::new(&esi, &killmails, 1);

    let tally = analyzer
        .analyze(
            TEST_CHARACTER_ID,
            &[reference(1001), reference(1002)],
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(tally.recent_kill_total, 2);
    assert_eq!(tally.explorer_total, 1);
    assert_eq!(tally.favorite_ship(), Some((11176, 1)));
    assert!(killmails.cache().get("1002:abc123").is_none());

    test.assert_mocks();
}

/// Expect a cancelled analysis to stop with Cancelled instead of a partial tally
#[tokio::test]
async fn cancelled_analysis_is_an_error() {
    let test = TestSetup::new().await;

    let esi = esi_gateway(&test);
    let killmails = killmail_coalescer(Duration::from_secs(60));
    let analyzer = KillAnalyzer::new(&esi, &killmails, 10);
    let token = CancellationToken::new();
    token.cancel();

    let result = analyzer
        .analyze(TEST_CHARACTER_ID, &[reference(1001)], &token)
        .await;

    assert!(matches!(result, Err(sclh::server::error::Error::Cancelled)));
}
