use sclh::server::{config::Config, error::Error};

use super::*;

const FAVORITE_SHIP_ID: i64 = 11176;
const HERON_TYPE_ID: i64 = 605;
const RIFTER_TYPE_ID: i64 = 587;

/// Register a character in an alliance with two recent kills, the second of them latest.
fn mock_active_character(test: &mut TestSetup) {
    let mocks = [
        test.esi().create_universe_ids_endpoint(&[(TEST_CHARACTER_ID, TEST_CHARACTER_NAME)], 1),
        test.esi().create_character_endpoint(
            TEST_CHARACTER_ID,
            esi_factory::mock_character(
                TEST_CHARACTER_NAME,
                TEST_CORPORATION_ID,
                Some(TEST_ALLIANCE_ID),
            ),
            1,
        ),
        test.esi().create_corporation_history_endpoint(
            TEST_CHARACTER_ID,
            esi_factory::mock_corporation_history(TEST_CORPORATION_ID, "2020-06-15T00:00:00Z"),
            1,
        ),
        test.esi()
            .create_corporation_endpoint(TEST_CORPORATION_ID, TEST_CORPORATION_NAME, 1),
        test.esi()
            .create_alliance_endpoint(TEST_ALLIANCE_ID, TEST_ALLIANCE_NAME, 1),
        test.zkill().create_character_stats_endpoint(
            TEST_CHARACTER_ID,
            zkill_factory::mock_stats(80, 20, 5, 1),
            1,
        ),
        test.zkill()
            .create_corporation_stats_endpoint(TEST_CORPORATION_ID, 42, 1),
        test.zkill()
            .create_latest_activity_endpoint(TEST_CHARACTER_ID, &[1002], 1),
        test.zkill()
            .create_kills_endpoint(TEST_CHARACTER_ID, &[1001, 1002], 1),
        test.zkill()
            .create_weekly_kills_endpoint(TEST_CHARACTER_ID, &[1002], 1),
        // Wanted by both the last kill and the kill history, fetched once
        test.esi().create_killmail_endpoint(
            1001,
            TEST_KILLMAIL_HASH,
            esi_factory::mock_killmail(
                "2024-05-01T12:00:00Z",
                HERON_TYPE_ID,
                &[(TEST_CHARACTER_ID, FAVORITE_SHIP_ID)],
            ),
            1,
        ),
        test.esi().create_killmail_endpoint(
            1002,
            TEST_KILLMAIL_HASH,
            esi_factory::mock_killmail(
                "2024-05-03T12:00:00Z",
                RIFTER_TYPE_ID,
                &[(TEST_CHARACTER_ID, FAVORITE_SHIP_ID), (555, RIFTER_TYPE_ID)],
            ),
            1,
        ),
    ];

    for mock in mocks {
        test.track(mock);
    }
}

/// Expect a character without kills to skip every killboard follow-up
#[tokio::test]
async fn builds_quiet_character() {
    let mut test = TestSetup::new().await;
    let ids = test
        .esi()
        .create_universe_ids_endpoint(&[(TEST_CHARACTER_ID, TEST_CHARACTER_NAME)], 1);
    test.track(ids);
    test.mock_quiet_character(TEST_CHARACTER_ID, TEST_CHARACTER_NAME, TEST_CORPORATION_ID);

    let config = Config {
        analyze_kills: true,
        ..test.config()
    };
    let profiles = test.profile_service(&config);

    let record = profiles
        .build_profile(TEST_CHARACTER_NAME, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(record.name, TEST_CHARACTER_NAME);
    assert_eq!(record.character_id, TEST_CHARACTER_ID);
    assert_eq!(record.security, 1.5);
    assert!(!record.has_killboard);
    assert!(!record.is_npc_corp);
    assert!(record.zkill_used);
    assert!(record.analyze_kills);
    assert_eq!(record.corp_name, TEST_CORPORATION_NAME);
    assert_eq!(record.corp_danger, 10);
    assert_eq!(record.alliance_name, "");
    assert_eq!(record.recent_kill_total, 0);
    assert!(!record.corp_age.is_empty());

    test.assert_mocks();
}

/// Expect every phase to contribute to an active character's record
#[tokio::test]
async fn builds_active_character_with_kill_analysis() {
    let mut test = TestSetup::new().await;
    mock_active_character(&mut test);
    let ship_name = test
        .esi()
        .create_type_name_endpoint(FAVORITE_SHIP_ID, "Crow", 1);
    test.track(ship_name);

    let config = Config {
        analyze_kills: true,
        favorite_ship_names: true,
        ..test.config()
    };
    let profiles = test.profile_service(&config);

    let record = profiles
        .build_profile(TEST_CHARACTER_NAME, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(record.danger, 80);
    assert_eq!(record.gang, 20);
    assert_eq!(record.kills, 5);
    assert_eq!(record.losses, 1);
    assert!(record.has_killboard);
    assert_eq!(record.alliance_id, TEST_ALLIANCE_ID);
    assert_eq!(record.alliance_name, TEST_ALLIANCE_NAME);
    assert_eq!(record.corp_danger, 42);
    assert_eq!(record.last_kill, "2024-05-03 (kill)");
    assert_eq!(record.recent_kill_total, 2);
    assert_eq!(record.recent_explorer_total, 1);
    assert_eq!(record.last_kill_time, "2024-05-03");
    assert_eq!(record.kills_last_week, 1);
    assert_eq!(record.favorite_ship_id, FAVORITE_SHIP_ID);
    assert_eq!(record.favorite_ship_count, 2);
    assert_eq!(record.favorite_ship_name, "Crow");

    test.assert_mocks();
}

/// Expect kill analysis to stay off unless enabled, while the last kill is still looked up
#[tokio::test]
async fn kill_analysis_is_opt_in() {
    let mut test = TestSetup::new().await;
    let mocks = [
        test.esi()
            .create_universe_ids_endpoint(&[(TEST_CHARACTER_ID, TEST_CHARACTER_NAME)], 1),
        test.esi().create_character_endpoint(
            TEST_CHARACTER_ID,
            esi_factory::mock_character(TEST_CHARACTER_NAME, TEST_CORPORATION_ID, None),
            1,
        ),
        test.esi().create_corporation_history_endpoint(
            TEST_CHARACTER_ID,
            esi_factory::mock_corporation_history(TEST_CORPORATION_ID, "2020-06-15T00:00:00Z"),
            1,
        ),
        test.esi()
            .create_corporation_endpoint(TEST_CORPORATION_ID, TEST_CORPORATION_NAME, 1),
        test.zkill().create_character_stats_endpoint(
            TEST_CHARACTER_ID,
            zkill_factory::mock_stats(50, 50, 3, 0),
            1,
        ),
        test.zkill()
            .create_corporation_stats_endpoint(TEST_CORPORATION_ID, 42, 1),
        test.zkill()
            .create_latest_activity_endpoint(TEST_CHARACTER_ID, &[1001], 1),
        test.zkill()
            .create_kills_endpoint(TEST_CHARACTER_ID, &[1001], 0),
        test.esi().create_killmail_endpoint(
            1001,
            TEST_KILLMAIL_HASH,
            esi_factory::mock_killmail(
                "2024-05-01T12:00:00Z",
                HERON_TYPE_ID,
                &[(TEST_CHARACTER_ID, FAVORITE_SHIP_ID)],
            ),
            1,
        ),
    ];
    for mock in mocks {
        test.track(mock);
    }

    let profiles = test.profile_service(&test.config());
    let record = profiles
        .build_profile(TEST_CHARACTER_NAME, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(record.last_kill, "2024-05-01 (kill)");
    assert!(!record.analyze_kills);
    assert_eq!(record.recent_kill_total, 0);
    assert_eq!(record.favorite_ship_id, 0);

    test.assert_mocks();
}

/// Expect characters in NPC corporations to be flagged
#[tokio::test]
async fn flags_npc_corporation() {
    let mut test = TestSetup::new().await;
    let ids = test
        .esi()
        .create_universe_ids_endpoint(&[(TEST_CHARACTER_ID, TEST_CHARACTER_NAME)], 1);
    test.track(ids);
    test.mock_quiet_character(TEST_CHARACTER_ID, TEST_CHARACTER_NAME, TEST_NPC_CORPORATION_ID);

    let profiles = test.profile_service(&test.config());
    let record = profiles
        .build_profile(TEST_CHARACTER_NAME, &CancellationToken::new())
        .await
        .unwrap();

    assert!(record.is_npc_corp);
    assert_eq!(record.corp_id, TEST_NPC_CORPORATION_ID);

    test.assert_mocks();
}

/// Expect an unknown name to fail with NotFound, tagged with the requested name
#[tokio::test]
async fn unknown_name_is_not_found() {
    let mut test = TestSetup::new().await;
    let ids = test
        .esi()
        .create_universe_ids_endpoint(&[(TEST_CHARACTER_ID, TEST_CHARACTER_NAME)], 1);
    test.track(ids);

    let profiles = test.profile_service(&test.config());
    let result = profiles
        .build_profile("Nobody Here", &CancellationToken::new())
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.name, "Nobody Here");
    assert!(matches!(err.source, Error::NotFound(ref name) if name == "Nobody Here"));

    test.assert_mocks();
}

/// Expect ESI's case-insensitive match to be accepted
#[tokio::test]
async fn name_resolution_ignores_case() {
    let mut test = TestSetup::new().await;
    let ids = test
        .esi()
        .create_universe_ids_endpoint(&[(TEST_CHARACTER_ID, TEST_CHARACTER_NAME)], 1);
    test.track(ids);

    let profiles = test.profile_service(&test.config());
    let id = profiles
        .resolve_character_id("kAT tESTER", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(id, TEST_CHARACTER_ID);

    test.assert_mocks();
}

/// Expect a second build to reuse cached ids, upstream responses and names
#[tokio::test]
async fn second_build_is_served_from_cache() {
    let mut test = TestSetup::new().await;
    let mocks = [
        test.esi()
            .create_universe_ids_endpoint(&[(TEST_CHARACTER_ID, TEST_CHARACTER_NAME)], 1),
        test.esi().create_character_endpoint(
            TEST_CHARACTER_ID,
            esi_factory::mock_character(TEST_CHARACTER_NAME, TEST_CORPORATION_ID, None),
            1,
        ),
        // Corporation history isn't cached
        test.esi().create_corporation_history_endpoint(
            TEST_CHARACTER_ID,
            esi_factory::mock_corporation_history(TEST_CORPORATION_ID, "2020-06-15T00:00:00Z"),
            2,
        ),
        test.esi()
            .create_corporation_endpoint(TEST_CORPORATION_ID, TEST_CORPORATION_NAME, 1),
        test.zkill().create_character_stats_endpoint(
            TEST_CHARACTER_ID,
            zkill_factory::mock_stats(0, 0, 0, 0),
            1,
        ),
        test.zkill()
            .create_corporation_stats_endpoint(TEST_CORPORATION_ID, 10, 1),
    ];
    for mock in mocks {
        test.track(mock);
    }

    let profiles = test.profile_service(&test.config());
    let token = CancellationToken::new();
    let first = profiles
        .build_profile(TEST_CHARACTER_NAME, &token)
        .await
        .unwrap();
    let second = profiles
        .build_profile(TEST_CHARACTER_NAME, &token)
        .await
        .unwrap();

    assert_eq!(first, second);

    test.assert_mocks();
}

/// Expect an upstream failure in the first phase to fail the whole build
#[tokio::test]
async fn upstream_failure_fails_build() {
    let mut test = TestSetup::new().await;
    let ids = test
        .esi()
        .create_universe_ids_endpoint(&[(TEST_CHARACTER_ID, TEST_CHARACTER_NAME)], 1);
    test.track(ids);
    let character = test
        .server
        .mock("GET", "/esi/characters/123/")
        .with_status(503)
        .expect(1)
        .create();
    test.track(character);
    // Siblings of the failing request may or may not go out before it fails
    let _siblings = [
        test.server
            .mock("GET", "/zkill/stats/characterID/123/")
            .with_status(200)
            .with_body(zkill_factory::mock_stats(0, 0, 0, 0).to_string())
            .expect_at_most(1)
            .create(),
        test.server
            .mock("GET", "/esi/characters/123/corporationhistory/")
            .with_status(200)
            .with_body(
                esi_factory::mock_corporation_history(TEST_CORPORATION_ID, TEST_BIRTHDAY)
                    .to_string(),
            )
            .expect_at_most(1)
            .create(),
    ];

    let profiles = test.profile_service(&test.config());
    let err = profiles
        .build_profile(TEST_CHARACTER_NAME, &CancellationToken::new())
        .await
        .unwrap_err();

    match err.source {
        Error::UpstreamError(upstream) => assert_eq!(upstream.status(), Some(503)),
        other => panic!("expected upstream error, got {:?}", other),
    }
    assert!(profiles.caches().esi_responses.get("123").is_none());

    test.assert_mocks();
}

/// Expect a hard failure in the second phase to fail the build without a partial record
#[tokio::test]
async fn second_phase_failure_fails_build() {
    let mut test = TestSetup::new().await;
    let mocks = [
        test.esi().create_universe_ids_endpoint(&[(TEST_CHARACTER_ID, TEST_CHARACTER_NAME)], 1),
        test.esi().create_character_endpoint(
            TEST_CHARACTER_ID,
            esi_factory::mock_character(TEST_CHARACTER_NAME, TEST_CORPORATION_ID, None),
            1,
        ),
        test.esi().create_corporation_history_endpoint(
            TEST_CHARACTER_ID,
            esi_factory::mock_corporation_history(TEST_CORPORATION_ID, "2020-06-15T00:00:00Z"),
            1,
        ),
        test.zkill().create_character_stats_endpoint(
            TEST_CHARACTER_ID,
            zkill_factory::mock_stats(0, 0, 0, 0),
            1,
        ),
        test.server
            .mock("GET", format!("/esi/corporations/{}/", TEST_CORPORATION_ID).as_str())
            .with_status(500)
            .expect(1)
            .create(),
    ];
    for mock in mocks {
        test.track(mock);
    }
    // Runs alongside the failing corporation lookup and may be dropped before it goes out
    let _corporation_stats = test
        .server
        .mock(
            "GET",
            format!("/zkill/stats/corporationID/{}/", TEST_CORPORATION_ID).as_str(),
        )
        .with_status(200)
        .with_body(zkill_factory::mock_stats(10, 0, 0, 0).to_string())
        .expect_at_most(1)
        .create();

    let profiles = test.profile_service(&test.config());
    let err = profiles
        .build_profile(TEST_CHARACTER_NAME, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.name, TEST_CHARACTER_NAME);
    match err.source {
        Error::UpstreamError(upstream) => assert_eq!(upstream.status(), Some(500)),
        other => panic!("expected upstream error, got {:?}", other),
    }

    test.assert_mocks();
}

/// Expect preloading to resolve a whole batch with one request
#[tokio::test]
async fn preload_resolves_batch_in_one_request() {
    let mut test = TestSetup::new().await;
    let ids = test.esi().create_universe_ids_endpoint(
        &[(123, "Alpha One"), (124, "Bravo Two"), (125, "Charlie Three")],
        1,
    );
    test.track(ids);

    let profiles = test.profile_service(&test.config());
    let token = CancellationToken::new();
    let names: Vec<String> = ["Alpha One", "Bravo Two", "Charlie Three", "Nobody Here"]
        .iter()
        .map(|name| name.to_string())
        .collect();

    let resolved = profiles.preload_character_ids(&names, &token).await.unwrap();

    assert_eq!(resolved, 3);
    assert_eq!(profiles.caches().character_ids.get("Bravo Two"), Some(124));
    assert_eq!(
        profiles
            .resolve_character_id("Charlie Three", &token)
            .await
            .unwrap(),
        125
    );

    test.assert_mocks();
}

/// Expect characters with a nickname to be shown under it
#[tokio::test]
async fn nickname_replaces_display_name() {
    let mut test = TestSetup::new().await;
    let ids = test
        .esi()
        .create_universe_ids_endpoint(&[(TEST_CHARACTER_ID, "Portia Tigana")], 1);
    test.track(ids);
    test.mock_quiet_character(TEST_CHARACTER_ID, "Portia Tigana", TEST_CORPORATION_ID);

    let profiles = test.profile_service(&test.config());
    let record = profiles
        .build_profile("Portia Tigana", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(record.name, "Tiggs");
    assert_eq!(record.character_id, TEST_CHARACTER_ID);

    test.assert_mocks();
}
