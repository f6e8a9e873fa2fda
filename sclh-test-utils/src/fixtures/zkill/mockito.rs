//! zKillboard mock endpoint creation, registered under `/zkill/`.

use mockito::Mock;
use serde_json::Value;

use crate::fixtures::zkill::{factory, ZkillFixtures};

/// Seconds in the window counted for weekly kills.
const WEEK_SECONDS: u64 = 7 * 24 * 60 * 60;

impl<'a> ZkillFixtures<'a> {
    fn create_get_endpoint(&mut self, path: &str, body: &Value, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("GET", format!("/zkill/{}", path).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(expected_requests)
            .create()
    }

    /// Create a mock for `GET /stats/characterID/{character_id}/`.
    pub fn create_character_stats_endpoint(
        &mut self,
        character_id: i64,
        stats: Value,
        expected_requests: usize,
    ) -> Mock {
        self.create_get_endpoint(
            &format!("stats/characterID/{}/", character_id),
            &stats,
            expected_requests,
        )
    }

    /// Create a mock for `GET /stats/corporationID/{corporation_id}/`.
    pub fn create_corporation_stats_endpoint(
        &mut self,
        corporation_id: i64,
        danger: i64,
        expected_requests: usize,
    ) -> Mock {
        self.create_get_endpoint(
            &format!("stats/corporationID/{}/", corporation_id),
            &factory::mock_stats(danger, 0, 0, 0),
            expected_requests,
        )
    }

    /// Create a mock for `GET /characterID/{character_id}/`, newest kill first.
    pub fn create_latest_activity_endpoint(
        &mut self,
        character_id: i64,
        killmail_ids: &[i64],
        expected_requests: usize,
    ) -> Mock {
        self.create_get_endpoint(
            &format!("characterID/{}/", character_id),
            &factory::mock_kill_references(killmail_ids),
            expected_requests,
        )
    }

    /// Create a mock for `GET /kills/characterID/{character_id}/`.
    pub fn create_kills_endpoint(
        &mut self,
        character_id: i64,
        killmail_ids: &[i64],
        expected_requests: usize,
    ) -> Mock {
        self.create_get_endpoint(
            &format!("kills/characterID/{}/", character_id),
            &factory::mock_kill_references(killmail_ids),
            expected_requests,
        )
    }

    /// Create a mock for `GET /kills/characterID/{character_id}/pastSeconds/604800/`.
    pub fn create_weekly_kills_endpoint(
        &mut self,
        character_id: i64,
        killmail_ids: &[i64],
        expected_requests: usize,
    ) -> Mock {
        self.create_get_endpoint(
            &format!(
                "kills/characterID/{}/pastSeconds/{}/",
                character_id, WEEK_SECONDS
            ),
            &factory::mock_kill_references(killmail_ids),
            expected_requests,
        )
    }
}
