//! ESI mock endpoint creation.
//!
//! Every endpoint is registered under `/esi/` and verifies it was called exactly
//! `expected_requests` times once asserted.

use mockito::{Matcher, Mock};
use serde_json::Value;

use crate::fixtures::esi::{factory, EsiFixtures};

impl<'a> EsiFixtures<'a> {
    fn create_get_endpoint(&mut self, path: &str, body: &Value, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("GET", format!("/esi/{}", path).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(expected_requests)
            .create()
    }

    fn create_post_endpoint(&mut self, path: &str, body: &Value, expected_requests: usize) -> Mock {
        self.setup
            .server
            .mock("POST", format!("/esi/{}", path).as_str())
            .match_query(Matcher::UrlEncoded(
                "datasource".into(),
                "tranquility".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(expected_requests)
            .create()
    }

    /// Create a mock for `POST /universe/ids/` answering with `characters` whatever was asked.
    ///
    /// # Arguments
    /// - `characters` - `(id, name)` pairs returned for every request
    /// - `expected_requests` - Number of times this endpoint should be called
    pub fn create_universe_ids_endpoint(
        &mut self,
        characters: &[(i64, &str)],
        expected_requests: usize,
    ) -> Mock {
        self.create_post_endpoint(
            "universe/ids/",
            &factory::mock_universe_ids(characters),
            expected_requests,
        )
    }

    /// Create a mock for `GET /characters/{character_id}/`.
    pub fn create_character_endpoint(
        &mut self,
        character_id: i64,
        character: Value,
        expected_requests: usize,
    ) -> Mock {
        self.create_get_endpoint(
            &format!("characters/{}/", character_id),
            &character,
            expected_requests,
        )
    }

    /// Create a mock for `GET /characters/{character_id}/corporationhistory/`.
    pub fn create_corporation_history_endpoint(
        &mut self,
        character_id: i64,
        history: Value,
        expected_requests: usize,
    ) -> Mock {
        self.create_get_endpoint(
            &format!("characters/{}/corporationhistory/", character_id),
            &history,
            expected_requests,
        )
    }

    /// Create a mock for `GET /corporations/{corporation_id}/`.
    pub fn create_corporation_endpoint(
        &mut self,
        corporation_id: i64,
        name: &str,
        expected_requests: usize,
    ) -> Mock {
        self.create_get_endpoint(
            &format!("corporations/{}/", corporation_id),
            &factory::mock_named(name),
            expected_requests,
        )
    }

    /// Create a mock for `GET /alliances/{alliance_id}/`.
    pub fn create_alliance_endpoint(
        &mut self,
        alliance_id: i64,
        name: &str,
        expected_requests: usize,
    ) -> Mock {
        self.create_get_endpoint(
            &format!("alliances/{}/", alliance_id),
            &factory::mock_named(name),
            expected_requests,
        )
    }

    /// Create a mock for `GET /killmails/{killmail_id}/{hash}/`.
    pub fn create_killmail_endpoint(
        &mut self,
        killmail_id: i64,
        hash: &str,
        killmail: Value,
        expected_requests: usize,
    ) -> Mock {
        self.create_get_endpoint(
            &format!("killmails/{}/{}/", killmail_id, hash),
            &killmail,
            expected_requests,
        )
    }

    /// Create a mock for `POST /universe/names/` naming one inventory type.
    pub fn create_type_name_endpoint(
        &mut self,
        type_id: i64,
        name: &str,
        expected_requests: usize,
    ) -> Mock {
        self.create_post_endpoint(
            "universe/names/",
            &factory::mock_type_name(type_id, name),
            expected_requests,
        )
    }

    /// Create a mock for `GET /status/`.
    pub fn create_server_status_endpoint(
        &mut self,
        players: i64,
        expected_requests: usize,
    ) -> Mock {
        self.create_get_endpoint(
            "status/",
            &factory::mock_server_status(players),
            expected_requests,
        )
    }
}
