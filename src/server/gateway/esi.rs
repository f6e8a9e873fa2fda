use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::server::{
    error::{upstream::UpstreamError, Error},
    gateway::HttpGateway,
    model::esi::{
        CorporationHistoryEntry, Killmail, NamedRecord, ServerStatus, UniverseIds, UniverseName,
    },
};

/// ESI's bulk lookup endpoints need the datasource spelled out.
const DATASOURCE: [(&str, &str); 1] = [("datasource", "tranquility")];

/// Gateway to EVE Online's ESI.
#[derive(Debug, Clone)]
pub struct EsiGateway {
    http: HttpGateway,
}

impl EsiGateway {
    pub fn new(http: HttpGateway) -> Self {
        Self { http }
    }

    pub async fn get(&self, path: &str, token: &CancellationToken) -> Result<Bytes, Error> {
        self.http.get(path, &[], token).await
    }

    pub async fn post<B>(
        &self,
        path: &str,
        body: &B,
        token: &CancellationToken,
    ) -> Result<Bytes, Error>
    where
        B: serde::Serialize + ?Sized,
    {
        self.http.post(path, &DATASOURCE, body, token).await
    }

    /// Resolves character names to ids in a single request.
    ///
    /// ESI leaves names it doesn't know out of the response, and omits the `characters` key
    /// entirely if none matched.
    pub async fn character_ids(
        &self,
        names: &[String],
        token: &CancellationToken,
    ) -> Result<UniverseIds, Error> {
        self.http
            .post_json("universe/ids/", &DATASOURCE, names, token)
            .await
    }

    /// Raw public character record, cached verbatim by the caller.
    pub async fn character(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<Bytes, Error> {
        self.get(&format!("characters/{}/", character_id), token)
            .await
    }

    /// Corporation history, most recent membership first.
    pub async fn corporation_history(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<Vec<CorporationHistoryEntry>, Error> {
        self.http
            .get_json(
                &format!("characters/{}/corporationhistory/", character_id),
                &[],
                token,
            )
            .await
    }

    pub async fn corporation(
        &self,
        corporation_id: i64,
        token: &CancellationToken,
    ) -> Result<NamedRecord, Error> {
        self.http
            .get_json(&format!("corporations/{}/", corporation_id), &[], token)
            .await
    }

    pub async fn alliance(
        &self,
        alliance_id: i64,
        token: &CancellationToken,
    ) -> Result<NamedRecord, Error> {
        self.http
            .get_json(&format!("alliances/{}/", alliance_id), &[], token)
            .await
    }

    pub async fn killmail(
        &self,
        killmail_id: i64,
        hash: &str,
        token: &CancellationToken,
    ) -> Result<Killmail, Error> {
        self.http
            .get_json(&format!("killmails/{}/{}/", killmail_id, hash), &[], token)
            .await
    }

    /// Resolves ids of any kind (ship types included) to display names.
    pub async fn names(
        &self,
        ids: &[i64],
        token: &CancellationToken,
    ) -> Result<Vec<UniverseName>, Error> {
        self.http
            .post_json("universe/names/", &DATASOURCE, ids, token)
            .await
    }

    /// Resolves a single id to its display name.
    ///
    /// # Returns
    /// - `Ok(String)` - Name of the first entry ESI returned
    /// - `Err(Error::UpstreamError)` - Request failed, or ESI answered with an empty list
    pub async fn name(&self, id: i64, token: &CancellationToken) -> Result<String, Error> {
        let entries = self.names(&[id], token).await?;

        entries
            .into_iter()
            .next()
            .map(|entry| entry.name)
            .ok_or_else(|| {
                UpstreamError::UnexpectedResponse {
                    path: "universe/names/".to_string(),
                    reason: format!("no name for id {}", id),
                }
                .into()
            })
    }

    /// Tranquility server status, used as a connectivity check.
    pub async fn server_status(&self, token: &CancellationToken) -> Result<ServerStatus, Error> {
        self.http.get_json("status/", &[], token).await
    }
}
