use serde::{Deserialize, Serialize};

/// The response when an error occurs with an API request
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorDto {
    /// The error message
    pub error: String,
}

/// Form body of `POST /info`
#[derive(Debug, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct InfoRequest {
    /// Character names, one per line
    #[serde(default)]
    pub characters: String,
}

/// The response of `GET /health`
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthDto {
    pub alive: bool,
}
