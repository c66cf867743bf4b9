use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Body of `POST /decode/authenticator-data`
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorDataRequest {
    pub authenticator_data: String, // Base64URL-encoded authenticator data
}

/// Body of `POST /decode/client-data`
#[derive(Serialize, Deserialize, Debug)]
pub struct ClientDataRequest {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String, // Base64URL-encoded client data JSON
}

/// Error body returned for any decoding failure
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
