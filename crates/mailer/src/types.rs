use serde::Serialize;
use serde_json::Value;

/// Body of a template send call.
#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub service_id: &'a str,
    pub template_id: &'a str,
    /// Public key of the account.
    pub user_id: &'a str,
    /// Private key, required when the account enforces it.
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<&'a str>,
    pub template_params: &'a Value,
}
