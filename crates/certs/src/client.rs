use {
    crate::*,
    serde::{Deserialize, Serialize},
};

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddRequest<'a> {
    user_id: &'a Id,
    encrypted_data: &'a str,
}

#[derive(Deserialize)]
struct ErrorReply {
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the certificate portal.
///
/// Clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }
}

impl Authenticator for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let response = self
            .http
            .post(self.url("/api/login"))
            .json(&LoginRequest {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(|e| ApiError::Connect(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Connect(e.to_string()))?;

        match serde_json::from_str::<LoginReply>(&body) {
            Ok(reply) if status.is_success() && reply.success => {
                let user = reply
                    .user
                    .ok_or_else(|| ApiError::Decode("login reply without user".to_string()))?;
                log::info!("logged in as {} ({})", user.name, user.id);
                Ok(user)
            }
            Ok(reply) => {
                log::warn!("login refused with status {}", status);
                Err(ApiError::Rejected(
                    reply.message.unwrap_or_else(|| LOGIN_FAILED.to_string()),
                ))
            }
            Err(error) if status.is_success() => Err(error.into()),
            Err(_) => {
                log::warn!("login refused with status {}", status);
                Err(ApiError::Rejected(LOGIN_FAILED.to_string()))
            }
        }
    }
}

impl CertificateSource for ApiClient {
    async fn list(&self, user: &User) -> Result<Vec<Certificate>, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/api/certificates/{}", user.id)))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("listing certificates failed with status {}", status);
            return Err(ApiError::Status {
                code: status.as_u16(),
                message: FETCH_FAILED.to_string(),
            });
        }
        let certificates = response.json::<Vec<Certificate>>().await?;
        log::debug!("{} certificates for user {}", certificates.len(), user.id);
        Ok(certificates)
    }
}

impl CertificateIngestion for ApiClient {
    async fn ingest(&self, user: &User, encrypted_data: &str) -> Result<Certificate, ApiError> {
        let response = self
            .http
            .post(self.url("/api/certificates"))
            .json(&AddRequest {
                user_id: &user.id,
                encrypted_data,
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let certificate = serde_json::from_str::<Certificate>(&body)?;
            log::info!("added certificate {} for {}", certificate.id, certificate.device_name);
            return Ok(certificate);
        }

        log::warn!("adding certificate failed with status {}", status);
        let message = serde_json::from_str::<ErrorReply>(&body)
            .ok()
            .and_then(|reply| reply.error)
            .unwrap_or_else(|| ADD_FAILED.to_string());
        Err(ApiError::Rejected(message))
    }
}
