use std::time::Duration;

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::TransportError;
use crate::{
    log_debug,
    models::{CropObservation, LoginRequest, LoginResponse, PredictionResult},
    prediction::Predictor,
};

const ENABLE_LOGS: bool = true;

const PREDICT_PATH: &str = "/api/predict";
const LOGIN_PATH: &str = "/api/login";
const HEALTH_PATH: &str = "/health";

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

/// HTTP client for the prediction service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        log_debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        decode(response).await
    }

    pub async fn predict(
        &self,
        observation: &CropObservation,
    ) -> Result<PredictionResult, TransportError> {
        self.post_json(PREDICT_PATH, observation).await
    }

    /// Login errors are returned as-is; there is no offline substitute.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, TransportError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post_json(LOGIN_PATH, &request).await
    }

    pub async fn health_check(&self) -> Result<bool, TransportError> {
        let response = self
            .http
            .get(self.endpoint(HEALTH_PATH))
            .timeout(self.timeout)
            .send()
            .await?;

        let body: HealthBody = decode(response).await?;
        Ok(body.status == "healthy")
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.detail)
            .and_then(|detail| detail.as_str().map(str::to_string));
        return Err(TransportError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_slice(&bytes).map_err(|err| TransportError::Decode(err.to_string()))
}

impl Predictor for ApiClient {
    async fn request(
        &self,
        observation: &CropObservation,
    ) -> Result<PredictionResult, TransportError> {
        self.predict(observation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CropType, SoilType};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    /// Answers exactly one HTTP request with `status` and `body`, handing back
    /// the raw request text.
    async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }

            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn observation() -> CropObservation {
        CropObservation {
            field_name: "East Field".into(),
            crop_type: CropType::Wheat,
            soil_type: SoilType::Clay,
            field_size: 2.5,
            soil_ph: 6.8,
            nitrogen_level: 40.0,
            phosphorus_level: 30.0,
            potassium_level: 25.0,
            irrigation_system: None,
        }
    }

    #[tokio::test]
    async fn predict_posts_json_and_parses_result() {
        let (base, server) = respond_once(
            "200 OK",
            r#"{"yieldPrediction":91,"healthScore":88,"recommendations":["Reduce irrigation"],"riskFactors":["Frost risk"]}"#,
        )
        .await;

        let client = ApiClient::new(format!("{base}/"), Duration::from_secs(5));
        let result = client.predict(&observation()).await.unwrap();
        assert_eq!(result.yield_prediction, 91.0);
        assert_eq!(result.risk_factors, vec!["Frost risk".to_string()]);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/predict HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.contains(r#""fieldName":"East Field""#));
        assert!(request.contains(r#""soilPH":6.8"#));
    }

    #[tokio::test]
    async fn error_status_carries_detail() {
        let (base, _server) = respond_once(
            "500 Internal Server Error",
            r#"{"detail":"Prediction error: model not loaded"}"#,
        )
        .await;

        let client = ApiClient::new(base, Duration::from_secs(5));
        let err = client.predict(&observation()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.to_string(), "Prediction error: model not loaded");
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let (base, _server) = respond_once("200 OK", r#"{"yieldPrediction":"lots"}"#).await;

        let client = ApiClient::new(base, Duration::from_secs(5));
        let err = client.predict(&observation()).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(format!("http://{addr}"), Duration::from_secs(5));
        let err = client.predict(&observation()).await.unwrap_err();
        assert!(matches!(err, TransportError::Unreachable(_)));
    }

    #[tokio::test]
    async fn login_rejection_surfaces_detail() {
        let (base, server) =
            respond_once("401 Unauthorized", r#"{"detail":"Invalid credentials"}"#).await;

        let client = ApiClient::new(base, Duration::from_secs(5));
        let err = client.login("demo@cropsage.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/login HTTP/1.1"));
        assert!(request.contains(r#""email":"demo@cropsage.com""#));
    }

    #[tokio::test]
    async fn login_success_parses_user() {
        let (base, _server) = respond_once(
            "200 OK",
            r#"{"success":true,"user":{"email":"demo@cropsage.com","name":"Demo Farmer"}}"#,
        )
        .await;

        let client = ApiClient::new(base, Duration::from_secs(5));
        let response = client.login("demo@cropsage.com", "password123").await.unwrap();
        assert!(response.success);
        assert_eq!(response.user.name, "Demo Farmer");
    }

    #[tokio::test]
    async fn health_check_reads_status() {
        let (base, server) = respond_once("200 OK", r#"{"status":"healthy"}"#).await;

        let client = ApiClient::new(base, Duration::from_secs(5));
        assert!(client.health_check().await.unwrap());
        assert!(server.await.unwrap().starts_with("GET /health HTTP/1.1"));
    }
}
