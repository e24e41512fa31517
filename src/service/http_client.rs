//! JSON-over-HTTP client for the classification service

use crate::config::ServiceConfig;
use crate::error::{AnalyzerError, Result};
use crate::service::{
    ClassificationRequest, ClassificationService, CvClassification, Recommendation,
    RecommendationRequest,
};
use log::{error, info, warn};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub struct HttpClassificationService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpClassificationService {
    pub fn new(config: &ServiceConfig, api_key: Option<String>) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(AnalyzerError::Configuration(
                "service.endpoint is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<String> {
        let url = format!("{}/{}", self.endpoint, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        check_status(response.status(), &url)?;
        Ok(response.text().await?)
    }
}

fn check_status(status: StatusCode, url: &str) -> Result<()> {
    if !status.is_success() {
        error!("Classification service returned {} for {}", status, url);
        return Err(AnalyzerError::ClassificationService(format!(
            "HTTP {} from {}",
            status, url
        )));
    }
    Ok(())
}

impl ClassificationService for HttpClassificationService {
    async fn classify(&self, request: &ClassificationRequest) -> Result<CvClassification> {
        info!("Sending CV for profile and skill identification...");
        let body = self.post_json("classify", request).await?;
        let value = parse_service_payload(&body)?;

        serde_json::from_value(value).map_err(|e| {
            AnalyzerError::ClassificationService(format!(
                "Unexpected classification structure: {}",
                e
            ))
        })
    }

    async fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation> {
        info!("Requesting personal recommendation...");
        let body = self.post_json("recommend", request).await?;
        decode_recommendation(&body)
    }
}

/// Decode a recommendation body. Unreadable or oddly shaped answers become
/// a placeholder recommendation; only an `"error"` key is a failure.
pub fn decode_recommendation(body: &str) -> Result<Recommendation> {
    let value = match decode_json(body) {
        Ok(value) => value,
        Err(e) => {
            warn!("Recommendation was not valid JSON: {}", e);
            return Ok(Recommendation::unavailable("Error", None));
        }
    };
    reject_error_payload(&value)?;

    match serde_json::from_value(value) {
        Ok(recommendation) => Ok(recommendation),
        Err(e) => {
            warn!("Unexpected recommendation structure: {}", e);
            Ok(Recommendation::unavailable("Parsing Error", Some(e.to_string())))
        }
    }
}

/// Decode a service body, tolerating a ```json fenced block. A top-level
/// `"error"` key is the service refusing the input.
pub fn parse_service_payload(body: &str) -> Result<Value> {
    let value = decode_json(body)
        .map_err(|e| AnalyzerError::ClassificationService(format!("Invalid JSON: {}", e)))?;
    reject_error_payload(&value)?;
    Ok(value)
}

fn decode_json(body: &str) -> serde_json::Result<Value> {
    serde_json::from_str(strip_json_fence(body))
}

fn reject_error_payload(value: &Value) -> Result<()> {
    if let Some(reason) = value.get("error") {
        let reason = reason
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| reason.to_string());
        warn!("Classification service rejected the input: {}", reason);
        return Err(AnalyzerError::ClassificationService(reason));
    }
    Ok(())
}

fn strip_json_fence(body: &str) -> &str {
    match body.split_once("```json") {
        Some((_, rest)) => match rest.rsplit_once("```") {
            Some((inner, _)) => inner.trim(),
            None => rest.trim(),
        },
        None => body.trim(),
    }
}
