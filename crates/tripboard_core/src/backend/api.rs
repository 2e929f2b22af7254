//! Remote CRUD API backend.
//!
//! Endpoints (relative to the base URL):
//! - `GET /points`, `GET /destinations`, `GET /offers`
//! - `POST /points`, `PUT /points/{id}`, `DELETE /points/{id}`
//!
//! Requests are blocking; they run on the persistence worker thread.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use super::{Backend, stored_point};
use crate::error::BackendError;
use crate::model::{Destination, OfferGroup, Point, PointId, PointWire, parse_points};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct ApiBackend {
    client: Client,
    base_url: String,
    authorization: Option<String>,
}

impl ApiBackend {
    pub fn new(base_url: &str, authorization: Option<String>) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.authorization {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = self
            .with_auth(request)
            .send()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(BackendError::Status {
                code: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self.send(self.client.get(self.url(path)))?;
        response
            .json()
            .map_err(|e| BackendError::Parse(format!("GET /{path}: {e}")))
    }

    fn write_point(&self, request: RequestBuilder, point: &PointWire) -> Result<Point, BackendError> {
        let body =
            serde_json::to_string(point).map_err(|e| BackendError::Serialize(e.to_string()))?;
        let response = self.send(request.header(CONTENT_TYPE, "application/json").body(body))?;
        let stored: PointWire = response
            .json()
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        stored_point(stored)
    }
}

impl Backend for ApiBackend {
    fn load_points(&self) -> Result<Vec<Point>, BackendError> {
        let records: Vec<serde_json::Value> = self.get_json("points")?;
        Ok(parse_points(records))
    }

    fn load_destinations(&self) -> Result<Vec<Destination>, BackendError> {
        self.get_json("destinations")
    }

    fn load_offers(&self) -> Result<Vec<OfferGroup>, BackendError> {
        self.get_json("offers")
    }

    fn create_point(&self, point: &PointWire) -> Result<Point, BackendError> {
        tracing::debug!(id = %point.id, "POST /points");
        self.write_point(self.client.post(self.url("points")), point)
    }

    fn update_point(&self, id: &PointId, point: &PointWire) -> Result<Point, BackendError> {
        tracing::debug!(%id, "PUT /points/{id}");
        self.write_point(self.client.put(self.url(&format!("points/{id}"))), point)
    }

    fn delete_point(&self, id: &PointId) -> Result<(), BackendError> {
        tracing::debug!(%id, "DELETE /points/{id}");
        self.send(self.client.delete(self.url(&format!("points/{id}"))))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_strips_trailing_slash() {
        let backend = ApiBackend::new("https://example.test/big-trip/", None).unwrap();
        assert_eq!(backend.url("points"), "https://example.test/big-trip/points");
    }
}
