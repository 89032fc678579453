//! Remote attendance operations: the port this client consumes, and its HTTP
//! implementation against the backend API.
//!
//! Two calls exist: fetch a session by its (QR or typed) code, and insert an
//! attendance record. The backend enforces uniqueness per (session, student);
//! a conflict response is reported as [`InsertOutcome::AlreadyRecorded`], not
//! as an error, because the attendance fact already holds.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::error::RemoteError;
use crate::types::{AttendanceSession, NewAttendanceRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsertOutcome {
    Created,
    /// The backend already holds a record for this (session, student).
    AlreadyRecorded,
}

#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn fetch_session_by_code(
        &self,
        code: &str,
    ) -> Result<Option<AttendanceSession>, RemoteError>;

    async fn insert_attendance_record(
        &self,
        record: &NewAttendanceRecord,
    ) -> Result<InsertOutcome, RemoteError>;
}

/// The backend's standard response wrapper.
#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

pub struct HttpAttendanceApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpAttendanceApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl AttendanceApi for HttpAttendanceApi {
    async fn fetch_session_by_code(
        &self,
        code: &str,
    ) -> Result<Option<AttendanceSession>, RemoteError> {
        let url = format!("{}/api/attendance/sessions/code/{}", self.base_url, code);
        let resp = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| RemoteError(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(RemoteError(format!(
                "session lookup returned {}",
                resp.status()
            )));
        }

        let envelope: Envelope<AttendanceSession> =
            resp.json().await.map_err(|e| RemoteError(e.to_string()))?;
        match envelope.data {
            Some(session) if envelope.success => Ok(Some(session)),
            _ => Err(RemoteError(envelope.message)),
        }
    }

    async fn insert_attendance_record(
        &self,
        record: &NewAttendanceRecord,
    ) -> Result<InsertOutcome, RemoteError> {
        let url = format!("{}/api/attendance/records", self.base_url);
        let resp = self
            .request(self.client.post(&url))
            .json(record)
            .send()
            .await
            .map_err(|e| RemoteError(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::CONFLICT {
            return Ok(InsertOutcome::AlreadyRecorded);
        }
        if status.is_success() {
            return Ok(InsertOutcome::Created);
        }

        // Prefer the server's message for diagnostics, fall back to the status.
        let message = match resp.json::<Envelope<serde_json::Value>>().await {
            Ok(envelope) => envelope.message,
            Err(_) => format!("record insert returned {status}"),
        };
        Err(RemoteError(message))
    }
}

/// Returns true if the API base URL answers at all (any HTTP response counts;
/// only a transport failure means unreachable). Used as the startup
/// connectivity probe where no OS-level online/offline signal exists.
pub async fn is_api_reachable(base_url: &str, timeout_secs: u64) -> bool {
    let client = match Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };
    client.head(base_url).send().await.is_ok()
}
