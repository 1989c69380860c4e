//! Wire DTOs and envelope decoding for the room-booking REST API.
//!
//! DESIGN
//! ======
//! Every backend response is wrapped as `{Status, Data?, Message?, Token?}`
//! where `Status == 1` means success. Failure envelopes frequently arrive with
//! a 4xx/5xx HTTP status and `Data: ""`, so the envelope is decoded first and
//! `Data` is only interpreted as `T` on success.
//!
//! Roles are a closed enum. Unknown role strings fail to decode here, at the
//! wire boundary, so nothing downstream has to handle an unrecognized role.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Envelope `Status` value that marks a successful response.
pub const STATUS_OK: i64 = 1;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status and no envelope.
    #[error("unexpected HTTP status {status}")]
    Http { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The backend reported a logical failure (`Status != 1`).
    #[error("{message}")]
    Rejected { message: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// Grepable code for logs and CLI output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Http { .. } => "E_HTTP_STATUS",
            Self::Decode(_) => "E_DECODE",
            Self::Rejected { .. } => "E_REJECTED",
            Self::ClientBuild(_) => "E_CLIENT_BUILD",
        }
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// A decoded response envelope. `data` is only populated on success.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse<T> {
    pub status: i64,
    pub data: Option<T>,
    pub message: Option<String>,
    /// Some login endpoints return the token beside `Data` instead of inside it.
    pub token: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Build a successful envelope around `data`.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { status: STATUS_OK, data: Some(data), message: None, token: None }
    }

    /// Build a failed envelope carrying an optional backend message.
    #[must_use]
    pub fn failed(message: Option<&str>) -> Self {
        Self { status: 0, data: None, message: message.map(ToOwned::to_owned), token: None }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// The backend message, ignoring blank strings.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// Unwrap the payload of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for a failed envelope, or
    /// [`ApiError::Decode`] if a successful envelope carries no data.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.is_success() {
            return Err(self.into_rejection());
        }
        self.data
            .ok_or_else(|| ApiError::Decode("successful response without Data".to_owned()))
    }

    /// Unwrap a successful response whose payload may legitimately be empty.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for a failed envelope.
    pub fn into_optional(self) -> Result<Option<T>, ApiError> {
        if self.is_success() { Ok(self.data) } else { Err(self.into_rejection()) }
    }

    /// Accept a successful response regardless of its payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for a failed envelope.
    pub fn into_unit(self) -> Result<(), ApiError> {
        if self.is_success() { Ok(()) } else { Err(self.into_rejection()) }
    }

    fn into_rejection(self) -> ApiError {
        let message = self
            .message()
            .map_or_else(|| "request failed".to_owned(), ToOwned::to_owned);
        ApiError::Rejected { message }
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "Status", deserialize_with = "deserialize_status")]
    status: i64,
    #[serde(rename = "Data", default)]
    data: Value,
    #[serde(rename = "Message", default)]
    message: Option<String>,
    #[serde(rename = "Token", default)]
    token: Option<String>,
}

/// Decode a response body into an [`ApiResponse`].
///
/// The body must be an envelope. A 2xx answer without one is a decode error
/// rather than an implicit success.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when a 2xx body is not an envelope or its
/// `Data` does not match `T`, and [`ApiError::Http`] for a non-2xx answer
/// without an envelope.
pub fn decode_response<T: DeserializeOwned>(http_status: u16, body: &str) -> Result<ApiResponse<T>, ApiError> {
    match parse_body(http_status, body)? {
        Some(value) if value.get("Status").is_some() => decode_envelope(value),
        _ if is_2xx(http_status) => Err(ApiError::Decode("response without envelope".to_owned())),
        _ => Err(ApiError::Http { status: http_status, body: body.to_owned() }),
    }
}

/// Like [`decode_response`], but a 2xx body without a `Status` key is taken
/// as bare data. Only the booking-cancel endpoint answers this way.
///
/// # Errors
///
/// Same as [`decode_response`], except that bare 2xx bodies are accepted.
pub fn decode_bare<T: DeserializeOwned>(http_status: u16, body: &str) -> Result<ApiResponse<T>, ApiError> {
    match parse_body(http_status, body)? {
        Some(value) if value.get("Status").is_some() => decode_envelope(value),
        Some(value) if is_2xx(http_status) => {
            let data = decode_data(value)?;
            Ok(ApiResponse { status: STATUS_OK, data, message: None, token: None })
        }
        None if is_2xx(http_status) => Ok(ApiResponse { status: STATUS_OK, data: None, message: None, token: None }),
        _ => Err(ApiError::Http { status: http_status, body: body.to_owned() }),
    }
}

fn is_2xx(http_status: u16) -> bool {
    (200..300).contains(&http_status)
}

/// `None` for an empty body.
fn parse_body(http_status: u16, body: &str) -> Result<Option<Value>, ApiError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => Ok(Some(value)),
        Err(e) if is_2xx(http_status) => Err(ApiError::Decode(e.to_string())),
        Err(_) => Err(ApiError::Http { status: http_status, body: body.to_owned() }),
    }
}

fn decode_envelope<T: DeserializeOwned>(value: Value) -> Result<ApiResponse<T>, ApiError> {
    let raw: RawEnvelope = serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
    let data = if raw.status == STATUS_OK { decode_data(raw.data)? } else { None };
    let token = raw.token.filter(|t| !t.is_empty());
    Ok(ApiResponse { status: raw.status, data, message: raw.message, token })
}

fn decode_data<T: DeserializeOwned>(value: Value) -> Result<Option<T>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::String(ref s) if s.is_empty() => Ok(None),
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string())),
    }
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| D::Error::custom("expected integer Status")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("invalid Status {s:?}"))),
        Value::Bool(b) => Ok(i64::from(b)),
        _ => Err(D::Error::custom("expected Status number")),
    }
}

// =============================================================================
// ROLE
// =============================================================================

/// The closed set of account roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Lecturer,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Lecturer, Role::Admin];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Lecturer => "LECTURER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Accepts bare names and Spring authority names (`ROLE_ADMIN`).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let upper = trimmed.to_ascii_uppercase();
        let name = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        match name {
            "STUDENT" => Ok(Self::Student),
            "LECTURER" => Ok(Self::Lecturer),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(UnknownRole(trimmed.to_owned())),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// An authenticated user as returned by `GET /api/users/me`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub role: Role,
    pub active: Option<bool>,
    /// Gamification points awarded by the backend.
    pub points: Option<i64>,
    pub usage_streak: Option<i64>,
    pub total_bookings: Option<i64>,
    #[serde(rename = "createdAT")]
    pub created_at: Option<String>,
}

impl User {
    /// Degraded identity built from a login payload alone.
    #[must_use]
    pub fn minimal(username: &str, role: Role) -> Self {
        Self {
            id: None,
            username: username.to_owned(),
            full_name: None,
            email: None,
            department: None,
            role,
            active: None,
            points: None,
            usage_streak: None,
            total_bookings: None,
            created_at: None,
        }
    }

    /// Full name when known, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

// =============================================================================
// AUTH PAYLOADS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `Data` of a successful login.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub token: Option<String>,
    pub username: String,
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

// =============================================================================
// RESOURCES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub room_number: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub capacity: i64,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub location: Option<String>,
    pub room_type: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub equipment: Option<Vec<EquipmentSummary>>,
    #[serde(default)]
    pub bookings: Option<Vec<BookingSummary>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSummary {
    pub id: i64,
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub id: i64,
    pub purpose: Option<String>,
    pub status: Option<BookingStatus>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: i64,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub working: bool,
    pub room_id: Option<i64>,
    pub room_number: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    #[serde(other)]
    Other,
}

impl BookingStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
            Self::Other => "UNKNOWN",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub room_id: Option<i64>,
    pub room_name: Option<String>,
    pub room_number: Option<String>,
    pub lecturer_name: Option<String>,
    pub purpose: Option<String>,
    /// Local date-time, `yyyy-MM-ddTHH:mm:ss`.
    pub start_time: String,
    pub end_time: String,
    pub status: Option<BookingStatus>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RoomRef {
    pub id: i64,
}

/// Body of `POST /api/bookings`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub room: RoomRef,
    pub start_time: String,
    pub end_time: String,
    pub purpose: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_bookings_ever: i64,
    pub total_rooms_available: i64,
    pub total_active_rooms: i64,
    pub total_upcoming_bookings: i64,
    pub total_active_users: i64,
}
