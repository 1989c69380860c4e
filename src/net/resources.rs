//! Resource endpoints used by the feature screens.
//!
//! SYSTEM CONTEXT
//! ==============
//! Screens call these directly; none of them touch session state. A
//! [`ResourceApi`] is a short-lived view over the shared [`HttpBackend`]
//! carrying whatever token the session held when it was created.

#[cfg(test)]
#[path = "resources_test.rs"]
mod resources_test;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::http::HttpBackend;
use super::types::{ApiError, Booking, BookingRequest, DashboardStats, Equipment, PasswordChange, Room, User};

fn room_path(id: i64) -> String {
    format!("/api/rooms/{id}")
}

fn room_status_path(id: i64) -> String {
    format!("/api/rooms/{id}/status")
}

fn equipment_path(id: i64) -> String {
    format!("/api/equipment/{id}")
}

fn user_path(id: i64) -> String {
    format!("/api/users/{id}")
}

fn cancel_booking_path(id: i64) -> String {
    format!("/api/bookings/{id}/cancel")
}

fn upcoming_for_room_path(room_id: i64) -> String {
    format!("/api/bookings/room/{room_id}/upcoming")
}

#[derive(Serialize)]
struct RoomStatusUpdate<'a> {
    status: &'a str,
}

/// Authenticated view over the resource endpoints.
pub struct ResourceApi<'a> {
    http: &'a HttpBackend,
    token: Option<String>,
}

impl<'a> ResourceApi<'a> {
    #[must_use]
    pub fn new(http: &'a HttpBackend, token: Option<String>) -> Self {
        Self { http, token }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.http.request(Method::GET, path, self.token.as_deref());
        self.http.send::<T>(builder).await?.into_data()
    }

    /// Lists come back as `Data: ""` when empty on some endpoints.
    async fn get_list<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let builder = self.http.request(Method::GET, path, self.token.as_deref());
        let items = self.http.send::<Vec<T>>(builder).await?.into_optional()?;
        Ok(items.unwrap_or_default())
    }

    async fn write<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self
            .http
            .request(method, path, self.token.as_deref())
            .json(body);
        self.http.send::<T>(builder).await?.into_data()
    }

    async fn write_unit<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: Option<&B>) -> Result<(), ApiError> {
        let mut builder = self.http.request(method, path, self.token.as_deref());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.http.send::<Value>(builder).await?.into_unit()
    }

    // =========================================================================
    // ROOMS
    // =========================================================================

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.get_list("/api/rooms").await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn room(&self, id: i64) -> Result<Room, ApiError> {
        self.get(&room_path(id)).await
    }

    /// Rooms free for the whole `[start, end)` window. Times are local
    /// `yyyy-MM-ddTHH:mm:ss` strings.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn available_rooms(&self, start: &str, end: &str) -> Result<Vec<Room>, ApiError> {
        let builder = self
            .http
            .request(Method::GET, "/api/rooms/available", self.token.as_deref())
            .query(&[("startTime", start), ("endTime", end)]);
        let rooms = self.http.send::<Vec<Room>>(builder).await?.into_optional()?;
        Ok(rooms.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn create_room(&self, room: &Value) -> Result<Room, ApiError> {
        self.write(Method::POST, "/api/rooms", room).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn update_room(&self, id: i64, room: &Value) -> Result<Room, ApiError> {
        self.write(Method::PUT, &room_path(id), room).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn delete_room(&self, id: i64) -> Result<(), ApiError> {
        self.write_unit::<Value>(Method::DELETE, &room_path(id), None)
            .await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn set_room_status(&self, id: i64, status: &str) -> Result<(), ApiError> {
        self.write_unit(Method::PUT, &room_status_path(id), Some(&RoomStatusUpdate { status }))
            .await
    }

    // =========================================================================
    // EQUIPMENT
    // =========================================================================

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn equipment(&self) -> Result<Vec<Equipment>, ApiError> {
        self.get_list("/api/equipment").await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn equipment_item(&self, id: i64) -> Result<Equipment, ApiError> {
        self.get(&equipment_path(id)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn create_equipment(&self, equipment: &Value) -> Result<Equipment, ApiError> {
        self.write(Method::POST, "/api/equipment", equipment).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn update_equipment(&self, id: i64, equipment: &Value) -> Result<Equipment, ApiError> {
        self.write(Method::PUT, &equipment_path(id), equipment)
            .await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn delete_equipment(&self, id: i64) -> Result<(), ApiError> {
        self.write_unit::<Value>(Method::DELETE, &equipment_path(id), None)
            .await
    }

    // =========================================================================
    // USERS
    // =========================================================================

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get_list("/api/users").await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn user(&self, id: i64) -> Result<User, ApiError> {
        self.get(&user_path(id)).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn update_user(&self, id: i64, user: &Value) -> Result<User, ApiError> {
        self.write(Method::PUT, &user_path(id), user).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.write_unit::<Value>(Method::DELETE, &user_path(id), None)
            .await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.get(super::api::ME_PATH).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn update_profile(&self, profile: &Value) -> Result<User, ApiError> {
        self.write(Method::PUT, super::api::ME_PATH, profile).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        self.write_unit(Method::PUT, "/api/users/me/password", Some(change))
            .await
    }

    // =========================================================================
    // BOOKINGS
    // =========================================================================

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn create_booking(&self, request: &BookingRequest) -> Result<Booking, ApiError> {
        self.write(Method::POST, "/api/bookings", request).await
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn my_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        self.get_list("/api/bookings/my-bookings").await
    }

    /// The cancel endpoint answers with a bare booking (no envelope) on
    /// success and an empty 400 on failure.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn cancel_booking(&self, id: i64) -> Result<(), ApiError> {
        let builder = self
            .http
            .request(Method::PUT, &cancel_booking_path(id), self.token.as_deref());
        self.http.send_bare::<Value>(builder).await?.into_unit()
    }

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn upcoming_for_room(&self, room_id: i64) -> Result<Vec<Booking>, ApiError> {
        self.get_list(&upcoming_for_room_path(room_id)).await
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or backend rejection.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/api/admin/dashboard/stats").await
    }
}
