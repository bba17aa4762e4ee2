// File: ./src/client/service.rs
//! The event operations the views depend on.
//!
//! Views are generic over [`EventService`] so they can run against the real
//! [`ApiClient`] or a scripted backend in tests.
use crate::client::core::ApiClient;
use crate::client::error::ApiError;
use crate::model::{CreateEventRequest, Event, EventFilter, EventId, Page, UpdateEventRequest};
use std::future::Future;

pub trait EventService: Send + Sync + 'static {
    fn get_event(
        &self,
        id: EventId,
        timezone: &str,
    ) -> impl Future<Output = Result<Event, ApiError>> + Send;

    fn start_event(
        &self,
        id: EventId,
        timezone: &str,
    ) -> impl Future<Output = Result<Event, ApiError>> + Send;

    fn stop_event(
        &self,
        id: EventId,
        timezone: &str,
    ) -> impl Future<Output = Result<Event, ApiError>> + Send;

    fn list_events(
        &self,
        filter: &EventFilter,
    ) -> impl Future<Output = Result<Page<Event>, ApiError>> + Send;

    fn create_event(
        &self,
        data: &CreateEventRequest,
        timezone: &str,
    ) -> impl Future<Output = Result<Event, ApiError>> + Send;

    fn update_event(
        &self,
        id: EventId,
        data: &UpdateEventRequest,
        timezone: &str,
    ) -> impl Future<Output = Result<Event, ApiError>> + Send;

    fn delete_event(&self, id: EventId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl EventService for ApiClient {
    async fn get_event(&self, id: EventId, timezone: &str) -> Result<Event, ApiError> {
        ApiClient::get_event(self, id, timezone).await
    }

    async fn start_event(&self, id: EventId, timezone: &str) -> Result<Event, ApiError> {
        ApiClient::start_event(self, id, timezone).await
    }

    async fn stop_event(&self, id: EventId, timezone: &str) -> Result<Event, ApiError> {
        ApiClient::stop_event(self, id, timezone).await
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Page<Event>, ApiError> {
        ApiClient::list_events(self, filter).await
    }

    async fn create_event(
        &self,
        data: &CreateEventRequest,
        timezone: &str,
    ) -> Result<Event, ApiError> {
        ApiClient::create_event(self, data, timezone).await
    }

    async fn update_event(
        &self,
        id: EventId,
        data: &UpdateEventRequest,
        timezone: &str,
    ) -> Result<Event, ApiError> {
        ApiClient::update_event(self, id, data, timezone).await
    }

    async fn delete_event(&self, id: EventId) -> Result<(), ApiError> {
        ApiClient::delete_event(self, id).await
    }
}
