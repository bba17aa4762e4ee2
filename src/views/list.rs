// File: ./src/views/list.rs
use crate::client::EventService;
use crate::lifecycle::{self, EventAction};
use crate::model::{Event, EventFilter, EventId, EventStatus, Page};
use crate::views::{ViewContext, ViewError};
use chrono::{DateTime, Utc};

/// Paged, filterable event list with per-row lifecycle actions.
pub struct EventListView<S> {
    ctx: ViewContext<S>,
    filter: EventFilter,
    page: Option<Page<Event>>,
}

impl<S: EventService> EventListView<S> {
    pub fn new(ctx: ViewContext<S>, page_size: u32) -> Self {
        let filter = EventFilter {
            page: Some(1),
            limit: Some(page_size.max(1)),
            timezone: Some(ctx.timezone.clone()),
            ..Default::default()
        };
        Self {
            ctx,
            filter,
            page: None,
        }
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Replaces the search criteria and goes back to the first page.
    /// `from`/`to` bound the start date. Paging and timezone are kept from
    /// the current filter.
    pub fn set_filter(
        &mut self,
        name: Option<String>,
        status: Option<EventStatus>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) {
        self.filter.name = name.filter(|n| !n.trim().is_empty());
        self.filter.status = status;
        self.filter.start_date_from = from;
        self.filter.start_date_to = to;
        self.filter.page = Some(1);
    }

    /// Jumps to a 1-based page; takes effect on the next load.
    pub fn set_page(&mut self, page: u32) {
        self.filter.page = Some(page.max(1));
    }

    pub fn page(&self) -> Option<&Page<Event>> {
        self.page.as_ref()
    }

    pub fn rows(&self) -> &[Event] {
        self.page
            .as_ref()
            .map(|p| p.data.as_slice())
            .unwrap_or_default()
    }

    pub async fn load(&mut self) -> Result<&Page<Event>, ViewError> {
        let page = self
            .ctx
            .service
            .list_events(&self.filter)
            .await
            .map_err(|e| self.ctx.report(ViewError::Load(e)))?;
        Ok(self.page.insert(page))
    }

    /// Loads the next page. Returns `false` when already on the last one.
    pub async fn next_page(&mut self) -> Result<bool, ViewError> {
        if !self.page.as_ref().is_some_and(Page::has_next) {
            return Ok(false);
        }
        self.filter.page = Some(self.filter.page.unwrap_or(1) + 1);
        self.load().await?;
        Ok(true)
    }

    pub async fn previous_page(&mut self) -> Result<bool, ViewError> {
        if !self.page.as_ref().is_some_and(Page::has_previous) {
            return Ok(false);
        }
        self.filter.page = Some(self.filter.page.unwrap_or(1).saturating_sub(1).max(1));
        self.load().await?;
        Ok(true)
    }

    fn row(&self, id: EventId) -> Option<&Event> {
        self.rows().iter().find(|e| e.id == id)
    }

    pub async fn start(&mut self, id: EventId) -> Result<(), ViewError> {
        lifecycle::check(self.row(id), EventAction::Start)
            .map_err(|e| self.ctx.report(e.into()))?;
        self.ctx
            .service
            .start_event(id, &self.ctx.timezone)
            .await
            .map_err(|e| self.ctx.report(ViewError::Action(e)))?;
        self.ctx.notifier.success("Event started successfully!");
        self.reload().await;
        Ok(())
    }

    pub async fn stop(&mut self, id: EventId) -> Result<(), ViewError> {
        lifecycle::check(self.row(id), EventAction::Stop)
            .map_err(|e| self.ctx.report(e.into()))?;
        self.ctx
            .service
            .stop_event(id, &self.ctx.timezone)
            .await
            .map_err(|e| self.ctx.report(ViewError::Action(e)))?;
        self.ctx.notifier.success("Event stopped successfully!");
        self.reload().await;
        Ok(())
    }

    pub async fn delete(&mut self, id: EventId) -> Result<(), ViewError> {
        self.ctx
            .service
            .delete_event(id)
            .await
            .map_err(|e| self.ctx.report(ViewError::Action(e)))?;
        log::info!("Event {} deleted", id);
        self.ctx.notifier.success("Event deleted successfully!");
        self.reload().await;
        Ok(())
    }

    // The action already succeeded; a failed refresh is reported on its own.
    async fn reload(&mut self) {
        if let Err(e) = self.load().await {
            log::warn!("Reloading events after action failed: {}", e);
        }
    }
}
