// File: tests/timer_view.rs
mod common;

use common::{Call, FakeEvents, Harness, event, t0};
use eventdesk::client::ApiError;
use eventdesk::lifecycle::{GuardError, TimerGate};
use eventdesk::model::EventStatus;
use eventdesk::routes::Route;
use eventdesk::views::{TimerView, ViewError};
use http::StatusCode;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_shows_elapsed_since_start() {
    let fake = FakeEvents::with(event(7, EventStatus::Ongoing, t0()));
    let mut h = Harness::new(fake.clone(), "Europe/Paris", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);

    assert_eq!(view.activate().await.unwrap(), TimerGate::Run);
    assert_eq!(view.reading().text, "00:00:00");
    assert!(view.is_ticking());
    assert!(view.is_polling());

    sleep(Duration::from_millis(90_500)).await;
    assert_eq!(view.reading().text, "00:01:30");
    assert_eq!(view.reading().elapsed_ms, 90_000);

    // Initial load plus polls at 30 s, 60 s and 90 s, all in the view's zone.
    let gets = fake.count(|c| matches!(c, Call::Get(7, tz) if tz == "Europe/Paris"));
    assert_eq!(gets, 4);
    assert_eq!(h.next_route(), None);
}

#[tokio::test(start_paused = true)]
async fn test_event_started_earlier_counts_from_server_start() {
    let start = t0() - chrono::TimeDelta::seconds(3661);
    let fake = FakeEvents::with(event(7, EventStatus::Ongoing, start));
    let h = Harness::new(fake, "UTC", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);

    view.activate().await.unwrap();
    assert_eq!(view.reading().text, "01:01:01");
}

#[tokio::test(start_paused = true)]
async fn test_poll_seeing_completed_cancels_timer_and_leaves() {
    let fake = FakeEvents::with(event(7, EventStatus::Ongoing, t0()));
    let mut h = Harness::new(fake.clone(), "UTC", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);
    view.activate().await.unwrap();

    sleep(Duration::from_secs(10)).await;
    // Someone else stops the event.
    fake.set_status(EventStatus::Completed);

    sleep(Duration::from_millis(20_500)).await;
    assert_eq!(h.next_route(), Some(Route::EventDetail(7)));
    assert!(!view.is_ticking());
    assert!(!view.is_polling());

    let frozen = view.reading();
    sleep(Duration::from_secs(5)).await;
    assert_eq!(view.reading(), frozen);
    assert_eq!(
        view.event().map(|e| e.status),
        Some(EventStatus::Completed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_poll_failure_keeps_running() {
    let fake = FakeEvents::with(event(7, EventStatus::Ongoing, t0()));
    let mut h = Harness::new(fake.clone(), "UTC", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);
    view.activate().await.unwrap();

    fake.fail_next_get(ApiError::Network("connection reset".to_string()));
    sleep(Duration::from_millis(30_500)).await;

    assert!(view.is_ticking());
    assert!(view.is_polling());
    assert_eq!(view.reading().text, "00:00:30");
    assert!(h.messages().is_empty());
    assert_eq!(h.next_route(), None);
}

#[tokio::test(start_paused = true)]
async fn test_poll_adopts_moved_start_instant() {
    let fake = FakeEvents::with(event(7, EventStatus::Ongoing, t0()));
    let h = Harness::new(fake.clone(), "UTC", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);
    view.activate().await.unwrap();

    fake.set_start(t0() - chrono::TimeDelta::minutes(10));
    sleep(Duration::from_millis(30_500)).await;
    assert_eq!(view.reading().text, "00:10:30");
}

#[tokio::test(start_paused = true)]
async fn test_not_ongoing_redirects_without_schedules() {
    let fake = FakeEvents::with(event(7, EventStatus::Published, t0()));
    let mut h = Harness::new(fake.clone(), "UTC", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);

    let gate = view.activate().await.unwrap();
    assert_eq!(gate, TimerGate::Leave(Route::EventDetail(7)));
    assert_eq!(h.next_route(), Some(Route::EventDetail(7)));
    assert!(!view.is_ticking());
    assert!(!view.is_polling());

    sleep(Duration::from_secs(60)).await;
    assert_eq!(fake.count(|c| matches!(c, Call::Get(..))), 1);
}

#[tokio::test(start_paused = true)]
async fn test_load_failure_blocks_activation() {
    let fake = FakeEvents::with(event(7, EventStatus::Ongoing, t0()));
    fake.fail_next_get(ApiError::NotFound {
        message: "Event not found".to_string(),
    });
    let mut h = Harness::new(fake, "UTC", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);

    let err = view.activate().await.unwrap_err();
    assert!(matches!(err, ViewError::Load(ApiError::NotFound { .. })));
    assert_eq!(h.messages(), vec!["Event not found".to_string()]);
    assert!(!view.is_ticking());
    assert!(!view.is_polling());
    assert_eq!(h.next_route(), None);
}

#[tokio::test(start_paused = true)]
async fn test_stop_ends_schedules_and_shows_details() {
    let fake = FakeEvents::with(event(7, EventStatus::Ongoing, t0()));
    let mut h = Harness::new(fake.clone(), "America/New_York", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);
    view.activate().await.unwrap();
    sleep(Duration::from_millis(5_500)).await;

    let stopped = view.stop().await.unwrap();
    assert_eq!(stopped.status, EventStatus::Completed);
    assert!(!view.is_ticking());
    assert!(!view.is_polling());
    assert_eq!(h.next_route(), Some(Route::EventDetail(7)));
    assert_eq!(h.messages(), vec!["Event stopped successfully!".to_string()]);
    assert!(
        fake.calls()
            .contains(&Call::Stop(7, "America/New_York".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_failure_keeps_state() {
    let fake = FakeEvents::with(event(7, EventStatus::Ongoing, t0()));
    fake.fail_stop(ApiError::Status {
        status: StatusCode::BAD_REQUEST,
        message: "Event is not ongoing".to_string(),
    });
    let mut h = Harness::new(fake.clone(), "UTC", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);
    view.activate().await.unwrap();

    let err = view.stop().await.unwrap_err();
    assert!(matches!(err, ViewError::Action(_)));
    assert_eq!(h.messages(), vec!["Event is not ongoing".to_string()]);
    assert!(view.is_ticking());
    assert!(view.is_polling());
    assert_eq!(view.event().map(|e| e.status), Some(EventStatus::Ongoing));
    assert_eq!(h.next_route(), None);

    // Polling picks up again one interval later.
    sleep(Duration::from_millis(30_500)).await;
    assert_eq!(fake.count(|c| matches!(c, Call::Get(..))), 2);
}

#[tokio::test(start_paused = true)]
async fn test_no_poll_while_stop_is_in_flight() {
    let fake = FakeEvents::with(event(7, EventStatus::Ongoing, t0()));
    fake.slow_stop(Duration::from_secs(10));
    let mut h = Harness::new(fake.clone(), "UTC", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);
    view.activate().await.unwrap();
    sleep(Duration::from_secs(25)).await;

    // The server already reports COMPLETED while our stop request (25 s to
    // 35 s) spans the 30 s poll.
    fake.set_status(EventStatus::Completed);
    view.stop().await.unwrap();

    assert_eq!(fake.count(|c| matches!(c, Call::Get(..))), 1);
    assert_eq!(h.next_route(), Some(Route::EventDetail(7)));
    assert_eq!(h.next_route(), None);
    assert!(!view.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_load_is_refused() {
    let fake = FakeEvents::with(event(7, EventStatus::Ongoing, t0()));
    let h = Harness::new(fake.clone(), "UTC", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);

    let err = view.stop().await.unwrap_err();
    assert_eq!(err, ViewError::Guard(GuardError::NotLoaded));
    assert!(fake.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_everything() {
    let fake = FakeEvents::with(event(7, EventStatus::Ongoing, t0()));
    let h = Harness::new(fake.clone(), "UTC", t0());
    let mut view = TimerView::new(h.ctx.clone(), 7);
    view.activate().await.unwrap();
    let mut readings = view.subscribe();
    drop(view);

    sleep(Duration::from_secs(65)).await;
    // Only the initial load ever reached the server.
    assert_eq!(fake.count(|c| matches!(c, Call::Get(..))), 1);
    assert!(readings.has_changed().is_err() || !readings.has_changed().unwrap());
}
