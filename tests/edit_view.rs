// File: tests/edit_view.rs
mod common;

use chrono::{TimeZone, Utc};
use common::{Call, FakeEvents, Harness, event, t0};
use eventdesk::model::EventStatus;
use eventdesk::routes::Route;
use eventdesk::views::{CreateEventForm, EditState, EditView, EventForm, FormError, ViewError};

#[tokio::test]
async fn test_completed_event_is_blocked() {
    let fake = FakeEvents::with(event(3, EventStatus::Completed, t0()));
    let mut h = Harness::new(fake.clone(), "UTC", t0());
    let mut view = EditView::new(h.ctx.clone(), 3);

    let state = view.open().await.unwrap();
    let message =
        "Cannot edit event with status: COMPLETED. Only DRAFT and PUBLISHED events can be edited.";
    assert_eq!(
        state,
        EditState::Blocked {
            message: message.to_string(),
            details: Route::EventDetail(3),
        }
    );
    assert_eq!(h.messages(), vec![message.to_string()]);

    // Submitting anyway never reaches the server.
    let form = EventForm {
        name: "x".to_string(),
        start_local: "2025-03-01T10:00".to_string(),
        end_local: "2025-03-01T11:00".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        view.submit(&form).await,
        Err(ViewError::Guard(_))
    ));
    assert_eq!(fake.count(|c| matches!(c, Call::Update(..))), 0);
}

#[tokio::test]
async fn test_form_prefilled_in_event_zone() {
    let mut ev = event(3, EventStatus::Draft, t0());
    ev.timezone = Some("America/New_York".to_string());
    let fake = FakeEvents::with(ev);
    let h = Harness::new(fake, "UTC", t0());
    let mut view = EditView::new(h.ctx.clone(), 3);

    match view.open().await.unwrap() {
        EditState::Form(form) => {
            // 09:00 UTC is 04:00 in New York in March (before DST).
            assert_eq!(form.start_local, "2025-03-01T04:00");
            assert_eq!(form.end_local, "2025-03-01T06:00");
            assert_eq!(form.timezone.as_deref(), Some("America/New_York"));
        }
        other => panic!("expected form, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_converts_and_saves() {
    let fake = FakeEvents::with(event(3, EventStatus::Published, t0()));
    let mut h = Harness::new(fake.clone(), "Europe/Paris", t0());
    let mut view = EditView::new(h.ctx.clone(), 3);
    let EditState::Form(mut form) = view.open().await.unwrap() else {
        panic!("expected form");
    };
    form.name = "Renamed".to_string();
    form.start_local = "2025-03-02T10:00".to_string();
    form.end_local = "2025-03-02T12:00".to_string();

    let saved = view.submit(&form).await.unwrap();
    assert_eq!(saved.name, "Renamed");
    assert_eq!(
        saved.start_date,
        Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap()
    );
    assert_eq!(h.messages(), vec!["Event updated successfully!".to_string()]);
    assert_eq!(h.next_route(), Some(Route::Events));
    assert!(fake.calls().iter().any(
        |c| matches!(c, Call::Update(3, req, tz) if tz == "Europe/Paris" && req.end_date.is_some())
    ));
}

#[tokio::test]
async fn test_submit_rejects_inverted_dates() {
    let fake = FakeEvents::with(event(3, EventStatus::Draft, t0()));
    let mut h = Harness::new(fake.clone(), "UTC", t0());
    let mut view = EditView::new(h.ctx.clone(), 3);
    let EditState::Form(mut form) = view.open().await.unwrap() else {
        panic!("expected form");
    };
    form.end_local = form.start_local.clone();

    assert_eq!(
        view.submit(&form).await,
        Err(ViewError::Form(FormError::DateOrder))
    );
    assert_eq!(
        h.messages(),
        vec!["Start date must be before end date".to_string()]
    );
    assert_eq!(fake.count(|c| matches!(c, Call::Update(..))), 0);
    assert_eq!(h.next_route(), None);
}

#[tokio::test]
async fn test_create_event() {
    let fake = std::sync::Arc::new(FakeEvents::default());
    let mut h = Harness::new(fake.clone(), "UTC", t0());
    let form = EventForm {
        name: "Launch".to_string(),
        start_local: "2025-04-01T18:00".to_string(),
        end_local: "2025-04-01T20:00".to_string(),
        timezone: Some("Asia/Tokyo".to_string()),
        ..Default::default()
    };

    let created = CreateEventForm::new(h.ctx.clone())
        .submit(&form)
        .await
        .unwrap();
    assert_eq!(created.status, EventStatus::Draft);
    assert_eq!(
        created.start_date,
        Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap()
    );
    assert_eq!(h.next_route(), Some(Route::Events));
    assert_eq!(h.messages(), vec!["Event created successfully!".to_string()]);
    assert!(matches!(&fake.calls()[0], Call::Create(_, tz) if tz == "Asia/Tokyo"));
}

#[tokio::test]
async fn test_create_requires_fields() {
    let fake = std::sync::Arc::new(FakeEvents::default());
    let mut h = Harness::new(fake.clone(), "UTC", t0());
    let err = CreateEventForm::new(h.ctx.clone())
        .submit(&EventForm::default())
        .await
        .unwrap_err();
    assert_eq!(err, ViewError::Form(FormError::MissingFields));
    assert_eq!(
        h.messages(),
        vec!["Please fill in all required fields".to_string()]
    );
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_emptied_description_is_cleared() {
    let mut ev = event(3, EventStatus::Draft, t0());
    ev.description = Some("Bring laptops".to_string());
    ev.location = Some("Room 4".to_string());
    let fake = FakeEvents::with(ev);
    let h = Harness::new(fake.clone(), "UTC", t0());
    let mut view = EditView::new(h.ctx.clone(), 3);
    let EditState::Form(mut form) = view.open().await.unwrap() else {
        panic!("expected form");
    };
    assert_eq!(form.description, "Bring laptops");
    form.description = "   ".to_string();

    view.submit(&form).await.unwrap();
    let update = fake.calls().into_iter().find_map(|c| match c {
        Call::Update(3, req, _) => Some(req),
        _ => None,
    });
    let update = update.expect("update call");
    assert_eq!(update.description.as_deref(), Some(""));
    assert_eq!(update.location.as_deref(), Some("Room 4"));
}
