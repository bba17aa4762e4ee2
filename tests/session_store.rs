// File: tests/session_store.rs
use eventdesk::context::{AppContext, TestContext};
use eventdesk::model::{User, UserPatch, UserRole, UserStatus};
use eventdesk::routes::Route;
use eventdesk::session::{Access, Session, SessionStore};
use std::fs;

fn admin() -> User {
    User {
        id: 1,
        email: "admin@example.com".to_string(),
        phone: None,
        role: UserRole::Admin,
        status: UserStatus::Active,
    }
}

#[test]
fn test_roundtrip_through_disk() {
    let ctx = TestContext::new();
    let store = SessionStore::new(&ctx).unwrap();
    assert_eq!(store.load(), Session::default());

    let mut session = Session::default();
    session.set_auth(admin(), "tok".to_string());
    store.save(&session).unwrap();

    let loaded = SessionStore::new(&ctx).unwrap().load();
    assert_eq!(loaded, session);
    assert_eq!(loaded.bearer(), Some("tok"));
}

#[test]
fn test_signed_out_save_removes_file() {
    let ctx = TestContext::new();
    let store = SessionStore::new(&ctx).unwrap();
    let mut session = Session::default();
    session.set_auth(admin(), "tok".to_string());
    store.save(&session).unwrap();
    let path = ctx.get_session_path().unwrap();
    assert!(path.exists());

    session.clear();
    store.save(&session).unwrap();
    assert!(!path.exists());
}

#[test]
fn test_unreadable_or_outdated_file_means_signed_out() {
    let ctx = TestContext::new();
    let path = ctx.get_session_path().unwrap();

    fs::write(&path, "{ definitely not json").unwrap();
    assert!(!SessionStore::at(path.clone()).load().is_authenticated());

    fs::write(
        &path,
        r#"{"version": 0, "session": {"user": null, "token": "old"}}"#,
    )
    .unwrap();
    assert_eq!(SessionStore::at(path).load(), Session::default());
}

#[test]
fn test_access_rules() {
    let mut session = Session::default();
    assert_eq!(session.authorize(&[]), Access::Redirect(Route::Login));

    let mut operator = admin();
    operator.role = UserRole::Operator;
    session.set_auth(operator, "tok".to_string());
    assert_eq!(session.authorize(&[]), Access::Granted);
    assert_eq!(
        session.authorize(&[UserRole::Admin, UserRole::Operator]),
        Access::Granted
    );
    assert_eq!(
        session.authorize(&[UserRole::Admin]),
        Access::Redirect(Route::Dashboard)
    );
}

#[test]
fn test_profile_patch_merges() {
    let mut session = Session::default();
    session.update_user(UserPatch {
        email: Some("ignored@example.com".to_string()),
        ..Default::default()
    });
    assert!(session.user.is_none());

    session.set_auth(admin(), "tok".to_string());
    session.update_user(UserPatch {
        phone: Some("+33 1 23 45 67 89".to_string()),
        ..Default::default()
    });
    let user = session.user.unwrap();
    assert_eq!(user.email, "admin@example.com");
    assert_eq!(user.phone.as_deref(), Some("+33 1 23 45 67 89"));
}
