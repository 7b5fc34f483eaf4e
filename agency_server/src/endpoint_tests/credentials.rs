use actix_web::{
    http::{header::LOCATION, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use agency_common::MASK;
use agency_engine::{db_types::CredentialUpdate, traits::StoreError, CredentialApi};
use chrono::Duration;
use mockall::predicate::eq;
use serde_json::{json, Value};

use super::{
    helpers::{admin_session, all_routes, credential, session_cookie, sign_session},
    mocks::MockStore,
};
use crate::{
    auth::SessionClaims,
    sessions::SessionStore,
};

fn store_with_list() -> MockStore {
    let mut store = MockStore::new();
    store.expect_fetch_credentials().returning(|_| Ok(vec![credential(2, true), credential(1, false)]));
    store.expect_fetch_credential().returning(|id| Ok(Some(credential(id, true))));
    store
}

#[actix_web::test]
async fn no_session_redirects_to_login() {
    let _ = env_logger::try_init();
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(MockStore::new()))).configure(all_routes(sessions)),
    )
    .await;
    let req = TestRequest::get().uri("/api/admin/credentials").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers().get(LOCATION).unwrap(), "/auth/login");
}

#[actix_web::test]
async fn bad_or_expired_sessions_are_unauthorized() {
    let _ = env_logger::try_init();
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(MockStore::new()))).configure(all_routes(sessions)),
    )
    .await;
    let req = TestRequest::get()
        .uri("/api/admin/credentials")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let (_, claims) = admin_session();
    let expired = sign_session(&claims, Duration::minutes(-5));
    let req = TestRequest::get().uri("/api/admin/credentials").cookie(session_cookie(&expired)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn sessions_without_the_admin_role_are_forbidden() {
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(MockStore::new()))).configure(all_routes(sessions)),
    )
    .await;
    let claims = SessionClaims { sub: "x".into(), email: "x@agency.dev".into(), sid: "sid-x".into(), roles: vec![] };
    let token = sign_session(&claims, Duration::minutes(5));
    let req = TestRequest::get().uri("/api/admin/credentials").cookie(session_cookie(&token)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn list_masks_keys() {
    let _ = env_logger::try_init();
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(store_with_list()))).configure(all_routes(sessions)),
    )
    .await;
    let (token, _) = admin_session();
    let req = TestRequest::get().uri("/api/admin/credentials").cookie(session_cookie(&token)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let list = body["credentials"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], 2);
    assert_eq!(list[0]["public_key"], format!("xnd_{MASK}1234"));
    assert_eq!(list[0]["secret_key"], format!("xnd_{MASK}5678"));
    assert_eq!(list[0]["secret_revealed"], false);
    assert!(!body.to_string().contains("development_secret"));
}

#[actix_web::test]
async fn reveal_is_per_session() {
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(store_with_list()))).configure(all_routes(sessions)),
    )
    .await;
    let (mine, _) = admin_session();
    let (theirs, _) = admin_session();

    let req = TestRequest::post().uri("/api/admin/credentials/2/reveal").cookie(session_cookie(&mine)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["secret_revealed"], true);
    assert_eq!(body["credential"]["secret_key"], "xnd_development_secret_5678");
    assert_eq!(body["credential"]["public_key"], format!("xnd_{MASK}1234"));

    let req = TestRequest::get().uri("/api/admin/credentials").cookie(session_cookie(&mine)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["credentials"][0]["secret_key"], "xnd_development_secret_5678");
    assert_eq!(body["credentials"][1]["secret_key"], format!("xnd_{MASK}5678"));

    let req = TestRequest::get().uri("/api/admin/credentials").cookie(session_cookie(&theirs)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["credentials"][0]["secret_revealed"], false);

    // Toggling again hides it
    let req = TestRequest::post().uri("/api/admin/credentials/2/reveal").cookie(session_cookie(&mine)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["secret_revealed"], false);
    assert_eq!(body["credential"]["secret_key"], format!("xnd_{MASK}5678"));
}

#[actix_web::test]
async fn create_with_missing_key_is_rejected_without_a_store_call() {
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(MockStore::new()))).configure(all_routes(sessions)),
    )
    .await;
    let (token, _) = admin_session();
    let req = TestRequest::post()
        .uri("/api/admin/credentials")
        .cookie(session_cookie(&token))
        .set_json(json!({"provider": "xendit", "public_key": "", "secret_key": "abc"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({"error": "Please fill in all required fields"}));
}

#[actix_web::test]
async fn create_returns_the_refreshed_list() {
    let mut store = MockStore::new();
    store.expect_insert_credential().times(1).returning(|c, now| {
        let mut created = credential(3, c.is_active);
        created.provider = c.provider;
        created.environment = c.environment;
        created.created_at = now;
        created.updated_at = now;
        Ok(created)
    });
    store.expect_fetch_credentials().returning(|_| Ok(vec![credential(3, true)]));
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(store))).configure(all_routes(sessions)),
    )
    .await;
    let (token, _) = admin_session();
    let req = TestRequest::post()
        .uri("/api/admin/credentials")
        .cookie(session_cookie(&token))
        .set_json(json!({
            "provider": "midtrans",
            "public_key": "SB-Mid-client-abc",
            "secret_key": "SB-Mid-server-xyz",
            "environment": "production"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Payment setting created successfully");
    assert_eq!(body["credential"]["provider"], "midtrans");
    assert_eq!(body["credential"]["environment"], "production");
    assert_eq!(body["credentials"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn store_failures_are_generic() {
    let mut store = MockStore::new();
    store
        .expect_update_credential()
        .returning(|_, _, _| Err(StoreError::DatabaseError("database is locked (code 5)".into())));
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(store))).configure(all_routes(sessions)),
    )
    .await;
    let (token, _) = admin_session();
    let req = TestRequest::put()
        .uri("/api/admin/credentials/1")
        .cookie(session_cookie(&token))
        .set_json(json!({"provider": "stripe", "public_key": "pk_test_1", "secret_key": "sk_test_1"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({"error": "Failed to save payment setting"}));
}

#[actix_web::test]
async fn toggle_reports_the_new_state() {
    let mut store = MockStore::new();
    store.expect_fetch_credential().with(eq(1)).returning(|id| Ok(Some(credential(id, true))));
    store
        .expect_update_credential()
        .withf(|id, update, _| *id == 1 && *update == CredentialUpdate::default().with_is_active(false))
        .times(1)
        .returning(|id, _, now| {
            let mut c = credential(id, false);
            c.updated_at = now;
            Ok(c)
        });
    store.expect_fetch_credentials().returning(|_| Ok(vec![credential(1, false)]));
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(store))).configure(all_routes(sessions)),
    )
    .await;
    let (token, _) = admin_session();
    let req = TestRequest::post().uri("/api/admin/credentials/1/toggle").cookie(session_cookie(&token)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Payment setting deactivated");
    assert_eq!(body["credential"]["is_active"], false);
}

#[actix_web::test]
async fn deletion_needs_a_ticket_from_the_same_session() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_fetch_credential().returning(|id| Ok(Some(credential(id, true))));
    store.expect_delete_credential().with(eq(2)).times(1).returning(|id| Ok(credential(id, true)));
    store.expect_fetch_credentials().returning(|_| Ok(vec![credential(1, false)]));
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(store))).configure(all_routes(sessions)),
    )
    .await;
    let (mine, _) = admin_session();
    let (theirs, _) = admin_session();

    // No ticket at all
    let req = TestRequest::delete().uri("/api/admin/credentials/2").cookie(session_cookie(&mine)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::post().uri("/api/admin/credentials/2/delete").cookie(session_cookie(&mine)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["credential"]["id"], 2);
    let ticket = body["ticket"].as_str().unwrap().to_string();

    // Someone else's ticket is refused, and burns the ticket
    let uri = format!("/api/admin/credentials/2?ticket={ticket}");
    let req = TestRequest::delete().uri(&uri).cookie(session_cookie(&theirs)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::post().uri("/api/admin/credentials/2/delete").cookie(session_cookie(&mine)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let ticket = body["ticket"].as_str().unwrap().to_string();
    let uri = format!("/api/admin/credentials/2?ticket={ticket}");
    let req = TestRequest::delete().uri(&uri).cookie(session_cookie(&mine)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Payment setting deleted successfully");
    assert_eq!(body["credentials"].as_array().map(Vec::len), Some(1));

    // The ticket cannot be replayed
    let req = TestRequest::delete().uri(&uri).cookie(session_cookie(&mine)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_credentials_are_not_found() {
    let mut store = MockStore::new();
    store.expect_fetch_credential().returning(|_| Ok(None));
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(store))).configure(all_routes(sessions)),
    )
    .await;
    let (token, _) = admin_session();
    let req = TestRequest::post().uri("/api/admin/credentials/42/delete").cookie(session_cookie(&token)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
