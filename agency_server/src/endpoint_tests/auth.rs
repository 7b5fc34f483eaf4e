use actix_web::{
    cookie::Cookie,
    http::{header::LOCATION, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use agency_common::Secret;
use agency_engine::CredentialApi;
use chrono::Duration;
use serde_json::Value;

use super::{
    helpers::{admin_session, all_routes, auth_routes, identity, identity_token, session_cookie, ADMIN_EMAIL},
    mocks::MockStore,
};
use crate::{
    auth::{TokenCodec, SESSION_COOKIE, STATE_COOKIE},
    sessions::SessionStore,
};

fn callback_uri(token: &str, state: &str) -> String {
    format!("/auth/callback?token={}&state={}", urlencoding::encode(token), urlencoding::encode(state))
}

#[actix_web::test]
async fn login_redirects_to_the_identity_provider() {
    let _ = env_logger::try_init();
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(App::new().configure(auth_routes(sessions))).await;
    let req = TestRequest::get().uri("/auth/login").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    let location = res.headers().get(LOCATION).unwrap().to_str().unwrap().to_string();
    assert!(location.starts_with("https://id.example.com/login?redirect_uri=https%3A%2F%2Fagency.test%2Fauth%2Fcallback"));
    let state = res.response().cookies().find(|c| c.name() == STATE_COOKIE).expect("No state cookie");
    assert!(!state.value().is_empty());
    assert!(location.ends_with(&format!("state={}", urlencoding::encode(state.value()))));
}

#[actix_web::test]
async fn callback_with_the_wrong_state_is_rejected() {
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(App::new().configure(auth_routes(sessions))).await;
    let req = TestRequest::get()
        .uri(&callback_uri(&identity_token(ADMIN_EMAIL), "state-b"))
        .cookie(Cookie::new(STATE_COOKIE, "state-a"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // No state cookie at all
    let req = TestRequest::get().uri(&callback_uri(&identity_token(ADMIN_EMAIL), "state-b")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn callback_opens_a_working_session() {
    let _ = env_logger::try_init();
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(MockStore::new()))).configure(all_routes(sessions)),
    )
    .await;
    let req = TestRequest::get()
        .uri(&callback_uri(&identity_token(ADMIN_EMAIL), "nonce-1"))
        .cookie(Cookie::new(STATE_COOKIE, "nonce-1"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers().get(LOCATION).unwrap(), "/admin");
    let session = res.response().cookies().find(|c| c.name() == SESSION_COOKIE).expect("No session cookie");
    assert!(session.http_only().unwrap_or(false));
    let token = session.value().to_string();

    let req = TestRequest::get().uri("/api/admin/session").cookie(session_cookie(&token)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["email"], ADMIN_EMAIL);

    // Bearer headers work too
    let req = TestRequest::get()
        .uri("/api/admin/session")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn only_listed_admins_may_log_in() {
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(App::new().configure(auth_routes(sessions))).await;
    let req = TestRequest::get()
        .uri(&callback_uri(&identity_token("eve@example.com"), "n"))
        .cookie(Cookie::new(STATE_COOKIE, "n"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(res.response().cookies().all(|c| c.name() != SESSION_COOKIE));
}

#[actix_web::test]
async fn identity_tokens_must_come_from_the_identity_provider() {
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(App::new().configure(auth_routes(sessions))).await;
    let forger = TokenCodec::new(Secret::new("not-the-identity-provider-secret-000".into()));
    let token = forger.sign(identity(ADMIN_EMAIL), Duration::minutes(5)).unwrap();
    let req = TestRequest::get().uri(&callback_uri(&token, "n")).cookie(Cookie::new(STATE_COOKIE, "n")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_revokes_the_session() {
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(CredentialApi::new(MockStore::new()))).configure(all_routes(sessions)),
    )
    .await;
    let (token, _) = admin_session();
    let req = TestRequest::get().uri("/api/admin/session").cookie(session_cookie(&token)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = TestRequest::post().uri("/auth/logout").cookie(session_cookie(&token)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let removal = res.response().cookies().find(|c| c.name() == SESSION_COOKIE).expect("No removal cookie");
    assert!(removal.value().is_empty());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Logged out successfully");

    let req = TestRequest::get().uri("/api/admin/session").cookie(session_cookie(&token)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_without_a_session_still_clears_the_cookie() {
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(App::new().configure(auth_routes(sessions))).await;
    let req = TestRequest::post().uri("/auth/logout").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.response().cookies().any(|c| c.name() == SESSION_COOKIE));
}
