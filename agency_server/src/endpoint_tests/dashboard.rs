use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use agency_engine::{
    dashboard_objects::DashboardSnapshot,
    db_types::{ContactStatus, ContactSubmission, Transaction, TransactionStatus},
    traits::StoreError,
    DashboardApi,
};
use chrono::Utc;

use super::{
    helpers::{admin_session, all_routes, credential, session_cookie},
    mocks::MockStore,
};
use crate::sessions::SessionStore;

fn transaction(id: i64, amount: Option<f64>, status: &str) -> Transaction {
    Transaction {
        id,
        amount,
        currency: "IDR".into(),
        status: TransactionStatus::from(status.to_string()),
        payment_method: None,
        external_id: None,
        description: None,
        created_at: None,
    }
}

fn pending_contact(id: i64) -> ContactSubmission {
    ContactSubmission {
        id,
        name: "Budi".into(),
        email: "budi@example.com".into(),
        phone: Some("+62 812 0000".into()),
        message: "Quote please".into(),
        status: ContactStatus::Pending,
        created_at: Utc::now(),
    }
}

#[actix_web::test]
async fn dashboard_reports_counters() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_fetch_transactions().returning(|_| {
        Ok(vec![
            transaction(1, Some(100.0), "success"),
            transaction(2, Some(50.0), "failed"),
            transaction(3, Some(25.0), "success"),
            transaction(4, None, "success"),
        ])
    });
    store.expect_fetch_contacts().returning(|_| Ok(vec![pending_contact(1), pending_contact(2)]));
    store.expect_fetch_credentials().returning(|_| Ok(vec![credential(1, true)]));
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(DashboardApi::new(store))).configure(all_routes(sessions)),
    )
    .await;
    let (token, _) = admin_session();
    let req = TestRequest::get().uri("/api/admin/dashboard").cookie(session_cookie(&token)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let snapshot: DashboardSnapshot = test::read_body_json(res).await;
    assert_eq!(snapshot, DashboardSnapshot {
        total_transactions: 4,
        total_revenue: 125.0,
        pending_messages: 2,
        active_payment_settings: 1,
    });
}

#[actix_web::test]
async fn dashboard_falls_back_to_zeros() {
    let mut store = MockStore::new();
    store.expect_fetch_transactions().returning(|_| Ok(vec![transaction(1, Some(100.0), "success")]));
    store.expect_fetch_contacts().returning(|_| Err(StoreError::DatabaseError("no such table".into())));
    store.expect_fetch_credentials().returning(|_| Ok(vec![credential(1, true)]));
    let sessions = web::Data::new(SessionStore::default());
    let app = test::init_service(
        App::new().app_data(web::Data::new(DashboardApi::new(store))).configure(all_routes(sessions)),
    )
    .await;
    let (token, _) = admin_session();
    let req = TestRequest::get().uri("/api/admin/dashboard").cookie(session_cookie(&token)).to_request();
    let snapshot: DashboardSnapshot = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snapshot, DashboardSnapshot::default());
}
