use actix_web::{cookie::Cookie, web, web::ServiceConfig};
use agency_common::Secret;
use agency_engine::{
    credential_objects::PendingDeletion,
    db_types::{PaymentCredential, PaymentEnvironment, PaymentProvider},
    CredentialApi,
};
use chrono::{Duration, Utc};

use super::mocks::MockStore;
use crate::{
    auth::{AuthGateway, IdentityClaims, SessionClaims, TokenCodec, SESSION_COOKIE},
    config::AuthConfig,
    middleware::SessionGuardFactory,
    routes::{
        callback,
        login,
        logout,
        session_info,
        ConfirmDeletionRoute,
        CreateCredentialRoute,
        DashboardRoute,
        ListContactsRoute,
        ListCredentialsRoute,
        RequestDeletionRoute,
        RevealCredentialRoute,
        SubmitContactRoute,
        ToggleCredentialRoute,
        UpdateContactStatusRoute,
        UpdateCredentialRoute,
    },
    sessions::SessionStore,
};

pub const ADMIN_EMAIL: &str = "owner@agency.dev";

// Test-only secrets. DO NOT re-use these anywhere.
pub fn auth_config() -> AuthConfig {
    AuthConfig {
        session_secret: Secret::new("endpoint-tests-session-secret-0123456789".into()),
        idp_secret: Some(Secret::new("endpoint-tests-idp-secret-0123456789".into())),
        idp_login_url: "https://id.example.com/login".into(),
        public_url: "https://agency.test".into(),
        admin_landing: "/admin".into(),
        admin_emails: vec![ADMIN_EMAIL.into()],
        session_ttl: Duration::hours(1),
        secure_cookies: false,
    }
}

pub fn gateway() -> AuthGateway {
    AuthGateway::new(&auth_config())
}

pub fn identity(email: &str) -> IdentityClaims {
    IdentityClaims { sub: format!("idp|{email}"), email: email.into(), name: None }
}

/// An identity token, as the identity provider would issue it.
pub fn identity_token(email: &str) -> String {
    let config = auth_config();
    let secret = config.idp_secret.expect("Test config has an IdP secret");
    TokenCodec::new(secret).sign(identity(email), Duration::minutes(5)).expect("Could not sign identity token")
}

/// Opens an admin session and returns the token and its claims.
pub fn admin_session() -> (String, SessionClaims) {
    gateway().issue_session(identity(ADMIN_EMAIL)).expect("Could not issue session")
}

pub fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::new(SESSION_COOKIE, token.to_string())
}

/// Signs arbitrary session claims with the test session secret.
pub fn sign_session(claims: &SessionClaims, ttl: Duration) -> String {
    TokenCodec::new(auth_config().session_secret).sign(claims, ttl).expect("Could not sign session")
}

pub fn credential(id: i64, is_active: bool) -> PaymentCredential {
    let created = Utc::now() - Duration::days(1);
    PaymentCredential {
        id,
        provider: PaymentProvider::Xendit,
        public_key: "xnd_public_development_1234".into(),
        secret_key: Secret::new("xnd_development_secret_5678".into()),
        is_active,
        environment: PaymentEnvironment::Sandbox,
        created_at: created,
        updated_at: created,
    }
}

/// Obtains a `PendingDeletion` the only way there is: by asking the credential API for one.
pub async fn pending_deletion(credential: PaymentCredential) -> PendingDeletion {
    let id = credential.id;
    let mut store = MockStore::new();
    store.expect_fetch_credential().returning(move |_| Ok(Some(credential.clone())));
    CredentialApi::new(store).request_deletion(id).await.expect("Could not open deletion")
}

/// The login, callback and logout routes.
pub fn auth_routes(sessions: web::Data<SessionStore>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(sessions).app_data(web::Data::new(gateway())).service(login).service(callback).service(logout);
    }
}

/// Every route, with the admin routes behind the session guard, all backed by `MockStore`.
pub fn all_routes(sessions: web::Data<SessionStore>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let admin_scope = web::scope("/api/admin")
            .wrap(SessionGuardFactory::new(gateway(), sessions.clone()))
            .service(DashboardRoute::<MockStore>::new())
            .service(ListCredentialsRoute::<MockStore>::new())
            .service(CreateCredentialRoute::<MockStore>::new())
            .service(UpdateCredentialRoute::<MockStore>::new())
            .service(ToggleCredentialRoute::<MockStore>::new())
            .service(RevealCredentialRoute::<MockStore>::new())
            .service(RequestDeletionRoute::<MockStore>::new())
            .service(ConfirmDeletionRoute::<MockStore>::new())
            .service(ListContactsRoute::<MockStore>::new())
            .service(UpdateContactStatusRoute::<MockStore>::new())
            .service(session_info);
        cfg.service(SubmitContactRoute::<MockStore>::new()).service(admin_scope);
        auth_routes(sessions)(cfg);
    }
}
