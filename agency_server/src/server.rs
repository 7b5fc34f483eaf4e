use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use agency_engine::{ContactApi, CredentialApi, DashboardApi, SqliteDatabase};
use log::*;

use crate::{
    auth::AuthGateway,
    config::ServerConfig,
    errors::ServerError,
    middleware::SessionGuardFactory,
    routes::{
        callback,
        health,
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

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not migrate the database. {e}")))?;
    info!("🚀️ Database ready at {}", db.url());
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    // Shared by all workers: the credential write lock and the per-session view state.
    let credential_api = web::Data::new(CredentialApi::new(db.clone()));
    let sessions = web::Data::new(SessionStore::default());
    let gateway = AuthGateway::new(&config.auth);
    let srv = HttpServer::new(move || {
        let dashboard_api = DashboardApi::new(db.clone());
        let contact_api = ContactApi::new(db.clone());
        let admin_scope = web::scope("/api/admin")
            .wrap(SessionGuardFactory::new(gateway.clone(), sessions.clone()))
            .service(DashboardRoute::<SqliteDatabase>::new())
            .service(ListCredentialsRoute::<SqliteDatabase>::new())
            .service(CreateCredentialRoute::<SqliteDatabase>::new())
            .service(UpdateCredentialRoute::<SqliteDatabase>::new())
            .service(ToggleCredentialRoute::<SqliteDatabase>::new())
            .service(RevealCredentialRoute::<SqliteDatabase>::new())
            .service(RequestDeletionRoute::<SqliteDatabase>::new())
            .service(ConfirmDeletionRoute::<SqliteDatabase>::new())
            .service(ListContactsRoute::<SqliteDatabase>::new())
            .service(UpdateContactStatusRoute::<SqliteDatabase>::new())
            .service(session_info);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("agency::access_log"))
            .app_data(credential_api.clone())
            .app_data(web::Data::new(dashboard_api))
            .app_data(web::Data::new(contact_api))
            .app_data(sessions.clone())
            .app_data(web::Data::new(gateway.clone()))
            .service(health)
            .service(login)
            .service(callback)
            .service(logout)
            .service(SubmitContactRoute::<SqliteDatabase>::new())
            .service(admin_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
