//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a few lines MUST delegate to the engine APIs
//! or a helper. Keep this module neat and tidy 🙏
//!
//! Every handler is async and never blocks. Store access goes through the engine APIs, which are async all the way
//! down, so a slow database never stalls a worker thread.
//!
//! Routes under `/api/admin` sit behind the [`SessionGuardFactory`](crate::middleware::SessionGuardFactory). Their
//! handlers take [`SessionClaims`] as an extractor.
use actix_web::{
    cookie::Cookie,
    get,
    http::header::LOCATION,
    post,
    web,
    HttpRequest,
    HttpResponse,
    Responder,
};
use agency_engine::{
    contact_objects::ContactQueryFilter,
    credential_objects::CredentialView,
    db_types::{NewContactSubmission, NewPaymentCredential},
    traits::{ContactManagement, CredentialManagement, TransactionManagement},
    ContactApi,
    CredentialApi,
    DashboardApi,
};
use log::*;

use crate::{
    auth::{random_nonce, session_token, AuthGateway, Session, SessionClaims, SESSION_COOKIE, STATE_COOKIE},
    data_objects::{
        CallbackParams,
        ConfirmDeletionParams,
        ContactListParams,
        ContactStatusChanged,
        ContactStatusUpdate,
        CredentialList,
        DeletionRequest,
        JsonResponse,
        RevealResult,
        SessionInfo,
    },
    errors::{AuthError, ServerError},
    helpers::{mutation_response, view},
    sessions::SessionStore,
};

// Actix cannot register generic handlers directly, so each one gets a small service factory from the `route!` macro.
// The generated `FooRoute<B>` registers `foo::<B>` for the given method and path, with `B` bound by the listed traits.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Contact  ----------------------------------------------------
route!(submit_contact => Post "/contact" impl ContactManagement);
/// The public contact form. Anyone may post here.
pub async fn submit_contact<B: ContactManagement>(
    body: web::Json<NewContactSubmission>,
    api: web::Data<ContactApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received contact form submission");
    api.submit(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(JsonResponse::success("Message sent successfully! We will get back to you soon.")))
}

route!(list_contacts => Get "/contacts" impl ContactManagement);
pub async fn list_contacts<B: ContactManagement>(
    claims: SessionClaims,
    query: web::Query<ContactListParams>,
    api: web::Data<ContactApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = ContactQueryFilter::from(query.into_inner());
    debug!("💻️ GET contacts [{filter}] for {}", claims.email);
    let contacts = api.list(filter).await?;
    Ok(HttpResponse::Ok().json(contacts))
}

route!(update_contact_status => Put "/contacts/{id}" impl ContactManagement);
/// Records the follow-up on a submission, e.g. `{"status": "replied"}`. Anything other than `pending` drops it from
/// the dashboard's pending count.
pub async fn update_contact_status<B: ContactManagement>(
    claims: SessionClaims,
    path: web::Path<i64>,
    body: web::Json<ContactStatusUpdate>,
    api: web::Data<ContactApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let ContactStatusUpdate { status } = body.into_inner();
    debug!("💻️ PUT contact #{id} status '{status}' by {}", claims.email);
    let contact = api.update_status(id, status).await?;
    let message = format!("Message marked as {}", contact.status);
    Ok(HttpResponse::Ok().json(ContactStatusChanged { success: true, message, contact }))
}

//----------------------------------------------   Auth  ----------------------------------------------------
/// Starts a login: sets a one-time `state` cookie and sends the browser to the identity provider.
#[get("/auth/login")]
pub async fn login(gateway: web::Data<AuthGateway>) -> Result<HttpResponse, ServerError> {
    let state = random_nonce();
    let url = gateway.login_redirect(&state)?;
    debug!("💻️ Redirecting to the identity provider for login");
    Ok(HttpResponse::Found().insert_header((LOCATION, url)).cookie(gateway.state_cookie(state)).finish())
}

/// The identity provider sends the browser back here with an identity token and the `state` we gave it.
#[get("/auth/callback")]
pub async fn callback(
    req: HttpRequest,
    query: web::Query<CallbackParams>,
    gateway: web::Data<AuthGateway>,
) -> Result<HttpResponse, ServerError> {
    let CallbackParams { token, state } = query.into_inner();
    let expected = req.cookie(STATE_COOKIE).map(|c| c.value().to_string());
    if expected.as_deref() != Some(state.as_str()) {
        warn!("💻️ Login callback with a missing or mismatched state value");
        return Err(AuthError::StateMismatch.into());
    }
    let identity = gateway.verify_identity(&token)?;
    let (session, claims) = gateway.issue_session(identity)?;
    info!("💻️ Admin session opened for {}", claims.email);
    let mut clear_state = Cookie::build(STATE_COOKIE, "").path("/auth").finish();
    clear_state.make_removal();
    Ok(HttpResponse::Found()
        .insert_header((LOCATION, gateway.config().admin_landing.as_str()))
        .cookie(gateway.session_cookie(session))
        .cookie(clear_state)
        .finish())
}

/// Ends the session: its reveal flags and open deletions are dropped, the token is revoked, and the cookie is cleared.
/// Logging out without a valid session still clears the cookie.
#[post("/auth/logout")]
pub async fn logout(
    req: HttpRequest,
    gateway: web::Data<AuthGateway>,
    sessions: web::Data<SessionStore>,
) -> HttpResponse {
    if let Some(claims) = session_token(&req).and_then(|t| gateway.verify_session(&t).ok()) {
        sessions.end_session(&claims.custom.sid, claims.exp);
        info!("💻️ {} logged out", claims.custom.email);
    }
    let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    removal.make_removal();
    HttpResponse::Ok().cookie(removal).json(JsonResponse::success("Logged out successfully"))
}

#[get("/session")]
pub async fn session_info(claims: SessionClaims) -> HttpResponse {
    HttpResponse::Ok().json(SessionInfo { sub: claims.sub, email: claims.email })
}

//----------------------------------------------   Dashboard  ----------------------------------------------------
route!(dashboard => Get "/dashboard" impl TransactionManagement, ContactManagement, CredentialManagement);
/// Summary counters. Store failures are logged by the engine and show up here as all-zero counters.
pub async fn dashboard<B>(claims: SessionClaims, api: web::Data<DashboardApi<B>>) -> HttpResponse
where B: TransactionManagement + ContactManagement + CredentialManagement {
    debug!("💻️ GET dashboard for {}", claims.email);
    let snapshot = api.snapshot().await;
    HttpResponse::Ok().json(snapshot)
}

//----------------------------------------------   Credentials  ----------------------------------------------------
route!(list_credentials => Get "/credentials" impl CredentialManagement);
pub async fn list_credentials<B: CredentialManagement>(
    claims: SessionClaims,
    api: web::Data<CredentialApi<B>>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET credentials for {}", claims.email);
    let credentials = api.list().await?;
    let reveal = sessions.reveal_state(&claims.sid);
    Ok(HttpResponse::Ok().json(CredentialList { credentials: CredentialView::list(&credentials, &reveal) }))
}

route!(create_credential => Post "/credentials" impl CredentialManagement);
pub async fn create_credential<B: CredentialManagement>(
    claims: SessionClaims,
    body: web::Json<NewPaymentCredential>,
    api: web::Data<CredentialApi<B>>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST new {} credential by {}", body.provider, claims.email);
    let result = api.create(body.into_inner()).await?;
    let reveal = sessions.reveal_state(&claims.sid);
    Ok(HttpResponse::Created().json(mutation_response("Payment setting created successfully", &result, &reveal)))
}

route!(update_credential => Put "/credentials/{id}" impl CredentialManagement);
pub async fn update_credential<B: CredentialManagement>(
    claims: SessionClaims,
    path: web::Path<i64>,
    body: web::Json<NewPaymentCredential>,
    api: web::Data<CredentialApi<B>>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ PUT credential #{id} by {}", claims.email);
    let result = api.update(id, body.into_inner()).await?;
    let reveal = sessions.reveal_state(&claims.sid);
    Ok(HttpResponse::Ok().json(mutation_response("Payment setting updated successfully", &result, &reveal)))
}

route!(toggle_credential => Post "/credentials/{id}/toggle" impl CredentialManagement);
pub async fn toggle_credential<B: CredentialManagement>(
    claims: SessionClaims,
    path: web::Path<i64>,
    api: web::Data<CredentialApi<B>>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ Toggle credential #{id} by {}", claims.email);
    let result = api.toggle_active(id).await?;
    let message = if result.changed.is_active { "Payment setting activated" } else { "Payment setting deactivated" };
    let reveal = sessions.reveal_state(&claims.sid);
    Ok(HttpResponse::Ok().json(mutation_response(message, &result, &reveal)))
}

route!(reveal_credential => Post "/credentials/{id}/reveal" impl CredentialManagement);
/// Flips whether this admin sees credential `id`'s secret key in plain text. Other admins are unaffected.
pub async fn reveal_credential<B: CredentialManagement>(
    session: Session,
    path: web::Path<i64>,
    api: web::Data<CredentialApi<B>>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let credential = api.fetch(id).await?;
    let claims = &session.custom;
    let secret_revealed = sessions.toggle_reveal(&claims.sid, id, session.exp);
    debug!("💻️ Secret key of #{id} is now {} for {}", if secret_revealed { "shown" } else { "hidden" }, claims.email);
    let credential = CredentialView::new(&credential, secret_revealed);
    Ok(HttpResponse::Ok().json(RevealResult { id, secret_revealed, credential }))
}

route!(request_deletion => Post "/credentials/{id}/delete" impl CredentialManagement);
/// First step of a deletion. Returns a ticket that must be presented to `DELETE /credentials/{id}`.
pub async fn request_deletion<B: CredentialManagement>(
    claims: SessionClaims,
    path: web::Path<i64>,
    api: web::Data<CredentialApi<B>>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let pending = api.request_deletion(id).await?;
    let credential = view(pending.credential(), &sessions.reveal_state(&claims.sid));
    let (ticket, expires_at) = sessions.open_deletion(&claims.sid, pending);
    debug!("💻️ Deletion of #{id} requested by {}", claims.email);
    let message = "Are you sure you want to delete this payment setting?".to_string();
    Ok(HttpResponse::Ok().json(DeletionRequest { ticket, expires_at, message, credential }))
}

route!(confirm_deletion => Delete "/credentials/{id}" impl CredentialManagement);
pub async fn confirm_deletion<B: CredentialManagement>(
    claims: SessionClaims,
    path: web::Path<i64>,
    query: web::Query<ConfirmDeletionParams>,
    api: web::Data<CredentialApi<B>>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let pending =
        sessions.take_deletion(&claims.sid, &query.ticket, id).ok_or(ServerError::InvalidDeletionTicket)?;
    let result = api.confirm_deletion(pending).await?;
    sessions.forget_credential(id);
    info!("💻️ Payment setting #{id} deleted by {}", claims.email);
    let reveal = sessions.reveal_state(&claims.sid);
    Ok(HttpResponse::Ok().json(mutation_response("Payment setting deleted successfully", &result, &reveal)))
}
