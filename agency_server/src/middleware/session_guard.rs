//! Session guard middleware for the admin routes.
//!
//! Every request must carry a valid, unrevoked admin session token, either in the session cookie or as a bearer
//! token. What happens otherwise:
//! * no token at all: `302` to the login route;
//! * a bad, expired or revoked token: `401`;
//! * a valid token without the admin role: `403`.
//!
//! On success the verified [`Session`] is placed in the request extensions. Handlers pick it up, or just its
//! [`SessionClaims`](crate::auth::SessionClaims), as an extractor.
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
    HttpMessage,
    ResponseError,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::{debug, trace, warn};

use crate::{
    auth::{session_token, AuthGateway, Session},
    errors::{AuthError, ServerError},
    sessions::SessionStore,
};

pub struct SessionGuardFactory {
    gateway: AuthGateway,
    sessions: web::Data<SessionStore>,
}

impl SessionGuardFactory {
    pub fn new(gateway: AuthGateway, sessions: web::Data<SessionStore>) -> Self {
        SessionGuardFactory { gateway, sessions }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionGuardFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<EitherBody<B>>;
    type Transform = SessionGuardService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionGuardService {
            gateway: Rc::new(self.gateway.clone()),
            sessions: self.sessions.clone(),
            service: Rc::new(service),
        })
    }
}

pub struct SessionGuardService<S> {
    gateway: Rc<AuthGateway>,
    sessions: web::Data<SessionStore>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<EitherBody<B>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gateway = Rc::clone(&self.gateway);
        let sessions = self.sessions.clone();
        Box::pin(async move {
            trace!("🔐️ Checking session for {}", req.path());
            match authorize(req.request(), &gateway, &sessions) {
                Ok(session) => {
                    req.extensions_mut().insert(session);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                },
                Err(e) => {
                    let response = e.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                },
            }
        })
    }
}

fn authorize(
    req: &actix_web::HttpRequest,
    gateway: &AuthGateway,
    sessions: &SessionStore,
) -> Result<Session, ServerError> {
    let token = session_token(req).ok_or_else(|| {
        debug!("🔐️ No session on request to {}. Redirecting to login.", req.path());
        AuthError::NoSession
    })?;
    let session = gateway.verify_session(&token).map_err(|e| {
        warn!("🔐️ Rejected session token on {}. {e}", req.path());
        e
    })?;
    let claims = &session.custom;
    if sessions.is_revoked(&claims.sid) {
        debug!("🔐️ Session for {} has been logged out", claims.email);
        return Err(AuthError::SessionRevoked.into());
    }
    if !claims.is_admin() {
        warn!("🔐️ {} has a session, but not the admin role", claims.email);
        return Err(AuthError::InsufficientPermissions("The admin role is required".into()).into());
    }
    Ok(session)
}
