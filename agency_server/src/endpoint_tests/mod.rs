mod auth;
mod credentials;
mod dashboard;
pub(crate) mod helpers;
