//! # Agency server
//!
//! The HTTP front end of the agency site's backend. It is responsible for:
//! * accepting contact form submissions from the public site;
//! * logging admins in through the external identity provider, and guarding the admin routes;
//! * serving the admin panel's dashboard counters, payment credential management and contact listing.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/contact`: The public contact form.
//! * `/auth/login`, `/auth/callback`, `/auth/logout`: The login handshake and logout.
//! * `/api/admin/*`: The admin API. Requires an admin session.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod sessions;

#[cfg(test)]
mod endpoint_tests;
