//! The server has no command line interface of its own. Passing any argument prints usage and a configuration report
//! instead of starting the server.
use std::env;

const HELP: &str = include_str!("./cli-help.txt");

/// Settings shown with their value.
const PLAIN_SETTINGS: [&str; 10] = [
    "AGENCY_HOST",
    "AGENCY_PORT",
    "AGENCY_DATABASE_URL",
    "AGENCY_IDP_LOGIN_URL",
    "AGENCY_PUBLIC_URL",
    "AGENCY_ADMIN_LANDING",
    "AGENCY_ADMIN_EMAILS",
    "AGENCY_SESSION_HOURS",
    "AGENCY_SECURE_COOKIES",
    "RUST_LOG",
];

/// Settings that are only reported as present or absent.
const SECRET_SETTINGS: [&str; 2] = ["AGENCY_SESSION_SECRET", "AGENCY_IDP_SECRET"];

/// Returns true if the caller asked for help, in which case the server should not start.
pub fn handle_command_line_args() -> bool {
    if env::args().len() <= 1 {
        return false;
    }
    println!("\n{HELP}");
    println!("Configuration found in the environment:");
    for line in configuration_report(|name| env::var(name).ok()) {
        println!("  {line}");
    }
    true
}

fn configuration_report<F>(lookup: F) -> Vec<String>
where F: Fn(&str) -> Option<String> {
    let plain = PLAIN_SETTINGS.iter().map(|&name| {
        let value = lookup(name).unwrap_or_else(|| "(default)".to_string());
        format!("{name:<24} {value}")
    });
    let secrets = SECRET_SETTINGS.iter().map(|&name| {
        let state = if lookup(name).is_some_and(|v| !v.is_empty()) { "(set)" } else { "(not set)" };
        format!("{name:<24} {state}")
    });
    plain.chain(secrets).collect()
}
