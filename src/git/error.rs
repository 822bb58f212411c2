//! Turning libgit2 errors into short, user-facing reasons

use git2::{Error, ErrorClass};

type ErrorCheck = fn(&str) -> bool;

/// First match wins, so the more specific patterns come first
const CLASSIFICATIONS: &[(ErrorCheck, &str)] = &[
    (
        |msg| msg.contains("remote branch") && msg.contains("not found"),
        "Branch not found",
    ),
    (
        |msg| {
            msg.contains("not found")
                || msg.contains("404")
                || msg.contains("too many redirects")
                || msg.contains("authentication replays")
        },
        "Repository not found",
    ),
    (
        |msg| msg.contains("authentication") || msg.contains("credentials"),
        "Authentication failed",
    ),
    (
        |msg| msg.contains("permission denied") || msg.contains("access denied"),
        "Permission denied",
    ),
    (
        |msg| {
            msg.contains("connection")
                || msg.contains("network")
                || msg.contains("timeout")
                || msg.contains("timed out")
        },
        "Network error",
    ),
];

/// Interpret a git2 error as a user-friendly reason
pub fn interpret_git_error(err: &Error) -> String {
    let message = err.message().to_lowercase();
    if let Some((_, reason)) = CLASSIFICATIONS.iter().find(|(check, _)| check(&message)) {
        return (*reason).to_string();
    }
    match err.class() {
        ErrorClass::Http if message.contains("certificate") => "Certificate error".to_string(),
        ErrorClass::Http if message.contains("ssl") => "SSL error".to_string(),
        ErrorClass::Http => format!("HTTP error: {}", err.message()),
        ErrorClass::Ssh => format!("SSH error: {}", err.message()),
        _ => err.message().to_string(),
    }
}
