/// Router Module Index
///
/// Console API routes, split by what a caller must hold. All of them are
/// mounted under `/api`, which the page gate skips: session checks for data
/// routes happen here instead.

/// Health, session lookup, login/recovery flows and policy documents.
pub mod public;

/// Routes that need the `accessToken` cookie.
pub mod authenticated;

/// Platform administration routes (creators, dashboard). Also need the cookie;
/// the platform API enforces the `super_admin` role on the forwarded token.
pub mod admin;
