//! Integration tests for the exploration loop
//!
//! Most tests drive `explore()` against a scripted in-memory site so that
//! page content, redirects and failures are fully controlled. The HTTP tests
//! run the built-in `reqwest` collaborator against wiremock servers.

mod common;
mod explore_tests;
mod http_tests;
mod journey_tests;
mod resume_tests;
