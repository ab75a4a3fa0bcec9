//! Issuelinks GitHub - REST access to a user's repositories and issues
//!
//! This crate implements [`issuelinks_core::IssueSource`] over the GitHub
//! REST API using a plain token-authenticated HTTP client.

mod client;
mod error;
mod issues;
mod repos;

pub use client::{GitHubClient, DEFAULT_API_URL};
pub use error::{Error, Result};
