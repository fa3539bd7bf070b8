//! Survey Agents Library
//!
//! Natural-language survey authoring: survey and question tools, the agent
//! graph that routes requests between them, and the HTTP API in front.

pub mod agents;
pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
