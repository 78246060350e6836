//! MCP server for trellis hierarchy exploration.
//!
//! This crate provides an MCP (Model Context Protocol) server that exposes
//! a remote issue tracker's relationship hierarchy to AI assistants.
//!
//! # Architecture
//!
//! The server uses the `rmcp` crate for MCP protocol handling and wraps the
//! `IssueSource` / `StructureSource` traits from the trellis crate. The
//! tracker connection is configured from the environment at startup.
//!
//! # Tools
//!
//! ## Hierarchy
//! - `issue_tree` - Render the hierarchy below one issue
//! - `issue_forest` - Render the hierarchy of a query result
//!
//! ## Issue Queries
//! - `get_issue` - Show issue details with relationships
//! - `search_issues` - Flat search results
//! - `last_viewed` - Key of the last issue shown to this caller

pub mod context;
pub mod error;
pub mod models;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::TrellisMcpServer;
