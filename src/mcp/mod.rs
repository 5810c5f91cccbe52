//! MCP Server for scent search
//!
//! Exposes the query engine to MCP clients over stdio.

mod server;

pub use server::run_mcp_server;
