//! # Atheneum Hub
//!
//! Directory and coordination hub for a network of library nodes.
//!
//! This crate provides the full hub service: the HTTP API libraries talk
//! to, the connection handshake coordinator, the directory registry with
//! heartbeat-based liveness, and an MCP bridge that exposes directory
//! search to AI assistants.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Atheneum Hub                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │                    HTTP API Layer                     │  │
//! │  │  • Peer Connections (handshake, status, search)       │  │
//! │  │  • Directory Registry (register, heartbeat, discover) │  │
//! │  │  • Localized Content (languages, translations)        │  │
//! │  │  • Feedback (issue-tracker integration)               │  │
//! │  │  • Admin Dashboard                                    │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                              │                              │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │                  Coordination Layer                   │  │
//! │  │  • Handshake Coordinator (pending/active/rejected)    │  │
//! │  │  • Best-Effort Notification Relay                     │  │
//! │  │  • Address Normalization (aliases, node/hub pairs)    │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                              │                              │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │                     Storage Layer                     │  │
//! │  │  • Peer Store (connection relationships)              │  │
//! │  │  • Directory Registry (libraries with liveness)       │  │
//! │  │  • Content Store (languages, translations)            │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! To run a hub:
//!
//! ```bash
//! cargo run --bin atheneum-hub -- serve --listen-addr 127.0.0.1:8080
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Application state, shared error type, and the router
//! - [`peers_api`] - Peer connection endpoints (handshake, status, search)
//! - [`registry_api`] - Directory registration, heartbeat and discovery
//! - [`content_api`] - Languages and per-locale translation maps
//! - [`feedback_api`] - Beta feedback with issue-tracker integration
//! - [`admin_api`] - Operator dashboard
//! - [`config`] - Hub configuration management
//! - [`mcp`] - MCP server bridging directory search to AI assistants
//! - [`observability`] - Structured logging, metrics, and request tracing
//! - [`validation`] - Input validation helpers
//! - [`health`] - Health check endpoints (liveness, readiness)
//! - [`tickets`] - Issue-tracker client used by the feedback API
//! - [`fixtures`] - Demo seed data for local development
//!
//! ## Example: Creating an AppState
//!
//! ```rust,no_run
//! use atheneum_hub::api::{create_router, AppState};
//! use atheneum_hub::config::HubConfig;
//!
//! let config = HubConfig::default();
//! let state = AppState::from_config(config).expect("state builds");
//! let app = create_router(state);
//! ```

pub mod admin_api;
pub mod api;
pub mod config;
pub mod content_api;
pub mod feedback_api;
pub mod fixtures;
pub mod health;
pub mod mcp;
pub mod observability;
pub mod peers_api;
pub mod registry_api;
pub mod tickets;
pub mod validation;
