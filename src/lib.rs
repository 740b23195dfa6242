//! Minecraft Yggdrasil session-server multiplexer.
//!
//! Presents several Yggdrasil-compatible session servers as one. Every
//! `hasJoined` query is fanned out to all upstreams at once and the first
//! upstream confirming the join wins; batch profile lookups are merged.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                     YMUX                      │
//!   Client Request   │  ┌─────────┐    ┌──────────┐                  │
//!   ─────────────────┼─▶│  http   │───▶│   mux    │──┬─▶ upstream A ─┼──▶ session server A
//!                    │  │ server  │    │ fan-out  │  ├─▶ upstream B ─┼──▶ session server B
//!   Client Response  │  └─────────┘    └──────────┘  └─▶ upstream C ─┼──▶ session server C
//!   ◀────────────────┼── first positive / merged       (retry each)   │
//!                    │                                                │
//!                    │  config · observability · resilience · lifecycle│
//!                    └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod yggdrasil;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::MuxConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use yggdrasil::{IdentityProvider, MuxServer};
