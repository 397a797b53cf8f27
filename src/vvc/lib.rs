//! # vvc Architecture
//!
//! vvc ("visitor visibility control") hides posts and pages from anonymous
//! visitors while keeping them fully available to logged-in users. It is a
//! library that happens to have a CLI: the core never assumes a terminal, and
//! the host content system is reached only through the [`store::SiteStore`]
//! trait.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, formats output, installs logging       │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, owns store/cache/config       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Returns structured CmdResult values                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (visibility, cache, gate, render, listing, editorial) │
//! │  - Pure decisions over a SiteStore and a RequestContext     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - SiteStore trait: FileStore, InMemoryStore                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Request Flow
//!
//! For one front-end request the host builds a [`request::RequestContext`]
//! and a fresh [`gate::ResponseState`], runs both [`gate::AccessGate`]
//! passes, and if the response ended up a restricted 404, renders its
//! not-found template through a [`render::RestrictedRender`]. Listing and menu
//! hooks go through [`listing`]. Nothing about one request is stored in shared
//! state; the only process-wide state is the [`cache::HiddenSetCache`].
//!
//! ## Module Overview
//!
//! - [`model`]: content items and the visibility flag key
//! - [`store`]: host content store abstraction
//! - [`visibility`]: the hierarchical visibility rule
//! - [`cache`]: cached flat set of hidden pages
//! - [`gate`]: turns hidden singular requests into 404s
//! - [`render`]: log-in prompt in place of the not-found page
//! - [`listing`]: listing, menu and page-list filters
//! - [`editorial`]: admin column, edit forms, flag writes
//! - [`commands`], [`api`]: structured operations for UIs

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod editorial;
pub mod error;
pub mod gate;
pub mod listing;
pub mod model;
pub mod render;
pub mod request;
pub mod store;
pub mod visibility;
