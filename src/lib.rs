//! Quaderno is a static publishing engine for personal blogs: markdown
//! content with TOML front matter in, sanitised HTML fragments and a
//! navigable heading outline out.
//!
//! The crate is layered the usual way: [`domain`] holds the entities and the
//! slug/outline algorithms, [`application`] the rendering and build
//! services, [`config`] the typed settings and CLI surface, and [`infra`]
//! the runtime adapters (telemetry, filesystem errors).

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
