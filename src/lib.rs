//! Random User Explorer Library
//!
//! Answers "describe a random person" by fetching an identity and enriching it
//! with country facts, exchange rates and news headlines from independent
//! upstream services. Enrichment failures never fail the request; they show up
//! as fallback values or `null` sections in the merged result.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `enrichment`: Orchestration of the identity fetch and enrichment branches.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router assembly.
//! - `models`: Domain and response models.
//! - `services`: Identity, country, exchange-rate and news services.
//! - `upstream_client`: Typed wrapper around single outbound HTTP calls.
//! - `upstream_models`: Upstream wire formats.

pub mod api;
pub mod core;
pub mod integrations;

pub mod config;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod upstream_client;
pub mod upstream_models;
