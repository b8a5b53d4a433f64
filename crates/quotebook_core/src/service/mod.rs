//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, store and sync calls into use-case APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod quote_service;
