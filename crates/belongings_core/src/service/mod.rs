//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep HTTP and tool front ends decoupled from storage details.

pub mod belongings_service;
