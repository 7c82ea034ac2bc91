//! Shared infrastructure for the event/survey backend
//!
//! This crate provides the pieces every service-level module leans on:
//! PostgreSQL connection pooling, Redis connectivity (used for the token
//! denylist), and the infrastructure error types.

pub mod cache;
pub mod database;
pub mod error;
