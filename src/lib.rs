//! Persona Sim - Feature adoption prediction with synthetic persona panels
//!
//! This crate generates a diverse panel of synthetic personas for a company,
//! asks a language model how each persona would react to a candidate
//! feature, and aggregates the answers into adoption statistics, objection
//! clusters, and recommendations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
