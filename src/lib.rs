//! Service Engagement - marketplace engagement and revenue core
//!
//! This crate implements the lifecycle between a client and a service
//! provider: selecting a listing, reserving it, submitting and confirming
//! payment proof, prompting for a rating, and reconciling provider revenue
//! from the loosely structured records a document store accumulates.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
