//! Cascade: Layered Monitoring-Policy Resolution
//!
//! Resolves the effective monitoring configuration (checks and scheduled tasks)
//! for a managed endpoint from a layered hierarchy of policies (agent, site,
//! client, global default), then reconciles the resolved state against what is
//! currently materialized on the agent.

pub mod cascade;
pub mod concurrency;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod reconcile;
pub mod scope;
pub mod script;
pub mod store;
pub mod types;
