//! Domain records: policies, agents, sites, clients, checks, and tasks.

pub mod agent;
pub mod check;
pub mod org;
pub mod policy;
pub mod script;
pub mod task;

pub use agent::{Agent, MonitoringType, Platform};
pub use check::{Check, CheckData, CheckType, SyncStatus};
pub use org::{Client, Site};
pub use policy::Policy;
pub use script::{ScriptRef, ScriptShell};
pub use task::Task;
