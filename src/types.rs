//! Identity types shared across the engine.
//!
//! Every domain record carries a database-style identity rather than a
//! content-derived hash, so ids are random UUIDs behind newtype wrappers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Identity of a reusable policy
    PolicyId
);
id_type!(
    /// Identity of a managed endpoint
    AgentId
);
id_type!(
    /// Identity of a site
    SiteId
);
id_type!(
    /// Identity of a client
    ClientId
);
id_type!(
    /// Identity of a check (template or materialized)
    CheckId
);
id_type!(
    /// Identity of a scheduled task (template or materialized)
    TaskId
);
id_type!(
    /// Identity of a script referenced by checks and tasks
    ScriptId
);
id_type!(
    /// Identity of an alert template associated with a policy
    AlertTemplateId
);
