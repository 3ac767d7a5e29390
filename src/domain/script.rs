//! Script references used by script checks and scheduled tasks.

use crate::types::ScriptId;
use serde::{Deserialize, Serialize};

/// Shell a script runs under. Compatibility with an agent platform is decided
/// by the [`ScriptGate`](crate::script::ScriptGate) port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptShell {
    PowerShell,
    Cmd,
    Bash,
    Zsh,
    Python,
}

/// Reference to a script: identity plus the shell it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRef {
    pub id: ScriptId,
    pub shell: ScriptShell,
}

impl ScriptRef {
    pub fn new(shell: ScriptShell) -> Self {
        Self {
            id: ScriptId::new(),
            shell,
        }
    }
}
