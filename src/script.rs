//! Script/platform compatibility port.

use crate::domain::{Platform, ScriptShell};

/// Decides whether a script shell can run on an agent platform. Incompatible
/// candidates are silently excluded from resolution; this is a policy
/// decision, not a failure.
pub trait ScriptGate: Send + Sync {
    fn is_supported(&self, shell: ScriptShell, platform: Platform) -> bool;
}

/// Default shell/platform compatibility table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScriptGate;

impl ScriptGate for DefaultScriptGate {
    fn is_supported(&self, shell: ScriptShell, platform: Platform) -> bool {
        match platform {
            Platform::Windows => matches!(
                shell,
                ScriptShell::PowerShell | ScriptShell::Cmd | ScriptShell::Python
            ),
            Platform::Linux | Platform::Mac => matches!(
                shell,
                ScriptShell::Bash | ScriptShell::Zsh | ScriptShell::Python
            ),
        }
    }
}
