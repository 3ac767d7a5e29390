//! Per-type deduplication dispatch
//!
//! One table maps each check type to its identity key and platform gate,
//! iterated generically by the resolver. Keys:
//!
//! | type      | key                  | platform gate          |
//! |-----------|----------------------|------------------------|
//! | diskspace | disk identifier      | windows only           |
//! | ping      | host                 | any                    |
//! | cpuload   | singleton            | windows only           |
//! | memory    | singleton            | windows only           |
//! | winsvc    | service name         | windows only           |
//! | script    | script identity      | script gate            |
//! | eventlog  | (log name, event id) | windows only           |

use crate::domain::{Check, CheckData, CheckType, Platform};
use crate::script::ScriptGate;
use crate::types::ScriptId;

/// Identity key a candidate claims within one agent's resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Disk(String),
    Ping(String),
    CpuLoad,
    Memory,
    WinSvc(String),
    Script(ScriptId),
    EventLog(String, u32),
}

/// The identity key for a check's payload.
pub fn dedup_key(data: &CheckData) -> DedupKey {
    match data {
        CheckData::DiskSpace { disk } => DedupKey::Disk(disk.clone()),
        CheckData::Ping { host } => DedupKey::Ping(host.clone()),
        CheckData::CpuLoad => DedupKey::CpuLoad,
        CheckData::Memory => DedupKey::Memory,
        CheckData::WinSvc { service_name } => DedupKey::WinSvc(service_name.clone()),
        CheckData::Script { script } => DedupKey::Script(script.id),
        CheckData::EventLog { log_name, event_id } => {
            DedupKey::EventLog(log_name.clone(), *event_id)
        }
    }
}

/// Whether a check type can exist on a platform at all. Script checks are
/// additionally gated per shell by [`ScriptGate`].
pub fn platform_admits(check_type: CheckType, platform: Platform) -> bool {
    match check_type {
        CheckType::Ping | CheckType::Script => true,
        CheckType::DiskSpace
        | CheckType::CpuLoad
        | CheckType::Memory
        | CheckType::WinSvc
        | CheckType::EventLog => platform.is_windows(),
    }
}

/// Full applicability gate for a candidate. A candidate failing this is
/// skipped entirely: it neither claims a key nor gets flagged overridden.
pub fn admits(check: &Check, platform: Platform, gate: &dyn ScriptGate) -> bool {
    if !platform_admits(check.data.check_type(), platform) {
        return false;
    }
    match &check.data {
        CheckData::Script { script } => gate.is_supported(script.shell, platform),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScriptRef, ScriptShell};
    use crate::script::DefaultScriptGate;
    use crate::types::PolicyId;

    #[test]
    fn test_windows_only_types_rejected_off_windows() {
        for check_type in [
            CheckType::DiskSpace,
            CheckType::CpuLoad,
            CheckType::Memory,
            CheckType::WinSvc,
            CheckType::EventLog,
        ] {
            assert!(platform_admits(check_type, Platform::Windows));
            assert!(!platform_admits(check_type, Platform::Linux));
            assert!(!platform_admits(check_type, Platform::Mac));
        }
    }

    #[test]
    fn test_ping_admitted_everywhere() {
        for platform in [Platform::Windows, Platform::Linux, Platform::Mac] {
            assert!(platform_admits(CheckType::Ping, platform));
        }
    }

    #[test]
    fn test_script_gated_by_shell() {
        let gate = DefaultScriptGate;
        let check = Check::template(
            PolicyId::new(),
            CheckData::Script {
                script: ScriptRef::new(ScriptShell::Bash),
            },
        );
        assert!(admits(&check, Platform::Linux, &gate));
        assert!(!admits(&check, Platform::Windows, &gate));
    }

    #[test]
    fn test_singleton_keys_collide() {
        assert_eq!(dedup_key(&CheckData::CpuLoad), dedup_key(&CheckData::CpuLoad));
        assert_ne!(dedup_key(&CheckData::CpuLoad), dedup_key(&CheckData::Memory));
    }

    #[test]
    fn test_eventlog_key_is_log_and_event_pair() {
        let a = dedup_key(&CheckData::EventLog {
            log_name: "Application".to_string(),
            event_id: 7001,
        });
        let b = dedup_key(&CheckData::EventLog {
            log_name: "Application".to_string(),
            event_id: 7002,
        });
        assert_ne!(a, b);
    }
}
