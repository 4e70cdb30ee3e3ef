//! Host platform identity
//!
//! A RID names a platform/architecture pair (`linux-x64`, `win-arm64`). Two
//! flavors are used during resolution: a run-time probed RID that may be
//! distro- and version-specific (`ubuntu.22.04-x64`), and a compile-time
//! priority list of portable RIDs for the platform the host was built for.

use once_cell::sync::Lazy;
use std::env;
use std::fs;

/// Environment variable overriding the host RID
pub const RUNTIME_ID_ENV: &str = "LOAM_RUNTIME_ID";

/// Read the host RID override from the environment, if set and non-empty
pub fn runtime_id_from_env() -> Option<String> {
    match env::var(RUNTIME_ID_ENV) {
        Ok(rid) if !rid.is_empty() => Some(rid),
        _ => None,
    }
}

/// Architecture component of the host RID
pub fn current_arch_name() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "x64",
        "x86" => "x86",
        "aarch64" => "arm64",
        "arm" => "arm",
        other => other,
    }
}

/// Base OS name used when a distro-specific RID is unavailable or unknown
pub fn fallback_os_name() -> &'static str {
    if cfg!(windows) {
        "win"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else if cfg!(any(target_os = "linux", target_os = "android")) {
        "linux"
    } else {
        "unix"
    }
}

/// Probed OS platform name, possibly distro- and version-specific
///
/// Returns the empty string when probing fails; callers then compose the
/// host RID from [`fallback_os_name`] instead.
pub fn current_os_rid_platform() -> String {
    if cfg!(windows) {
        "win".to_string()
    } else if cfg!(target_os = "macos") {
        "osx".to_string()
    } else if cfg!(target_os = "linux") {
        linux_distro_rid().unwrap_or_default()
    } else {
        String::new()
    }
}

fn linux_distro_rid() -> Option<String> {
    let content = fs::read_to_string("/etc/os-release").ok()?;
    parse_os_release(&content)
}

/// Extract `ID` and `VERSION_ID` from os-release text into `id.version` form
fn parse_os_release(content: &str) -> Option<String> {
    let mut id = None;
    let mut version_id = None;

    for line in content.lines() {
        if let Some(value) = line.strip_prefix("ID=") {
            id = Some(trim_os_release_value(value));
        } else if let Some(value) = line.strip_prefix("VERSION_ID=") {
            version_id = Some(trim_os_release_value(value));
        }
    }

    let id = id.filter(|id| !id.is_empty())?;
    match version_id {
        Some(version) if !version.is_empty() => Some(format!("{}.{}", id, version)),
        _ => Some(id.to_string()),
    }
}

fn trim_os_release_value(value: &str) -> &str {
    value.trim().trim_matches('"')
}

/// Compile-time host RID priority list, most specific first, ending in `any`
pub fn host_rid_list() -> &'static [String] {
    &HOST_RIDS
}

fn push_os_rids(rids: &mut Vec<String>, os: &str, arch: &str) {
    rids.push(format!("{}-{}", os, arch));
    rids.push(os.to_string());
}

static HOST_RIDS: Lazy<Vec<String>> = Lazy::new(|| {
    let arch = current_arch_name();
    let mut rids = Vec::new();

    if cfg!(windows) {
        push_os_rids(&mut rids, "win", arch);
    } else if cfg!(target_os = "macos") {
        push_os_rids(&mut rids, "osx", arch);
        push_os_rids(&mut rids, "unix", arch);
    } else if cfg!(target_os = "android") {
        push_os_rids(&mut rids, "android", arch);
        push_os_rids(&mut rids, "linux", arch);
        push_os_rids(&mut rids, "unix", arch);
    } else if cfg!(target_os = "linux") {
        if cfg!(target_env = "musl") {
            push_os_rids(&mut rids, "linux-musl", arch);
        }
        push_os_rids(&mut rids, "linux", arch);
        push_os_rids(&mut rids, "unix", arch);
    } else {
        // Covers non-portable hosts like freebsd and illumos
        push_os_rids(&mut rids, env::consts::OS, arch);
        push_os_rids(&mut rids, "unix", arch);
    }

    rids.push("any".to_string());
    rids
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_name_is_known() {
        assert!(!current_arch_name().is_empty());
    }

    #[test]
    fn test_host_rid_list_shape() {
        let rids = host_rid_list();
        assert_eq!(rids.last().map(String::as_str), Some("any"));
        // Arch-qualified entries precede their unqualified form
        let qualified = format!("{}-{}", fallback_os_name(), current_arch_name());
        if let Some(pos) = rids.iter().position(|rid| *rid == qualified) {
            assert_eq!(rids[pos + 1], fallback_os_name());
        }
    }

    #[test]
    fn test_parse_os_release() {
        let content = "NAME=\"Ubuntu\"\nID=ubuntu\nVERSION_ID=\"22.04\"\n";
        assert_eq!(parse_os_release(content), Some("ubuntu.22.04".to_string()));
    }

    #[test]
    fn test_parse_os_release_without_version() {
        let content = "ID=arch\n";
        assert_eq!(parse_os_release(content), Some("arch".to_string()));
    }

    #[test]
    fn test_parse_os_release_missing_id() {
        assert_eq!(parse_os_release("NAME=\"Foo\"\n"), None);
        assert_eq!(parse_os_release(""), None);
    }
}
