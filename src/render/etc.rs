// CLASSIFICATION: COMMUNITY
// Filename: etc.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! `/etc` generators, all derived from the user list and profile.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::state::model::StateModel;

const OPENWRT_ART: &str = "  _______                     ________        __
 |       |.-----.-----.-----.|  |  |  |.----.|  |_
 |   -   ||  _  |  -__|     ||  |  |  ||   _||   _|
 |_______||   __|_____|__|__||________||__|  |____|
          |__| W I R E L E S S   F R E E D O M
";

pub fn passwd(s: &StateModel) -> String {
    let mut out = String::new();
    for u in s.users.iter() {
        let _ = writeln!(
            out,
            "{}:x:{}:{}:{}:{}:{}",
            u.username, u.uid, u.gid, u.gecos, u.home, u.shell
        );
    }
    out
}

pub fn shadow(s: &StateModel) -> String {
    let mut out = String::new();
    let changed = s
        .file("/etc/shadow")
        .map(|f| (s.boot_time + f.mtime_offset) / 86_400)
        .unwrap_or(s.boot_time / 86_400);
    for u in s.users.iter() {
        let hash = if u.can_login { u.password_hash.as_str() } else { "*" };
        let _ = writeln!(out, "{}:{}:{}:0:99999:7:::", u.username, hash, changed);
    }
    out
}

/// One group per distinct gid; the primary group of each account.
pub fn group(s: &StateModel) -> String {
    let mut groups: BTreeMap<u32, String> = BTreeMap::new();
    for u in s.users.iter() {
        groups.entry(u.gid).or_insert_with(|| s.group_name(u.gid));
    }
    let admins: Vec<&str> = s
        .users
        .iter()
        .filter(|u| u.uid >= 1000 && u.uid < 65534 && u.can_login)
        .map(|u| u.username.as_str())
        .collect();
    let mut out = String::new();
    for (gid, name) in groups {
        let members = if gid == 0 { admins.join(",") } else { String::new() };
        let _ = writeln!(out, "{name}:x:{gid}:{members}");
    }
    out
}

pub fn hostname(s: &StateModel) -> String {
    format!("{}\n", s.hostname)
}

/// Login banner. OpenWrt builds print their logo, everything else a
/// vendor line.
pub fn banner(s: &StateModel) -> String {
    let p = &s.profile;
    if p.os_name == "OpenWrt" {
        format!(
            "{OPENWRT_ART} -----------------------------------------------------\n \
             OpenWrt {}, {} {}\n \
             -----------------------------------------------------\n",
            p.os_version, p.vendor, p.model
        )
    } else {
        format!("\n{} {}\n{} {}\n\n", p.vendor, p.model, p.os_name, p.os_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin_profile;

    fn state(name: &str) -> StateModel {
        StateModel::init_with(builtin_profile(name).unwrap(), 4, 1_760_000_000).unwrap()
    }

    #[test]
    fn passwd_lists_every_user() {
        let s = state("Hikvision_DS-2CD2");
        let text = passwd(&s);
        assert_eq!(text.lines().count(), s.users.len());
        assert!(text.starts_with("root:x:0:0:root:/root:/bin/sh\n"));
    }

    #[test]
    fn shadow_hides_locked_accounts() {
        let s = state("Hikvision_DS-2CD2");
        let text = shadow(&s);
        assert!(text.lines().any(|l| l.starts_with("daemon:*:")));
        assert!(text.lines().any(|l| l.starts_with("root:$6$")));
    }

    #[test]
    fn group_maps_nobody() {
        let s = state("Hikvision_DS-2CD2");
        let text = group(&s);
        assert!(text.starts_with("root:x:0:admin\n"));
        assert!(text.contains("nogroup:x:65534:"));
    }

    #[test]
    fn banners() {
        assert!(banner(&state("TP-Link_Archer_C7")).contains("OpenWrt 18.06.4"));
        assert!(banner(&state("Dahua_IPC-HDW")).contains("Dahua IPC-HDW4631C-A"));
    }
}
