// CLASSIFICATION: COMMUNITY
// Filename: loader.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Profile configuration loader.
//!
//! Parses `[ProfileName]` sections followed by `key=value` lines. A section
//! named after a built-in profile starts from that profile; any other name
//! starts from the generic template. `#` starts a comment line.

use std::fs;
use std::path::Path;

use log::{info, warn};

use super::{builtin_profile, builtin_profiles, DeviceProfile, MIN_RAM_KB};
use crate::error::{StateError, StateResult};

fn parse_num(key: &str, value: &str, line_no: usize) -> StateResult<u32> {
    value.parse::<u32>().map_err(|_| {
        StateError::invalid(format!("line {line_no}: {key} expects a number, got {value:?}"))
    })
}

/// Parse a size in units of `scale` kB and return it in kB. Zero and values
/// that do not fit a `u32` are rejected.
fn parse_kb(key: &str, value: &str, line_no: usize, scale: u32, floor: u32) -> StateResult<u32> {
    let kb = parse_num(key, value, line_no)?
        .checked_mul(scale)
        .ok_or_else(|| StateError::invalid(format!("line {line_no}: {key} = {value} is too large")))?;
    if kb < floor.max(1) {
        return Err(StateError::invalid(format!(
            "line {line_no}: {key} = {value} is below the {floor} kB minimum"
        )));
    }
    Ok(kb)
}

fn unescape(value: &str) -> String {
    value.replace("\\r", "\r").replace("\\n", "\n")
}

fn template(name: &str) -> DeviceProfile {
    let mut base = builtin_profile(name).unwrap_or_else(|_| {
        builtin_profiles()
            .last()
            .cloned()
            .unwrap_or_else(super::default_profile)
    });
    base.name = name.to_string();
    base
}

fn apply(profile: &mut DeviceProfile, key: &str, value: &str, line_no: usize) -> StateResult<()> {
    match key {
        "vendor" => profile.vendor = value.into(),
        "model" => profile.model = value.into(),
        "type" => profile.device_type = value.parse()?,
        "arch" => profile.arch = value.parse()?,
        "cpu_model" => profile.cpu_model = value.into(),
        "cpu_mhz" => profile.cpu_mhz = parse_num(key, value, line_no)?,
        "cpu_cores" => profile.cpu_cores = parse_num(key, value, line_no)?.max(1),
        "memory_mb" => profile.total_ram_kb = parse_kb(key, value, line_no, 1024, MIN_RAM_KB)?,
        "ram_kb" => profile.total_ram_kb = parse_kb(key, value, line_no, 1, MIN_RAM_KB)?,
        "flash_mb" => profile.total_flash_kb = parse_kb(key, value, line_no, 1024, 1)?,
        "flash_kb" => profile.total_flash_kb = parse_kb(key, value, line_no, 1, 1)?,
        "bogomips" => profile.bogomips = parse_num(key, value, line_no)?,
        "kernel_version" => profile.kernel_version = value.into(),
        "os_name" => profile.os_name = value.into(),
        "os_version" => profile.os_version = value.into(),
        "busybox_version" => profile.busybox_version = value.into(),
        "ssh_banner" => profile.ssh_banner = unescape(value),
        "telnet_banner" => profile.telnet_banner = unescape(value),
        "mac_prefix" => profile.mac_prefix = value.to_ascii_uppercase(),
        other => warn!("profile {}: ignoring unknown key {:?}", profile.name, other),
    }
    Ok(())
}

/// Parse profile configuration text.
pub fn parse_profiles(text: &str) -> StateResult<Vec<DeviceProfile>> {
    let mut profiles: Vec<DeviceProfile> = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim();
            if name.is_empty() {
                return Err(StateError::invalid(format!("line {line_no}: empty profile name")));
            }
            profiles.push(template(name));
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            warn!("profile config line {} has no '=': {:?}", line_no, line);
            continue;
        };
        match profiles.last_mut() {
            Some(current) => apply(current, key.trim(), value.trim(), line_no)?,
            None => warn!("profile config line {} precedes any [section]", line_no),
        }
    }
    Ok(profiles)
}

/// Load profiles from `path`, falling back to the built-in catalog when the
/// file is missing or declares no sections.
pub fn load_profiles(path: &Path) -> StateResult<Vec<DeviceProfile>> {
    if !path.exists() {
        warn!("profile config {} not found, using built-in catalog", path.display());
        return Ok(builtin_profiles().to_vec());
    }
    let text = fs::read_to_string(path)?;
    let profiles = parse_profiles(&text)?;
    if profiles.is_empty() {
        warn!("profile config {} declares no profiles, using built-in catalog", path.display());
        return Ok(builtin_profiles().to_vec());
    }
    info!("loaded {} profiles from {}", profiles.len(), path.display());
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{CpuArch, DeviceType};

    const SAMPLE: &str = "\
# fleet
[Netgear_R7000]
ssh_banner = SSH-2.0-dropbear_2019.78

[Axis_M3045]
type = camera
vendor = Axis
arch = armv7l
memory_mb = 256
cpu_cores = 2
telnet_banner = AXIS login:\\r\\n
";

    #[test]
    fn builtin_section_inherits_fields() {
        let profiles = parse_profiles(SAMPLE).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].vendor, "NETGEAR");
        assert_eq!(profiles[0].ssh_banner, "SSH-2.0-dropbear_2019.78");
    }

    #[test]
    fn custom_section_overrides_template() {
        let profiles = parse_profiles(SAMPLE).unwrap();
        let axis = &profiles[1];
        assert_eq!(axis.name, "Axis_M3045");
        assert_eq!(axis.device_type, DeviceType::Camera);
        assert_eq!(axis.arch, CpuArch::Armv7);
        assert_eq!(axis.total_ram_kb, 256 * 1024);
        assert_eq!(axis.telnet_banner, "AXIS login:\r\n");
    }

    #[test]
    fn bad_number_reports_line() {
        let err = parse_profiles("[X]\ncpu_mhz = fast\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn oversized_memory_rejected() {
        let err = parse_profiles("[X]\nmemory_mb = 5000000\n").unwrap_err();
        assert!(matches!(err, StateError::InvalidInput(_)));
        assert!(err.to_string().contains("line 2"));
        assert!(parse_profiles("[X]\nflash_mb = 4294967\n").is_err());
    }

    #[test]
    fn zero_or_tiny_memory_rejected() {
        assert!(parse_profiles("[X]\nmemory_mb = 0\n").is_err());
        assert!(parse_profiles("[X]\nflash_kb = 0\n").is_err());
        assert!(parse_profiles("[X]\nram_kb = 1024\n").is_err());
        let ok = parse_profiles("[X]\nmemory_mb = 8\n").unwrap();
        assert_eq!(ok[0].total_ram_kb, 8 * 1024);
    }

    #[test]
    fn missing_file_uses_catalog() {
        let profiles = load_profiles(Path::new("/nonexistent/profiles.conf")).unwrap();
        assert_eq!(profiles.len(), builtin_profiles().len());
    }
}
