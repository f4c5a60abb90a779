// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Device profile catalog.
//!
//! A profile is the immutable identity a fake device claims: vendor and model,
//! CPU and memory sizing, kernel and firmware strings, service banners and the
//! vendor MAC prefix. The state engine copies a profile into the model on every
//! morph and never edits it in place.

pub mod loader;

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};

/// Smallest RAM size a profile may declare.
pub const MIN_RAM_KB: u32 = 4 * 1024;

/// Broad device category; drives service catalogs and hostnames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    Router,
    Camera,
    Dvr,
    Nas,
    Printer,
    GenericIot,
}

impl DeviceType {
    /// Hostname prefix used by the initializer.
    pub fn hostname_prefix(&self) -> Option<&'static str> {
        match self {
            DeviceType::Router => Some("router"),
            DeviceType::Camera => Some("cam"),
            DeviceType::Dvr => Some("dvr"),
            DeviceType::Nas => Some("nas"),
            DeviceType::Printer => Some("printer"),
            DeviceType::GenericIot => None,
        }
    }
}

impl FromStr for DeviceType {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "router" => Ok(DeviceType::Router),
            "camera" | "ipcam" => Ok(DeviceType::Camera),
            "dvr" | "nvr" => Ok(DeviceType::Dvr),
            "nas" => Ok(DeviceType::Nas),
            "printer" => Ok(DeviceType::Printer),
            "generic" | "iot" | "generic_iot" => Ok(DeviceType::GenericIot),
            other => Err(StateError::invalid(format!("unknown device type {other:?}"))),
        }
    }
}

/// CPU architecture reported by `uname -m` and `/proc/cpuinfo`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuArch {
    Mips,
    Mipsel,
    Arm,
    Armv7,
    Aarch64,
    X86,
    X86_64,
}

impl CpuArch {
    pub fn uname(&self) -> &'static str {
        match self {
            CpuArch::Mips => "mips",
            CpuArch::Mipsel => "mipsel",
            CpuArch::Arm => "armv6l",
            CpuArch::Armv7 => "armv7l",
            CpuArch::Aarch64 => "aarch64",
            CpuArch::X86 => "i686",
            CpuArch::X86_64 => "x86_64",
        }
    }

    pub fn is_mips(&self) -> bool {
        matches!(self, CpuArch::Mips | CpuArch::Mipsel)
    }

    pub fn is_arm(&self) -> bool {
        matches!(self, CpuArch::Arm | CpuArch::Armv7 | CpuArch::Aarch64)
    }
}

impl fmt::Display for CpuArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uname())
    }
}

impl FromStr for CpuArch {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mips" => Ok(CpuArch::Mips),
            "mipsel" => Ok(CpuArch::Mipsel),
            "arm" | "armv6l" => Ok(CpuArch::Arm),
            "armv7" | "armv7l" => Ok(CpuArch::Armv7),
            "aarch64" | "arm64" => Ok(CpuArch::Aarch64),
            "x86" | "i686" | "i386" => Ok(CpuArch::X86),
            "x86_64" | "amd64" => Ok(CpuArch::X86_64),
            other => Err(StateError::invalid(format!("unknown architecture {other:?}"))),
        }
    }
}

/// Static identity template for a fake device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub name: String,
    pub vendor: String,
    pub model: String,
    pub device_type: DeviceType,
    pub arch: CpuArch,
    pub cpu_model: String,
    pub cpu_mhz: u32,
    pub cpu_cores: u32,
    pub total_ram_kb: u32,
    pub total_flash_kb: u32,
    /// BogoMIPS ×100.
    pub bogomips: u32,
    pub kernel_version: String,
    pub os_name: String,
    pub os_version: String,
    pub busybox_version: String,
    pub ssh_banner: String,
    pub telnet_banner: String,
    /// Vendor OUI, `AA:BB:CC`.
    pub mac_prefix: String,
}

#[allow(clippy::too_many_arguments)]
fn profile(
    name: &str,
    vendor: &str,
    model: &str,
    device_type: DeviceType,
    arch: CpuArch,
    cpu_model: &str,
    cpu_mhz: u32,
    cpu_cores: u32,
    ram_mb: u32,
    flash_mb: u32,
    bogomips: u32,
    kernel: &str,
    os: (&str, &str),
    busybox: &str,
    banners: (&str, &str),
    mac_prefix: &str,
) -> DeviceProfile {
    DeviceProfile {
        name: name.into(),
        vendor: vendor.into(),
        model: model.into(),
        device_type,
        arch,
        cpu_model: cpu_model.into(),
        cpu_mhz,
        cpu_cores,
        total_ram_kb: ram_mb * 1024,
        total_flash_kb: flash_mb * 1024,
        bogomips,
        kernel_version: kernel.into(),
        os_name: os.0.into(),
        os_version: os.1.into(),
        busybox_version: busybox.into(),
        ssh_banner: banners.0.into(),
        telnet_banner: banners.1.into(),
        mac_prefix: mac_prefix.into(),
    }
}

static BUILTIN: Lazy<Vec<DeviceProfile>> = Lazy::new(|| {
    vec![
        profile(
            "TP-Link_Archer_C7",
            "TP-Link",
            "Archer C7 v4",
            DeviceType::Router,
            CpuArch::Mips,
            "MIPS 74Kc V5.0",
            720,
            1,
            128,
            16,
            36168,
            "3.10.49",
            ("OpenWrt", "18.06.4"),
            "1.24.1",
            ("SSH-2.0-dropbear_2017.75", "TP-Link Archer C7 v4\r\nLogin: "),
            "14:CC:20",
        ),
        profile(
            "Hikvision_DS-2CD2",
            "Hikvision",
            "DS-2CD2032-I",
            DeviceType::Camera,
            CpuArch::Armv7,
            "ARMv7 Processor rev 5 (v7l)",
            600,
            1,
            64,
            8,
            60000,
            "3.0.8",
            ("Embedded Linux", "2.3"),
            "1.20.2",
            ("SSH-2.0-OpenSSH_5.8p1", "Hikvision Digital Technology\r\nLogin: "),
            "44:19:B6",
        ),
        profile(
            "Netgear_R7000",
            "NETGEAR",
            "R7000 Nighthawk",
            DeviceType::Router,
            CpuArch::Armv7,
            "ARMv7 Processor rev 0 (v7l)",
            1000,
            2,
            256,
            128,
            199800,
            "2.6.36.4brcmarm",
            ("DD-WRT", "v3.0"),
            "1.24.1",
            ("SSH-2.0-dropbear_2015.71", "NETGEAR R7000\r\nLogin: "),
            "A0:63:91",
        ),
        profile(
            "Dahua_IPC-HDW",
            "Dahua",
            "IPC-HDW4631C-A",
            DeviceType::Camera,
            CpuArch::Armv7,
            "ARMv7 Processor rev 4 (v7l)",
            800,
            1,
            128,
            16,
            79200,
            "3.4.35",
            ("Embedded Linux", "2.600"),
            "1.22.1",
            ("SSH-2.0-OpenSSH_6.0p1", "Dahua Technology Co., Ltd.\r\nLogin: "),
            "3C:EF:8C",
        ),
        profile(
            "D-Link_DIR-615",
            "D-Link",
            "DIR-615",
            DeviceType::Router,
            CpuArch::Mips,
            "MIPS 24Kc V7.4",
            400,
            1,
            32,
            4,
            26640,
            "2.6.30",
            ("Linux", "2.6.30"),
            "1.12.1",
            ("SSH-2.0-dropbear_2014.63", "D-Link DIR-615\r\nPassword: "),
            "00:1B:11",
        ),
        profile(
            "XiongMai_NBD80",
            "XiongMai",
            "NBD80X16S-KL",
            DeviceType::Dvr,
            CpuArch::Armv7,
            "ARMv7 Processor rev 1 (v7l)",
            1000,
            2,
            256,
            16,
            199600,
            "3.10.0",
            ("Embedded Linux", "V4.02.R11"),
            "1.20.2",
            ("SSH-2.0-dropbear_2014.66", "LocalHost login: "),
            "00:12:41",
        ),
        profile(
            "Generic_IoT",
            "Generic",
            "IoT Device",
            DeviceType::GenericIot,
            CpuArch::Armv7,
            "ARMv7 Processor",
            500,
            1,
            64,
            8,
            50000,
            "3.4.0",
            ("Embedded Linux", "1.0"),
            "1.24.1",
            ("SSH-2.0-dropbear_2016.74", "Login: "),
            "00:11:22",
        ),
    ]
});

/// All built-in profiles, in catalog order.
pub fn builtin_profiles() -> &'static [DeviceProfile] {
    &BUILTIN
}

/// Names of the built-in profiles.
pub fn list_builtin_profiles() -> Vec<&'static str> {
    BUILTIN.iter().map(|p| p.name.as_str()).collect()
}

/// Look up a built-in profile by case-insensitive name.
pub fn builtin_profile(name: &str) -> StateResult<DeviceProfile> {
    BUILTIN
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| StateError::not_found("profile", name))
}

/// Profile used when the caller does not pick one.
pub fn default_profile() -> DeviceProfile {
    BUILTIN[0].clone()
}
