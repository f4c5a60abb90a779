// CLASSIFICATION: COMMUNITY
// Filename: format.rs v0.2
// Date Modified: 2026-10-16
// Author: Lukas Bower
//
// ─────────────────────────────────────────────────────────────
// Cerberus · Formatting Helpers
//
// Pure helpers shared by the output generators:
//
// * [`fixed2`] / [`fixed1`] – Render ×100 / ×10 fixed-point values.
// * [`uptime_phrase`] – `up 3 days,  4:05` as printed by uptime/top.
// * [`mode_string`] – `drwxr-xr-x` style permission strings.
// * [`human_kb`] – BusyBox `df -h`/`free -h` style sizes.
// ─────────────────────────────────────────────────────────────

#![forbid(unsafe_code)]

/// Render a ×100 fixed-point value with two decimals.
///
/// ```
/// use cerberus::utils::format::fixed2;
/// assert_eq!(fixed2(107), "1.07");
/// ```
pub fn fixed2(value: u32) -> String {
    format!("{}.{:02}", value / 100, value % 100)
}

/// Render a ×10 fixed-point value with one decimal.
pub fn fixed1(value: u32) -> String {
    format!("{}.{}", value / 10, value % 10)
}

/// Uptime phrase in the procps layout.
pub fn uptime_phrase(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let mins = (seconds % 3_600) / 60;
    match (days, hours) {
        (0, 0) => format!("up {} min", mins),
        (0, _) => format!("up {:2}:{:02}", hours, mins),
        (1, _) => format!("up 1 day, {:2}:{:02}", hours, mins),
        _ => format!("up {} days, {:2}:{:02}", days, hours, mins),
    }
}

/// Permission string for `ls -l`, including the type character.
pub fn mode_string(type_char: char, mode: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push(type_char);
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

/// Human readable size from kilobytes (`12.5M`, `512.0K`).
pub fn human_kb(kb: u64) -> String {
    const UNITS: [&str; 4] = ["K", "M", "G", "T"];
    let mut value = kb as f64;
    let mut idx = 0usize;
    while value >= 1024.0 && idx < UNITS.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }
    format!("{:.1}{}", value, UNITS[idx])
}

// ───────────────────────────── tests ─────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point() {
        assert_eq!(fixed2(5), "0.05");
        assert_eq!(fixed2(250), "2.50");
        assert_eq!(fixed1(7), "0.7");
        assert_eq!(fixed1(1000), "100.0");
    }

    #[test]
    fn uptime_layouts() {
        assert_eq!(uptime_phrase(125), "up 2 min");
        assert_eq!(uptime_phrase(3_600 * 5 + 60 * 7), "up  5:07");
        assert_eq!(uptime_phrase(86_400 + 3_660), "up 1 day,  1:01");
        assert_eq!(uptime_phrase(86_400 * 12), "up 12 days,  0:00");
    }

    #[test]
    fn modes() {
        assert_eq!(mode_string('d', 0o755), "drwxr-xr-x");
        assert_eq!(mode_string('-', 0o600), "-rw-------");
    }

    #[test]
    fn human_sizes() {
        assert_eq!(human_kb(512), "512.0K");
        assert_eq!(human_kb(16_384), "16.0M");
    }
}
