// CLASSIFICATION: COMMUNITY
// Filename: fs.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Filesystem listing generators (`ls`, `find`, `du`).

use std::fmt::Write;

use crate::error::{StateError, StateResult};
use crate::state::model::{FileEntry, FileType, StateModel};
use crate::utils::format::mode_string;

use super::format_time;

const SIX_MONTHS: i64 = 182 * 86_400;

fn long_line(out: &mut String, s: &StateModel, f: &FileEntry, name: &str) {
    let links = if f.is_dir() {
        2 + s.children(&f.path).iter().filter(|c| c.is_dir()).count()
    } else {
        1
    };
    let size = match (f.file_type, f.rdev) {
        (FileType::Device, Some((major, minor))) => format!("{major:>3}, {minor:>3}"),
        _ => f.size.to_string(),
    };
    let mtime = s.boot_time + f.mtime_offset;
    let date = if s.now() - mtime > SIX_MONTHS {
        format_time(mtime, "%b %e  %Y")
    } else {
        format_time(mtime, "%b %e %H:%M")
    };
    let _ = write!(
        out,
        "{} {:>3} {:<8} {:<8} {:>8} {} {}",
        mode_string(f.file_type.type_char(), f.mode),
        links,
        f.owner,
        f.group,
        size,
        date,
        name
    );
    if let Some(target) = &f.target {
        let _ = write!(out, " -> {}", target);
    }
    out.push('\n');
}

/// `ls [-l] [-a] path`.
pub fn ls(s: &StateModel, path: &str, long: bool, all: bool) -> StateResult<String> {
    let entry = s
        .file(path)
        .ok_or_else(|| StateError::not_found("file", path))?;
    let mut out = String::new();
    if !entry.is_dir() {
        if long {
            long_line(&mut out, s, entry, &entry.path);
        } else {
            let _ = writeln!(out, "{}", entry.path);
        }
        return Ok(out);
    }

    let mut listing: Vec<(&FileEntry, String)> = Vec::new();
    if all {
        listing.push((entry, ".".into()));
        let parent = s.file(crate::state::parent_of(path)).unwrap_or(entry);
        listing.push((parent, "..".into()));
    }
    for child in s.children(path) {
        if all || !child.name().starts_with('.') {
            listing.push((child, child.name().to_string()));
        }
    }

    if long {
        let blocks: u64 = listing
            .iter()
            .filter(|(f, _)| f.file_type == FileType::Regular)
            .map(|(f, _)| f.size.div_ceil(1024))
            .sum();
        let _ = writeln!(out, "total {}", blocks);
        for (f, name) in &listing {
            long_line(&mut out, s, f, name);
        }
    } else {
        for (_, name) in &listing {
            let _ = writeln!(out, "{}", name);
        }
    }
    Ok(out)
}

fn walk(s: &StateModel, dir: &FileEntry, out: &mut String) {
    for child in s.children(&dir.path) {
        let _ = writeln!(out, "{}", child.path);
        if child.is_dir() {
            walk(s, child, out);
        }
    }
}

/// `find root`, depth-first in name order.
pub fn find(s: &StateModel, root: &str) -> StateResult<String> {
    let entry = s
        .file(root)
        .ok_or_else(|| StateError::not_found("file", root))?;
    let mut out = format!("{}\n", entry.path);
    if entry.is_dir() {
        walk(s, entry, &mut out);
    }
    Ok(out)
}

/// Usage of `entry` in 1 kB blocks. Directories are listed after their
/// contents when `out` is given.
fn usage(s: &StateModel, entry: &FileEntry, out: &mut Option<&mut String>) -> u64 {
    let own = match entry.file_type {
        FileType::Regular | FileType::Directory => entry.size.div_ceil(1024),
        _ => 0,
    };
    if !entry.is_dir() {
        return own;
    }
    let total = own
        + s.children(&entry.path)
            .into_iter()
            .map(|child| usage(s, child, out))
            .sum::<u64>();
    if let Some(out) = out.as_deref_mut() {
        let _ = writeln!(out, "{}\t{}", total, entry.path);
    }
    total
}

/// `du [-s] path`.
pub fn du(s: &StateModel, root: &str, summary: bool) -> StateResult<String> {
    let entry = s
        .file(root)
        .ok_or_else(|| StateError::not_found("file", root))?;
    let mut out = String::new();
    if summary || !entry.is_dir() {
        let total = usage(s, entry, &mut None);
        let _ = writeln!(out, "{}\t{}", total, entry.path);
    } else {
        usage(s, entry, &mut Some(&mut out));
    }
    Ok(out)
}
