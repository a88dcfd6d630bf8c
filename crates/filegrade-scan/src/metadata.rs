//! Per-entry metadata lookups.

use std::fs::{self, File, Metadata};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Permission bits of an entry, masked to owner/group/other triads.
///
/// Reads the entry itself; a symlink reports its own mode.
pub fn permission_bits(path: impl AsRef<Path>) -> io::Result<u32> {
    let metadata = fs::symlink_metadata(path)?;
    Ok(get_mode(&metadata) & 0o777)
}

/// Number of hard links to an entry.
pub fn hard_link_count(path: impl AsRef<Path>) -> io::Result<u64> {
    let metadata = fs::symlink_metadata(path)?;
    Ok(get_nlink(&metadata))
}

/// Last modification time of an entry, without following symlinks.
pub fn modified_time(path: impl AsRef<Path>) -> io::Result<DateTime<Local>> {
    let metadata = fs::symlink_metadata(path)?;
    Ok(DateTime::<Local>::from(metadata.modified()?))
}

/// Count the lines of a text file.
///
/// A final line without a trailing newline still counts.
pub fn count_lines(path: impl AsRef<Path>) -> io::Result<u64> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = [0u8; 8192];
    let mut lines = 0u64;
    let mut last = None;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        lines += buf[..n].iter().filter(|&&b| b == b'\n').count() as u64;
        last = Some(buf[n - 1]);
    }

    if last.is_some_and(|b| b != b'\n') {
        lines += 1;
    }
    Ok(lines)
}

/// Number of immediate children that are regular files named `*.c`.
pub fn c_file_count(dir: impl AsRef<Path>) -> io::Result<u64> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // DirEntry::file_type does not follow symlinks
        if entry.file_type()?.is_file() && entry.file_name().to_string_lossy().ends_with(".c") {
            count += 1;
        }
    }
    Ok(count)
}

/// Size of the file a symlink points at.
///
/// Relative targets are resolved against the link's own directory. A
/// dangling link yields the `NotFound` error from the target lookup.
pub fn symlink_target_size(link: impl AsRef<Path>) -> io::Result<u64> {
    let link = link.as_ref();
    let target = fs::read_link(link)?;
    let target = resolve_target(link, target);
    Ok(fs::metadata(target)?.len())
}

fn resolve_target(link: &Path, target: PathBuf) -> PathBuf {
    if target.is_absolute() {
        return target;
    }
    match link.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(target),
        _ => target,
    }
}

// Cross-platform metadata helpers

/// Get the raw mode bits from metadata.
#[cfg(unix)]
fn get_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn get_mode(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() { 0o444 } else { 0o666 }
}

/// Get the number of hard links from metadata.
#[cfg(unix)]
fn get_nlink(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.nlink()
}

#[cfg(not(unix))]
fn get_nlink(_metadata: &Metadata) -> u64 {
    1 // Assume single link on Windows
}
