//! Target operating systems and what differs between them.
//!
//! Everything OS-specific the engine needs (listing commands, filename date
//! heuristics, compress and delete commands, path splitting) sits behind
//! [`Platform`]. Orchestration only ever talks to the trait.

mod linux;
mod windows;

use std::fmt;

use jiff::civil::Date;

pub use linux::Linux;
pub use windows::Windows;

/// The operating system of a managed server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsType {
    Linux,
    Windows,
}

impl OsType {
    /// Parse an inventory `os` value. Case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linux" => Some(Self::Linux),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }

    pub fn platform(self) -> &'static dyn Platform {
        match self {
            Self::Linux => &Linux,
            Self::Windows => &Windows,
        }
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
        })
    }
}

/// Which files a listing command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// Only `.gz` and `.zip` files.
    Compressed,

    /// Everything except `.gz` and `.zip` files.
    Uncompressed,

    /// Every regular file.
    All,
}

/// Commands for compressing one file in place.
///
/// When `cleanup` is present the compression leaves the original behind and
/// a second command must remove it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressCommands {
    pub compress: String,
    pub cleanup: Option<String>,
}

/// OS capabilities used by discovery, eligibility and the action executors.
pub trait Platform: Sync {
    fn os(&self) -> OsType;

    /// Quote a path for the target's shell.
    fn quote(&self, value: &str) -> String;

    /// A command that prints one absolute file path per line, recursively.
    fn list_files(&self, base_path: &str, listing: Listing) -> String;

    /// Recover the calendar date embedded in a filename.
    fn extract_date(&self, filename: &str) -> Option<Date>;

    fn compress(&self, path: &str) -> CompressCommands;

    fn delete(&self, path: &str) -> String;

    /// The bare filename of a remote path.
    fn file_name<'a>(&self, path: &'a str) -> &'a str;

    /// Directory components of `path` below `base_path`, excluding the
    /// filename itself. Empty if the file sits directly in `base_path` or
    /// lies outside it.
    fn relative_dirs(&self, base_path: &str, path: &str) -> Vec<String>;
}

/// Build a date from parsed digits, rejecting year zero like the C library does.
fn civil_date(year: i16, month: i8, day: i8) -> Option<Date> {
    if year < 1 {
        return None;
    }
    Date::new(year, month, day).ok()
}
