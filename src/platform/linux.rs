//! Linux targets: POSIX shell, `find`, `gzip`, `rm`.

use std::sync::LazyLock;

use jiff::civil::Date;
use regex::Regex;

use super::{CompressCommands, Listing, OsType, Platform, civil_date};

/// `.YYYY-MM-DD` anywhere in the name.
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.([0-9]{4})-([0-9]{2})-([0-9]{2})").expect("invalid ISO date regex")
});

/// `.YYYYMMDDhhmm` anywhere in the name; the time part is ignored.
static STAMP_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.([0-9]{4})([0-9]{2})([0-9]{2})[0-9]{4}").expect("invalid timestamp regex")
});

pub struct Linux;

impl Platform for Linux {
    fn os(&self) -> OsType {
        OsType::Linux
    }

    fn quote(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', r"'\''"))
    }

    fn list_files(&self, base_path: &str, listing: Listing) -> String {
        let base = self.quote(base_path);
        match listing {
            Listing::Compressed => {
                format!(r"find {base} -type f \( -name '*.gz' -o -name '*.zip' \)")
            }
            Listing::Uncompressed => {
                format!("find {base} -type f ! -name '*.gz' ! -name '*.zip'")
            }
            Listing::All => format!("find {base} -type f"),
        }
    }

    /// The first heuristic that finds its pattern decides; an invalid date
    /// there does not fall through to the next one.
    fn extract_date(&self, filename: &str) -> Option<Date> {
        let caps = ISO_DATE
            .captures(filename)
            .or_else(|| STAMP_DATE.captures(filename))?;
        civil_date(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )
    }

    fn compress(&self, path: &str) -> CompressCommands {
        CompressCommands {
            compress: format!("gzip {}", self.quote(path)),
            cleanup: None,
        }
    }

    fn delete(&self, path: &str) -> String {
        format!("rm -- {}", self.quote(path))
    }

    fn file_name<'a>(&self, path: &'a str) -> &'a str {
        path.rsplit('/').next().unwrap_or(path)
    }

    fn relative_dirs(&self, base_path: &str, path: &str) -> Vec<String> {
        let base = base_path.trim_end_matches('/');
        let Some(rest) = path.strip_prefix(base) else {
            return Vec::new();
        };
        if !rest.is_empty() && !rest.starts_with('/') {
            return Vec::new();
        }

        let mut parts: Vec<String> = rest
            .split('/')
            .filter(|p| !p.is_empty() && *p != ".")
            .map(String::from)
            .collect();
        parts.pop();
        parts
    }
}
