//! Windows targets: PowerShell over the remote shell.

use std::sync::LazyLock;

use jiff::civil::Date;
use regex::Regex;

use super::{CompressCommands, Listing, OsType, Platform, civil_date};

/// IIS-style `_exYYMMDD`.
static IIS_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_ex([0-9]{2})([0-9]{2})([0-9]{2})").expect("invalid IIS date regex")
});

/// Two-digit years below this pivot land in the 2000s, the rest in the 1900s.
const CENTURY_PIVOT: i16 = 69;

pub struct Windows;

impl Windows {
    fn powershell(script: &str) -> String {
        format!("powershell -Command \"{script}\"")
    }
}

impl Platform for Windows {
    fn os(&self) -> OsType {
        OsType::Windows
    }

    fn quote(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn list_files(&self, base_path: &str, listing: Listing) -> String {
        let base = self.quote(base_path);
        let filter = match listing {
            Listing::Compressed => " -Include '*.gz','*.zip' -File",
            Listing::Uncompressed => " -File -Exclude '*.gz','*.zip'",
            Listing::All => " -File",
        };
        Self::powershell(&format!(
            "Get-ChildItem -Path {base} -Recurse{filter} | Select-Object -ExpandProperty FullName"
        ))
    }

    fn extract_date(&self, filename: &str) -> Option<Date> {
        let caps = IIS_DATE.captures(filename)?;
        let yy: i16 = caps[1].parse().ok()?;
        let year = if yy < CENTURY_PIVOT { 2000 + yy } else { 1900 + yy };
        civil_date(year, caps[2].parse().ok()?, caps[3].parse().ok()?)
    }

    fn compress(&self, path: &str) -> CompressCommands {
        let source = self.quote(path);
        let archive = self.quote(&format!("{path}.zip"));
        CompressCommands {
            compress: Self::powershell(&format!(
                "Compress-Archive -LiteralPath {source} -DestinationPath {archive} -ErrorAction Stop"
            )),
            cleanup: Some(Self::powershell(&format!(
                "Remove-Item -Force -LiteralPath {source} -ErrorAction Stop"
            ))),
        }
    }

    fn delete(&self, path: &str) -> String {
        Self::powershell(&format!(
            "Remove-Item -Force -LiteralPath {} -ErrorAction Stop",
            self.quote(path)
        ))
    }

    fn file_name<'a>(&self, path: &'a str) -> &'a str {
        path.rsplit(['\\', '/']).next().unwrap_or(path)
    }

    fn relative_dirs(&self, base_path: &str, path: &str) -> Vec<String> {
        let base = base_path.trim_end_matches(['\\', '/']);
        let prefix_matches = path
            .get(..base.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(base));
        if !prefix_matches {
            return Vec::new();
        }

        let rest = &path[base.len()..];
        if !rest.is_empty() && !rest.starts_with(['\\', '/']) {
            return Vec::new();
        }

        let mut parts: Vec<String> = rest
            .split(['\\', '/'])
            .filter(|p| !p.is_empty() && *p != ".")
            .map(String::from)
            .collect();
        parts.pop();
        parts
    }
}
