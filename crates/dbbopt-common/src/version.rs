//! ---
//! dbb_section: "01-core-functionality"
//! dbb_subsection: "module"
//! dbb_type: "source"
//! dbb_scope: "code"
//! dbb_description: "Shared primitives and utilities for the study runtime."
//! dbb_version: "v0.1.0"
//! dbb_owner: "tbd"
//! ---

/// Build-time version metadata surfaced by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub package: &'static str,
    pub semver: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            package: env!("CARGO_PKG_NAME"),
            semver: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Human-readable one-liner for `--version` style output.
    pub fn extended(&self) -> String {
        format!("{} {} (rust edition 2021)", self.package, self.semver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_mentions_package_and_semver() {
        let info = VersionInfo::current();
        let line = info.extended();
        assert!(line.contains(info.package));
        assert!(line.contains(info.semver));
    }
}
