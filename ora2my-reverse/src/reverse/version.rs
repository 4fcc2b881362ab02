//! Target engine version gate for foreign key and check constraint placement

use crate::config::defaults;

/// Which script a statement is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Primary,
    Compatibility,
}

/// Routing of constraint kinds whose support depends on the target engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub foreign_keys: Destination,
    pub check_constraints: Destination,
}

/// Parsed target version string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub raw: String,
    pub is_tidb: bool,
    /// Dot-separated numeric components with trailing zeros removed
    pub ordinal: Vec<u64>,
}

impl VersionInfo {
    /// Parse a server version such as `8.0.28` or `5.7.25-TiDB-v5.0.1`
    pub fn parse(raw: &str) -> Self {
        let numeric = raw
            .split(defaults::MYSQL_VERSION_DELIMITER)
            .next()
            .unwrap_or_default();
        Self {
            raw: raw.to_string(),
            is_tidb: raw.contains("TiDB"),
            ordinal: version_ordinal(numeric),
        }
    }

    /// Whether the server is newer than the first release that enforces CHECK
    pub fn enforces_check_constraints(&self) -> bool {
        self.ordinal > version_ordinal(defaults::MYSQL_CHECK_CONS_VERSION)
    }

    /// TiDB: both kinds to compatibility. Newer MySQL: both primary.
    /// Older MySQL: foreign keys primary, checks to compatibility.
    pub fn placement(&self) -> Placement {
        if self.is_tidb {
            Placement {
                foreign_keys: Destination::Compatibility,
                check_constraints: Destination::Compatibility,
            }
        } else if self.enforces_check_constraints() {
            Placement {
                foreign_keys: Destination::Primary,
                check_constraints: Destination::Primary,
            }
        } else {
            Placement {
                foreign_keys: Destination::Primary,
                check_constraints: Destination::Compatibility,
            }
        }
    }
}

/// Comparable form of a dotted version; missing components count as zero
pub fn version_ordinal(version: &str) -> Vec<u64> {
    let mut parts: Vec<u64> = version
        .trim()
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        })
        .collect();
    while parts.last() == Some(&0) {
        parts.pop();
    }
    parts
}
