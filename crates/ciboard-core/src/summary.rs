//! Backend summary payloads and their conversion into [`AggregateSummary`].
//!
//! The backend reports counts in a few nested shapes. These types accept
//! them leniently (every field defaults to empty) and flatten them into the
//! `section -> value-key -> count` form the differ works on.

use crate::diff::AggregateSummary;
use crate::views::{BUILD_STATUSES, TEST_STATUSES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Build counts split by validity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildStatus {
    pub valid: u64,
    pub invalid: u64,
    pub null: u64,
}

impl BuildStatus {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.valid + self.invalid + self.null
    }

    /// `(status, count)` pairs keyed like the `buildStatus` section.
    #[must_use]
    pub const fn entries(&self) -> [(&'static str, u64); 3] {
        [
            (BUILD_STATUSES[0], self.valid),
            (BUILD_STATUSES[1], self.invalid),
            (BUILD_STATUSES[2], self.null),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchBuildStatus {
    pub valid: u64,
    pub invalid: u64,
    pub null: u64,
    pub compilers: Vec<String>,
}

impl ArchBuildStatus {
    #[must_use]
    pub const fn status(&self) -> BuildStatus {
        BuildStatus {
            valid: self.valid,
            invalid: self.invalid,
            null: self.null,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSummary {
    pub builds: BuildStatus,
    pub configs: BTreeMap<String, BuildStatus>,
    pub architectures: BTreeMap<String, ArchBuildStatus>,
}

impl BuildSummary {
    /// Flatten into `buildStatus`, `configs`, `archs` and `compilers`.
    ///
    /// A compiler used by several architectures gets the sum of their build
    /// counts.
    #[must_use]
    pub fn to_aggregate(&self) -> AggregateSummary {
        let mut out = AggregateSummary::new();
        for (status, count) in self.builds.entries() {
            out.add("buildStatus", status, count);
        }
        for (config, status) in &self.configs {
            out.add("configs", config, status.total());
        }
        for (arch, status) in &self.architectures {
            let total = status.status().total();
            out.add("archs", arch, total);
            for compiler in &status.compilers {
                out.add("compilers", compiler, total);
            }
        }
        out
    }
}

/// Boot or test counts per status.
///
/// Field names follow the backend's upper-case statuses; lower-case keys
/// are accepted as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCounts {
    #[serde(rename = "PASS", alias = "pass")]
    pub pass: u64,
    #[serde(rename = "FAIL", alias = "fail")]
    pub fail: u64,
    #[serde(rename = "ERROR", alias = "error")]
    pub error: u64,
    #[serde(rename = "MISS", alias = "miss")]
    pub miss: u64,
    #[serde(rename = "SKIP", alias = "skip")]
    pub skip: u64,
    #[serde(rename = "DONE", alias = "done")]
    pub done: u64,
    #[serde(rename = "NULL", alias = "null")]
    pub null: u64,
}

impl StatusCounts {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pass + self.fail + self.error + self.miss + self.skip + self.done + self.null
    }

    /// `(status, count)` pairs keyed like the `testStatus` section.
    ///
    /// `NULL` has no filter value and is left out.
    #[must_use]
    pub const fn entries(&self) -> [(&'static str, u64); 6] {
        [
            (TEST_STATUSES[0], self.pass),
            (TEST_STATUSES[1], self.fail),
            (TEST_STATUSES[2], self.error),
            (TEST_STATUSES[3], self.miss),
            (TEST_STATUSES[4], self.skip),
            (TEST_STATUSES[5], self.done),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchCompilerStatus {
    pub arch: String,
    pub compiler: String,
    pub status: StatusCounts,
}

/// Summary of a boots or tests tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestSummary {
    #[serde(alias = "statusSummary")]
    pub status: StatusCounts,
    pub configs: BTreeMap<String, StatusCounts>,
    #[serde(alias = "archSummary")]
    pub architectures: Vec<ArchCompilerStatus>,
    pub platforms_failing: Vec<String>,
}

impl TestSummary {
    /// Flatten into `status_section` (`bootStatus` or `testStatus`),
    /// `configs`, `archs` and `compilers`.
    #[must_use]
    pub fn to_aggregate(&self, status_section: &str) -> AggregateSummary {
        let mut out = AggregateSummary::new();
        for (status, count) in self.status.entries() {
            out.add(status_section, status, count);
        }
        for (config, counts) in &self.configs {
            out.add("configs", config, counts.total());
        }
        for row in &self.architectures {
            let total = row.status.total();
            if !row.arch.is_empty() {
                out.add("archs", &row.arch, total);
            }
            if !row.compiler.is_empty() {
                out.add("compilers", &row.compiler, total);
            }
        }
        out
    }
}
