//! Host operating system conditionals.
//!
//! The operand picks which reported version the range is checked against:
//! - `kernelVersion >= 5.4` checks the kernel release
//! - `ubuntu >= 20.04` checks the distribution version, when the host runs that platform
//! - `ubuntu-20.04-kernel >= 5.15` checks the kernel, only on that exact platform release
//!
//! A platform operand that doesn't describe the host never matches.

use crate::analyzer::conditional::{ClauseSyntax, Conditional, Evaluator, RangeClause};
use crate::analyzer::values::{Version, VersionRange};
use crate::error::{Result, ResultExt};
use log::trace;
use serde::{Deserialize, Serialize};

/// Collected host OS details (`host-collectors/system/hostos_info.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostOsInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kernel_version: String,
    #[serde(default)]
    pub platform_version: String,
    #[serde(default)]
    pub platform: String,
}

impl HostOsInfo {
    /// Operand naming the kernel of this exact platform release.
    pub fn kernel_operand(&self) -> String {
        format!("{}-{}-kernel", self.platform, self.platform_version)
    }
}

pub struct HostOsEvaluator;

impl HostOsEvaluator {
    fn in_range(range: &VersionRange, reported: &str, what: &str) -> Result<bool> {
        let version =
            Version::parse_reported(reported).with_context(|| format!("failed to parse {} {:?}", what, reported))?;
        Ok(range.contains(&version))
    }
}

fn is_platform_kernel_operand(operand: &str) -> bool {
    let parts: Vec<&str> = operand.split('-').collect();
    parts.len() == 3 && parts[2] == "kernel"
}

impl Evaluator for HostOsEvaluator {
    type Data = HostOsInfo;

    fn syntax(&self) -> ClauseSyntax {
        ClauseSyntax::new("hostOS")
    }

    fn evaluate(&self, when: &str, info: &HostOsInfo) -> Result<bool> {
        let clause = RangeClause::parse(when)?;
        let range = VersionRange::parse(&clause.range)?;

        let matched = if clause.operand == "kernelVersion" {
            Self::in_range(&range, &info.kernel_version, "kernel version")?
        } else if is_platform_kernel_operand(&clause.operand) {
            clause.operand == info.kernel_operand()
                && Self::in_range(&range, &info.kernel_version, "kernel version")?
        } else if clause.operand == info.platform {
            Self::in_range(&range, &info.platform_version, "platform version")?
        } else {
            false
        };
        trace!("hostOS `{}` => {}", when.trim(), matched);
        Ok(matched)
    }

    fn evaluate_clause(&self, clause: &Conditional, info: &HostOsInfo) -> Result<bool> {
        self.evaluate(&clause.to_string(), info)
    }
}
