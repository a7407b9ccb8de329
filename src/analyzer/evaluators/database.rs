//! Database connection conditionals, shared by the postgres, mysql and redis
//! analyzers.
//!
//! - `connected == true` (equality only)
//! - `version >= 14.0.0`, `version >=12.0.0 <16.0.0` (a version range)

use crate::analyzer::conditional::{ClauseSyntax, Conditional, Evaluator, RangeClause, parse_bool};
use crate::analyzer::values::{Version, VersionRange};
use crate::error::{AnalyzeError, Result, ResultExt};
use serde::{Deserialize, Serialize};

/// Collected connection probe (`<driver>/<name>.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConnection {
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

pub struct DatabaseEvaluator;

impl DatabaseEvaluator {
    fn version_in_range(&self, conn: &DatabaseConnection, range: &str) -> Result<bool> {
        let range = VersionRange::parse(range)?;
        let actual = Version::parse_reported(&conn.version)
            .with_context(|| format!("failed to parse collected version {:?}", conn.version))?;
        Ok(range.contains(&actual))
    }
}

impl Evaluator for DatabaseEvaluator {
    type Data = DatabaseConnection;

    fn syntax(&self) -> ClauseSyntax {
        ClauseSyntax::new("database")
    }

    fn evaluate(&self, when: &str, conn: &DatabaseConnection) -> Result<bool> {
        // version ranges may span several tokens
        let range = RangeClause::parse(when)?;
        if range.operand == "version" {
            return self.version_in_range(conn, &range.range);
        }
        let clause = self.syntax().parse(when)?;
        self.evaluate_clause(&clause, conn)
    }

    fn evaluate_clause(&self, clause: &Conditional, conn: &DatabaseConnection) -> Result<bool> {
        match clause.operand.as_str() {
            "connected" => {
                let desired = parse_bool(&clause.literal)?;
                clause.operator()?.compare_eq(&conn.is_connected, &desired, "connected")
            }
            "version" => self.version_in_range(conn, &format!("{}{}", clause.operator()?, clause.literal)),
            other => Err(AnalyzeError::unknown_operand("database", other)),
        }
    }
}
