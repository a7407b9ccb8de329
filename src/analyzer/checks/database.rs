//! Database connectivity and server version checks.

use super::{Analyzer, require_outcomes};
use crate::analyzer::conditional::Evaluator;
use crate::analyzer::evaluators::{DatabaseConnection, DatabaseEvaluator, decode_json};
use crate::analyzer::outcome::resolve;
use crate::analyzer::provider::FileProvider;
use crate::analyzer::types::{AnalyzeMeta, AnalyzeResult, Outcome};
use crate::error::{Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which collector produced the connection probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[default]
    Postgres,
    Mysql,
    Redis,
}

impl DatabaseDriver {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "mysql" => Some(Self::Mysql),
            "redis" => Some(Self::Redis),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Redis => "redis",
        }
    }

    fn icon(&self) -> (&'static str, &'static str) {
        match self {
            Self::Postgres => (
                "kubernetes_postgres_analyze",
                "https://troubleshoot.sh/images/analyzer-icons/postgres-analyze.svg",
            ),
            Self::Mysql => (
                "kubernetes_mysql_analyze",
                "https://troubleshoot.sh/images/analyzer-icons/mysql-analyze.svg",
            ),
            Self::Redis => (
                "kubernetes_redis_analyze",
                "https://troubleshoot.sh/images/analyzer-icons/redis-analyze.svg",
            ),
        }
    }
}

impl fmt::Display for DatabaseDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `analyzers[].postgres`, `analyzers[].mysql` and `analyzers[].redis`.
/// The driver comes from the key the entry was declared under.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseAnalyzer {
    #[serde(skip)]
    pub driver: DatabaseDriver,
    #[serde(flatten)]
    pub meta: AnalyzeMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector_name: Option<String>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

impl DatabaseAnalyzer {
    pub fn new(driver: DatabaseDriver, outcomes: Vec<Outcome>) -> Self {
        Self {
            driver,
            outcomes,
            ..Self::default()
        }
    }

    pub fn with_driver(mut self, driver: DatabaseDriver) -> Self {
        self.driver = driver;
        self
    }

    fn collector_name(&self) -> &str {
        self.collector_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(self.driver.as_str())
    }

    /// `<driver>/<collectorName>.json`
    pub fn path(&self) -> String {
        format!("{}/{}.json", self.driver, self.collector_name())
    }
}

impl Analyzer for DatabaseAnalyzer {
    fn title(&self) -> String {
        self.meta.title_or(self.collector_name())
    }

    fn is_excluded(&self) -> Result<bool> {
        self.meta.is_excluded()
    }

    fn analyze(&self, provider: &dyn FileProvider) -> Result<Vec<AnalyzeResult>> {
        let title = self.title();
        require_outcomes(&title, &self.outcomes)?;
        let path = self.path();
        let data = provider
            .get_collected_file_contents(&path)
            .with_context(|| format!("failed to read collected file name: {}", path))?;
        let conn: DatabaseConnection = decode_json("database connection result", &data)?;

        let (icon_key, icon_uri) = self.driver.icon();
        let result = resolve(&self.outcomes, &title, |when| DatabaseEvaluator.evaluate(when, &conn))
            .with_context(|| format!("failed to compare {} database conditional", self.driver))?
            .with_icon(icon_key, icon_uri)
            .with_strict(self.meta.is_strict()?);
        Ok(vec![result])
    }
}
