//! HTTP probe conditionals.
//!
//! - `error` matches when the request failed outright
//! - `statusCode <op> <int>` compares the response status

use crate::analyzer::conditional::{ClauseSyntax, Conditional, Evaluator, parse_int};
use crate::error::{AnalyzeError, Result};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Collected HTTP probe result (`host-collectors/http/<name>.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResult {
    #[serde(default, alias = "Error", skip_serializing_if = "Option::is_none")]
    pub error: Option<HttpError>,
    #[serde(default, alias = "Response", skip_serializing_if = "Option::is_none")]
    pub response: Option<HttpResponse>,
}

pub struct HttpEvaluator;

impl Evaluator for HttpEvaluator {
    type Data = HttpResult;

    fn syntax(&self) -> ClauseSyntax {
        ClauseSyntax::new("http")
    }

    fn evaluate(&self, when: &str, data: &HttpResult) -> Result<bool> {
        if when.trim() == "error" {
            trace!("http `error` => {}", data.error.is_some());
            return Ok(data.error.is_some());
        }
        let clause = self.syntax().parse(when)?;
        self.evaluate_clause(&clause, data)
    }

    fn evaluate_clause(&self, clause: &Conditional, data: &HttpResult) -> Result<bool> {
        match clause.operand.as_str() {
            "statusCode" => {
                let op = clause.operator()?;
                let desired = parse_int(&clause.literal)?;
                // no response, nothing to compare
                let Some(response) = &data.response else {
                    return Ok(false);
                };
                Ok(op.compare(&response.status, &desired))
            }
            other => Err(AnalyzeError::unknown_operand("http", other)),
        }
    }
}
