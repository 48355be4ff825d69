use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument};
use ureq::Agent;

use crate::materials::tools::config::Config;
use crate::materials::tools::error::{Result, ToolError};
use crate::materials::tools::model::RawDocument;

/// Result count used when the caller does not pass a limit.
pub const DEFAULT_LIMIT: usize = 10;
/// Band gap bound substituted for a missing minimum.
pub const BAND_GAP_FLOOR: f64 = 0.0;
/// Band gap bound substituted for a missing maximum.
pub const BAND_GAP_CEILING: f64 = 100.0;

const API_KEY_HEADER: &str = "X-API-KEY";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Criteria passed to the retrieval service. Unset criteria do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub material_ids: Vec<String>,
    pub formula: Option<String>,
    pub elements: Vec<String>,
    pub chemsys: Option<String>,
    /// Inclusive `(min, max)` band gap range in eV.
    pub band_gap: Option<(f64, f64)>,
    pub stable_only: bool,
    pub metal_only: bool,
    pub magnetic_only: bool,
    /// Ignored when `material_ids` is set; the id list bounds the result.
    pub limit: Option<usize>,
}

impl SearchFilter {
    /// Filter selecting exactly the given identifiers.
    pub fn by_ids(ids: &[String]) -> Self {
        Self {
            material_ids: ids.to_vec(),
            ..Self::default()
        }
    }

    /// Sets the band gap range. A single bound is completed with
    /// [`BAND_GAP_FLOOR`] or [`BAND_GAP_CEILING`]; no bounds clears it.
    pub fn with_band_gap(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.band_gap = match (min, max) {
            (None, None) => None,
            (min, max) => Some((
                min.unwrap_or(BAND_GAP_FLOOR),
                max.unwrap_or(BAND_GAP_CEILING),
            )),
        };
        self
    }

    /// Query string parameters understood by the summary endpoint.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if !self.material_ids.is_empty() {
            params.push(("material_ids", self.material_ids.join(",")));
        }
        if let Some(formula) = &self.formula {
            params.push(("formula", formula.clone()));
        }
        if !self.elements.is_empty() {
            params.push(("elements", self.elements.join(",")));
        }
        if let Some(chemsys) = &self.chemsys {
            params.push(("chemsys", chemsys.clone()));
        }
        if let Some((min, max)) = self.band_gap {
            params.push(("band_gap_min", min.to_string()));
            params.push(("band_gap_max", max.to_string()));
        }
        if self.stable_only {
            params.push(("is_stable", "true".to_string()));
        }
        if self.metal_only {
            params.push(("is_metal", "true".to_string()));
        }
        if self.magnetic_only {
            params.push(("is_magnetic", "true".to_string()));
        }

        let limit = if self.material_ids.is_empty() {
            self.limit.unwrap_or(DEFAULT_LIMIT)
        } else {
            self.material_ids.len()
        };
        params.push(("_limit", limit.to_string()));

        params
    }

    /// Query parameters keyed by name, echoed back in search results.
    pub fn describe(&self) -> BTreeMap<String, String> {
        self.query_params()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

/// Trims identifiers and drops blank entries, keeping their order.
pub fn clean_ids<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|id| id.as_ref().trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Source of raw material documents.
pub trait Retriever {
    /// Runs one batched query. `fields` names the top-level service fields
    /// the caller needs; implementations may return more.
    fn fetch(&self, filter: &SearchFilter, fields: &[&str]) -> Result<Vec<RawDocument>>;
}

/// Blocking client for the Materials Project summary endpoint.
pub struct MaterialsProjectClient {
    config: Config,
    agent: Agent,
}

impl MaterialsProjectClient {
    pub fn new(config: Config) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();
        Self {
            config,
            agent: Agent::new_with_config(agent_config),
        }
    }
}

impl Retriever for MaterialsProjectClient {
    #[instrument(level = "debug", skip_all, fields(endpoint = %self.config.endpoint))]
    fn fetch(&self, filter: &SearchFilter, fields: &[&str]) -> Result<Vec<RawDocument>> {
        let api_key = self.config.require_api_key()?;

        let mut request = self
            .agent
            .get(&self.config.endpoint)
            .header(API_KEY_HEADER, api_key)
            .query("_fields", fields.join(","));
        for (name, value) in filter.query_params() {
            request = request.query(name, value);
        }

        let response = request.call().map_err(|err| {
            ToolError::Retrieval(format!(
                "request to {} failed: {err}",
                self.config.endpoint
            ))
        })?;
        let body = response.into_body().read_to_string().map_err(|err| {
            ToolError::Retrieval(format!("failed reading response body: {err}"))
        })?;
        debug!(bytes = body.len(), "received summary response");

        parse_summary_response(&body)
    }
}

/// Splits a summary response (`{"data": [...], "meta": {...}}`) into one raw
/// document per entry.
pub fn parse_summary_response(body: &str) -> Result<Vec<RawDocument>> {
    let json: Value = serde_json::from_str(body)
        .map_err(|err| ToolError::Retrieval(format!("failed parsing response: {err}")))?;
    let data = json
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ToolError::Retrieval("response carries no data array".into()))?;
    Ok(data.iter().map(RawDocument::from_json).collect())
}
