//! Orchestrator REST endpoints derived from a correlation context.
//!
//! ```text
//! {planUrl}/{projectId}/_apis/distributedtask/hubs/{hubName}/plans/{planId}
//!     /timelines/{timelineId}/records                  PATCH, GET
//!     /jobs/{jobId}/variables                          PATCH (JSON-Patch)
//!     /events                                          POST
//!     /timelines/{timelineId}/records/{jobId}/feed     POST
//! ```

use turul_callback_protocol::CorrelationContext;
use url::Url;

use crate::config::ApiVersions;
use crate::error::{ClientError, ClientResult};

/// Resolved endpoint URLs for one task instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorEndpoints {
    records: Url,
    job_variables: Url,
    events: Url,
    feed: Url,
}

impl OrchestratorEndpoints {
    /// Build every endpoint for `ctx`.
    ///
    /// Fails when `planUrl` is not an absolute http(s) URL. Identifiers are
    /// pushed as single path segments, so reserved characters are escaped.
    pub fn new(ctx: &CorrelationContext, versions: &ApiVersions) -> ClientResult<Self> {
        let mut plan_root = Url::parse(&ctx.plan_url)
            .map_err(|e| ClientError::invalid_url(format!("PlanUrl '{}': {}", ctx.plan_url, e)))?;
        if !matches!(plan_root.scheme(), "http" | "https") {
            return Err(ClientError::invalid_url(format!(
                "Unsupported PlanUrl scheme: {}",
                plan_root.scheme()
            )));
        }
        plan_root.set_query(None);
        plan_root.set_fragment(None);

        let plan = [
            ctx.project_id.as_str(),
            "_apis",
            "distributedtask",
            "hubs",
            ctx.hub_name.as_str(),
            "plans",
            ctx.plan_id.as_str(),
        ];
        let timeline = ["timelines", ctx.timeline_id.as_str(), "records"];

        Ok(Self {
            records: build(&plan_root, &[&plan[..], &timeline[..]], &versions.records)?,
            job_variables: build(
                &plan_root,
                &[&plan[..], &["jobs", ctx.job_id.as_str(), "variables"][..]],
                &versions.variables,
            )?,
            events: build(&plan_root, &[&plan[..], &["events"][..]], &versions.events)?,
            feed: build(
                &plan_root,
                &[&plan[..], &timeline[..], &[ctx.job_id.as_str(), "feed"][..]],
                &versions.feed,
            )?,
        })
    }

    /// Timeline records endpoint (PATCH updates, GET listing)
    pub fn records(&self) -> &Url {
        &self.records
    }

    /// Job variables endpoint (JSON-Patch)
    pub fn job_variables(&self) -> &Url {
        &self.job_variables
    }

    /// Plan events endpoint
    pub fn events(&self) -> &Url {
        &self.events
    }

    /// Per-job log feed endpoint
    pub fn feed(&self) -> &Url {
        &self.feed
    }
}

fn build(root: &Url, segments: &[&[&str]], api_version: &str) -> ClientResult<Url> {
    let mut url = root.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::invalid_url(format!("PlanUrl cannot be a base: {}", root)))?
        .pop_if_empty()
        .extend(segments.iter().flat_map(|part| part.iter().copied()));
    url.query_pairs_mut().append_pair("api-version", api_version);
    Ok(url)
}
