//! Pagespeed task - query PageSpeed Insights for the deployed site
//!
//! Uses the free tier by default; set a Google developer API key in the
//! config for higher quotas.

use anyhow::{Context, Result, anyhow};
use log::info;
use serde_json::Value;

use crate::workflow::BuildContext;

const PSI_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Pull the mobile performance score (0-100) out of a PSI response body.
pub fn performance_score(body: &Value) -> Option<f64> {
    body.pointer("/lighthouseResult/categories/performance/score")
        .and_then(Value::as_f64)
        .map(|score| score * 100.0)
}

pub fn run(ctx: &BuildContext) -> Result<()> {
    let mut query = vec![
        ("url", ctx.config.pagespeed_url.clone()),
        ("strategy", String::from("mobile")),
    ];
    if let Some(key) = &ctx.config.pagespeed_key {
        query.push(("key", key.clone()));
    }

    let body: Value = reqwest::blocking::Client::new()
        .get(PSI_ENDPOINT)
        .query(&query)
        .send()
        .context("failed to reach PageSpeed Insights")?
        .error_for_status()
        .context("PageSpeed Insights rejected the request")?
        .json()
        .context("failed to parse PageSpeed Insights response")?;

    let score = performance_score(&body).ok_or_else(|| {
        anyhow!(
            "no performance score in response for {}",
            ctx.config.pagespeed_url
        )
    })?;
    info!(
        "PageSpeed (mobile) score for {}: {:.0}",
        ctx.config.pagespeed_url, score
    );

    Ok(())
}
