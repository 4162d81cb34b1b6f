//! Broken destination scanner.
//!
//! Issues a `HEAD` request per active redirect destination and reports which
//! ones fail. Results are informational: nothing here changes rules.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::{Method, StatusCode};
use tracing::debug;
use url::Url;

use crate::domain::entities::RedirectRule;
use crate::utils::destination::Destination;

/// Outcome of checking one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// Responded with a status below 400.
    Ok(u16),
    /// Responded with 4xx or 5xx.
    Broken(u16),
    /// Request failed before a status arrived (DNS, TLS, timeout, ...).
    Unreachable(String),
    /// Stored destination is not a usable path or http(s) URL.
    Invalid(String),
    /// Relative destination and no site URL to resolve it against.
    Skipped,
}

impl LinkStatus {
    pub fn is_broken(&self) -> bool {
        matches!(self, Self::Broken(_) | Self::Unreachable(_) | Self::Invalid(_))
    }
}

/// Per-rule check result.
#[derive(Debug, Clone)]
pub struct LinkReport {
    pub rule_id: i64,
    pub source: String,
    pub target: String,
    pub status: LinkStatus,
}

/// Checks redirect destinations over HTTP with bounded concurrency.
pub struct LinkChecker {
    http: reqwest::Client,
    site_url: Option<Url>,
    concurrency: usize,
}

impl LinkChecker {
    /// Builds a checker.
    ///
    /// `site_url` resolves relative destinations; without it they are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed (TLS backend
    /// initialization).
    pub fn new(
        site_url: Option<Url>,
        timeout: Duration,
        concurrency: usize,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("redirect-resolver-linkcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            site_url,
            concurrency: concurrency.max(1),
        })
    }

    /// Checks every active redirect rule; 410/451 rules have no destination
    /// and are left out of the report.
    pub async fn check(&self, rules: &[RedirectRule]) -> Vec<LinkReport> {
        let mut reports: Vec<LinkReport> = stream::iter(
            rules
                .iter()
                .filter(|rule| rule.is_active && rule.kind.is_redirect()),
        )
        .map(|rule| self.check_rule(rule))
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        reports.sort_by_key(|report| report.rule_id);
        reports
    }

    async fn check_rule(&self, rule: &RedirectRule) -> LinkReport {
        let report = |target: String, status: LinkStatus| LinkReport {
            rule_id: rule.id,
            source: rule.source.clone(),
            target,
            status,
        };

        let destination = match Destination::parse(&rule.destination) {
            Ok(destination) => destination,
            Err(e) => {
                return report(rule.destination.clone(), LinkStatus::Invalid(e.to_string()));
            }
        };

        let Some(target) = self.target_url(destination) else {
            return report(rule.destination.clone(), LinkStatus::Skipped);
        };

        let status = self.probe(&target).await;
        debug!("Link check {} -> {}: {:?}", rule.source, target, status);
        report(target.to_string(), status)
    }

    /// Resolves a destination to an absolute URL.
    fn target_url(&self, destination: Destination) -> Option<Url> {
        match destination {
            Destination::Url(url) => Some(url),
            Destination::Path(path) => self.site_url.as_ref()?.join(&path).ok(),
        }
    }

    /// Sends `HEAD`, falling back to `GET` for servers that refuse `HEAD`.
    async fn probe(&self, target: &Url) -> LinkStatus {
        let status = match self.send(Method::HEAD, target).await {
            Ok(status)
                if status == StatusCode::METHOD_NOT_ALLOWED
                    || status == StatusCode::NOT_IMPLEMENTED =>
            {
                self.send(Method::GET, target).await
            }
            other => other,
        };

        match status {
            Ok(status) if status.as_u16() >= 400 => LinkStatus::Broken(status.as_u16()),
            Ok(status) => LinkStatus::Ok(status.as_u16()),
            Err(e) => LinkStatus::Unreachable(e.to_string()),
        }
    }

    async fn send(&self, method: Method, target: &Url) -> Result<StatusCode, reqwest::Error> {
        let response = self.http.request(method, target.clone()).send().await?;
        Ok(response.status())
    }
}
