// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! The closed set of webhook sources the gateway accepts.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A third-party integration the gateway ingests webhooks from, plus the
/// internal `self_` source used for synthetic/system-generated events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Github,
    Jira,
    Linear,
    Pagerduty,
    Slack,
    Datadog,
    Sentry,
    Circleci,
    Jenkins,
    Gitlab,
    Kubernetes,
    Argocd,
    Ecs,
    Heroku,
    Codecov,
    Sonarqube,
    Newrelic,
    Prometheus,
    Cloudwatch,
    Shortcut,
    #[serde(rename = "self")]
    SelfSource,
}

impl Source {
    pub const ALL: &'static [Source] = &[
        Source::Github,
        Source::Jira,
        Source::Linear,
        Source::Pagerduty,
        Source::Slack,
        Source::Datadog,
        Source::Sentry,
        Source::Circleci,
        Source::Jenkins,
        Source::Gitlab,
        Source::Kubernetes,
        Source::Argocd,
        Source::Ecs,
        Source::Heroku,
        Source::Codecov,
        Source::Sonarqube,
        Source::Newrelic,
        Source::Prometheus,
        Source::Cloudwatch,
        Source::Shortcut,
        Source::SelfSource,
    ];

    /// The path segment / env-var fragment used to identify this source
    /// (`INTEGRATIONS_<NAME>_ENABLED`, `events.<source>` broker subject, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Github => "github",
            Source::Jira => "jira",
            Source::Linear => "linear",
            Source::Pagerduty => "pagerduty",
            Source::Slack => "slack",
            Source::Datadog => "datadog",
            Source::Sentry => "sentry",
            Source::Circleci => "circleci",
            Source::Jenkins => "jenkins",
            Source::Gitlab => "gitlab",
            Source::Kubernetes => "kubernetes",
            Source::Argocd => "argocd",
            Source::Ecs => "ecs",
            Source::Heroku => "heroku",
            Source::Codecov => "codecov",
            Source::Sonarqube => "sonarqube",
            Source::Newrelic => "newrelic",
            Source::Prometheus => "prometheus",
            Source::Cloudwatch => "cloudwatch",
            Source::Shortcut => "shortcut",
            Source::SelfSource => "self",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a path segment doesn't name a known source.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown webhook source: {0}")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_source() {
        for source in Source::ALL {
            let parsed: Source = source.as_str().parse().unwrap();
            assert_eq!(parsed, *source);
        }
    }

    #[test]
    fn rejects_unknown_source() {
        assert!("bitbucket".parse::<Source>().is_err());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Source::Pagerduty).unwrap();
        assert_eq!(json, "\"pagerduty\"");
    }
}
