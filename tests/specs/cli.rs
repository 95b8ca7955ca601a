// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Gateway Authors

//! `gatewayctl` offline subcommands: rule/policy validation and the
//! migrate/replay commands' argument handling. None of these touch a
//! database or a running gateway.

use crate::prelude::{gatewayctl, write_temp_yaml};

#[test]
fn validate_rules_reports_loaded_count() {
    gatewayctl()
        .args(["validate-rules", "config/rules.yaml"])
        .passes()
        .stdout_has("rule(s) loaded");
}

#[test]
fn validate_rules_warns_on_unknown_kind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_temp_yaml(
        &dir,
        "rules.yaml",
        "rules:\n  - name: mystery\n    kind: made_up_kind\n    parameters: {}\n",
    );

    gatewayctl()
        .args(["validate-rules", path.to_str().expect("utf8 path")])
        .passes()
        .stdout_has("warning: unrecognized rule kind for: mystery");
}

#[test]
fn validate_rules_fails_on_malformed_yaml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_temp_yaml(&dir, "rules.yaml", "not: [valid, yaml: structure");

    gatewayctl().args(["validate-rules", path.to_str().expect("utf8 path")]).fails();
}

#[test]
fn validate_rules_fails_on_missing_file() {
    gatewayctl().args(["validate-rules", "/nonexistent/rules.yaml"]).fails();
}

#[test]
fn validate_policy_reports_loaded_count() {
    gatewayctl()
        .args(["validate-policy", "config/policy.yaml"])
        .passes()
        .stdout_has("policy action entr");
}

#[test]
fn validate_policy_fails_on_malformed_yaml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_temp_yaml(&dir, "policy.yaml", "actions: [not, a, map]");

    gatewayctl().args(["validate-policy", path.to_str().expect("utf8 path")]).fails();
}

#[test]
fn migrate_without_database_url_fails() {
    gatewayctl()
        .args(["migrate"])
        .env_remove("DATABASE_URL")
        .fails()
        .stderr_has("DATABASE_URL");
}

#[test]
fn replay_rejects_malformed_header() {
    let dir = tempfile::tempdir().expect("tempdir");
    let payload = write_temp_yaml(&dir, "payload.json", "{\"ping\":true}");

    gatewayctl()
        .args([
            "replay",
            "github",
            payload.to_str().expect("utf8 path"),
            "--header",
            "not-a-header",
        ])
        .fails()
        .stderr_has("malformed header");
}

#[test]
fn replay_rejects_missing_payload_file() {
    gatewayctl()
        .args(["replay", "github", "/nonexistent/payload.json"])
        .fails();
}
