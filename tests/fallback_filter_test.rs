// ==========================================
// 回退候选过滤器单元测试
// ==========================================

mod helpers;

use helpers::mock_config::{service_map, service_with_flags};
use pricing_config_engine::engine::{
    compile_policies, filter_services_for_visible_group, select_fallback, FallbackContext,
};
use pricing_config_engine::{
    CandidateReason, CompiledPolicy, FallbackMode, FallbackSettings, RatePolicy, RawRule,
    SelectionStrategy, ServiceMap,
};
use serde_json::{json, Value};
use std::collections::HashMap;

fn no_mix_platform_rule() -> Vec<CompiledPolicy> {
    let raw: RawRule = serde_json::from_value(json!({
        "id": "platform-no-mix",
        "op": "no_mix",
        "projection": "service.platform_id"
    }))
    .unwrap();
    compile_policies(&[raw])
}

fn ctx<'a>(
    used: &'a [String],
    constraints: &'a HashMap<String, Value>,
    policies: &'a [CompiledPolicy],
    fallback: &'a FallbackSettings,
    services: &'a ServiceMap,
) -> FallbackContext<'a> {
    FallbackContext {
        tag_id: "t:root",
        used_service_ids: used,
        effective_constraints: constraints,
        policies,
        fallback,
        services,
    }
}

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_used_candidate_dropped_from_output() {
    let services = service_map(&[("svc-a", 10.0), ("svc-b", 20.0)]);
    let used = strings(&["svc-a"]);
    let constraints = HashMap::new();
    let settings = FallbackSettings::default();

    let checks = filter_services_for_visible_group(
        &strings(&["svc-a", "svc-b"]),
        &ctx(&used, &constraints, &[], &settings, &services),
    );

    // 已占用的 svc-a 整条剔除，无论其它检查结果如何
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].id, "svc-b");
}

#[test]
fn test_no_primary_defaults_passes_rate() {
    let services = service_map(&[("svc-pricey", 9999.0)]);
    let used: Vec<String> = Vec::new();
    let constraints = HashMap::new();
    let settings = FallbackSettings {
        rate_policy: RatePolicy::LtePrimary,
        ..Default::default()
    };

    let checks = filter_services_for_visible_group(
        &strings(&["svc-pricey"]),
        &ctx(&used, &constraints, &[], &settings, &services),
    );
    assert!(checks[0].passes_rate);
    assert!(checks[0].ok);
}

#[test]
fn test_rate_policy_against_first_resolvable_used_primary() {
    let services = service_map(&[("svc-100", 100.0), ("svc-120", 120.0), ("svc-90", 90.0)]);
    // 第一个 id 解析不到，第二个 svc-100 成为 primary
    let used = strings(&["svc-ghost", "svc-100"]);
    let constraints = HashMap::new();
    let settings = FallbackSettings {
        rate_policy: RatePolicy::LtePrimary,
        ..Default::default()
    };

    let checks = filter_services_for_visible_group(
        &strings(&["svc-120", "svc-90"]),
        &ctx(&used, &constraints, &[], &settings, &services),
    );

    let dear = checks.iter().find(|c| c.id == "svc-120").unwrap();
    assert!(!dear.passes_rate);
    assert!(dear.reasons.contains(&CandidateReason::RatePolicy));
    assert!(!dear.ok);

    let cheap = checks.iter().find(|c| c.id == "svc-90").unwrap();
    assert!(cheap.passes_rate);
    assert!(cheap.ok);
}

#[test]
fn test_constraint_mismatch() {
    let mut services = ServiceMap::new();
    services.insert(
        "svc-drip".into(),
        service_with_flags("svc-drip", 10.0, &[("dripfeed", json!(true))]),
    );
    services.insert(
        "svc-plain".into(),
        service_with_flags("svc-plain", 10.0, &[("dripfeed", json!(false))]),
    );

    let used: Vec<String> = Vec::new();
    let mut constraints = HashMap::new();
    constraints.insert("dripfeed".to_string(), json!(true));
    let settings = FallbackSettings::default();

    let checks = filter_services_for_visible_group(
        &strings(&["svc-drip", "svc-plain"]),
        &ctx(&used, &constraints, &[], &settings, &services),
    );

    let drip = checks.iter().find(|c| c.id == "svc-drip").unwrap();
    assert!(drip.fits_constraints);
    assert!(drip.ok);

    let plain = checks.iter().find(|c| c.id == "svc-plain").unwrap();
    assert!(!plain.fits_constraints);
    assert_eq!(plain.reasons, vec![CandidateReason::ConstraintMismatch]);
    assert!(!plain.ok);
}

#[test]
fn test_constraint_fit_not_required_records_reason_without_gating() {
    let services = service_map(&[("svc-plain", 10.0)]);
    let used: Vec<String> = Vec::new();
    let mut constraints = HashMap::new();
    constraints.insert("dripfeed".to_string(), json!(true));
    let settings = FallbackSettings {
        require_constraint_fit: false,
        ..Default::default()
    };

    let checks = filter_services_for_visible_group(
        &strings(&["svc-plain"]),
        &ctx(&used, &constraints, &[], &settings, &services),
    );

    assert!(!checks[0].fits_constraints);
    assert!(checks[0].reasons.contains(&CandidateReason::ConstraintMismatch));
    // 不作为门禁
    assert!(checks[0].ok);
}

#[test]
fn test_policy_failure_collects_rule_ids() {
    let mut services = ServiceMap::new();
    services.insert(
        "svc-p1".into(),
        service_with_flags("svc-p1", 10.0, &[("platform_id", json!("p1"))]),
    );
    services.insert(
        "svc-p2".into(),
        service_with_flags("svc-p2", 10.0, &[("platform_id", json!("p2"))]),
    );

    let used = strings(&["svc-p1"]);
    let constraints = HashMap::new();
    let policies = no_mix_platform_rule();
    let settings = FallbackSettings::default();

    let checks = filter_services_for_visible_group(
        &strings(&["svc-p2"]),
        &ctx(&used, &constraints, &policies, &settings, &services),
    );

    // no_mix: 候选平台与已占用平台不一致 → 规则失败
    assert!(!checks[0].passes_policies);
    assert_eq!(checks[0].policy_errors, vec!["platform-no-mix".to_string()]);
    assert!(checks[0].reasons.contains(&CandidateReason::PolicyError));
    assert!(!checks[0].ok);
}

#[test]
fn test_dev_mode_makes_policy_failures_advisory() {
    let mut services = ServiceMap::new();
    services.insert(
        "svc-p1".into(),
        service_with_flags("svc-p1", 10.0, &[("platform_id", json!("p1"))]),
    );
    services.insert(
        "svc-p2".into(),
        service_with_flags("svc-p2", 10.0, &[("platform_id", json!("p2"))]),
    );

    let used = strings(&["svc-p1"]);
    let constraints = HashMap::new();
    let policies = no_mix_platform_rule();
    let settings = FallbackSettings {
        mode: FallbackMode::Dev,
        ..Default::default()
    };

    let checks = filter_services_for_visible_group(
        &strings(&["svc-p2"]),
        &ctx(&used, &constraints, &policies, &settings, &services),
    );

    // 失败仍被记录，但 Dev 模式不门禁
    assert!(!checks[0].passes_policies);
    assert!(!checks[0].policy_errors.is_empty());
    assert!(checks[0].ok);
}

#[test]
fn test_reasons_ordered_and_deduplicated() {
    let mut services = ServiceMap::new();
    services.insert(
        "svc-100".into(),
        service_with_flags("svc-100", 100.0, &[("platform_id", json!("p1"))]),
    );
    services.insert(
        "svc-bad".into(),
        service_with_flags("svc-bad", 150.0, &[("platform_id", json!("p2"))]),
    );

    let used = strings(&["svc-100"]);
    let mut constraints = HashMap::new();
    constraints.insert("dripfeed".to_string(), json!(true));
    let policies = no_mix_platform_rule();
    let settings = FallbackSettings {
        rate_policy: RatePolicy::LtePrimary,
        ..Default::default()
    };

    let checks = filter_services_for_visible_group(
        &strings(&["svc-bad"]),
        &ctx(&used, &constraints, &policies, &settings, &services),
    );

    assert_eq!(
        checks[0].reasons,
        vec![
            CandidateReason::ConstraintMismatch,
            CandidateReason::RatePolicy,
            CandidateReason::PolicyError,
        ]
    );
    assert!(!checks[0].ok);
}

#[test]
fn test_select_fallback_strategies() {
    let services = service_map(&[("svc-a", 30.0), ("svc-b", 10.0), ("svc-c", 20.0)]);
    let used: Vec<String> = Vec::new();
    let constraints = HashMap::new();
    let settings = FallbackSettings::default();

    let checks = filter_services_for_visible_group(
        &strings(&["svc-a", "svc-b", "svc-c"]),
        &ctx(&used, &constraints, &[], &settings, &services),
    );

    let first = FallbackSettings {
        selection_strategy: SelectionStrategy::FirstEligible,
        ..Default::default()
    };
    assert_eq!(
        select_fallback(&checks, &services, &first).as_deref(),
        Some("svc-a")
    );

    let cheapest = FallbackSettings {
        selection_strategy: SelectionStrategy::CheapestEligible,
        ..Default::default()
    };
    assert_eq!(
        select_fallback(&checks, &services, &cheapest).as_deref(),
        Some("svc-b")
    );

    assert!(select_fallback(&[], &services, &first).is_none());
}
