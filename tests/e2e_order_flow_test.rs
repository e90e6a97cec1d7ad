// ==========================================
// 端到端订单配置流程测试
// ==========================================
// 场景: 套餐字段 + utility 附言 + 两档 base 价位的下单表单，
//       贯通 载入 → 可见性 → 组合 → 模拟 → 回退过滤
// ==========================================

mod helpers;

use helpers::mock_config::{plan_services, service_map};
use pricing_config_engine::domain::map_resolver;
use pricing_config_engine::engine::{
    compile_policies, filter_services_for_visible_group, resolve_visible_group,
    validate_rate_coherence_deep, Command, FallbackContext, GroupResolution, Selection,
};
use pricing_config_engine::{
    Builder, BuilderOptions, ConfigModel, FallbackSettings, Field, FieldOption, PricingRole,
    RatePolicy, RawRule, Tag,
};
use std::collections::HashMap;

/// 下单表单配置: 根标签下一个套餐字段与一个加速按钮
fn storefront_model() -> ConfigModel {
    let mut model = ConfigModel {
        tags: vec![Tag::new("t:root")],
        fields: vec![
            Field::new("f:plan").bound_to("t:root").with_options(vec![
                FieldOption::new("o:util", PricingRole::Utility).with_service("svc-300"),
                FieldOption::new("o:base2", PricingRole::Base).with_service("svc-200"),
                FieldOption::new("o:base3", PricingRole::Base).with_service("svc-400"),
            ]),
            Field::new("f:rush").bound_to("t:root").as_button(),
            Field::new("f:speed"),
        ],
        ..Default::default()
    };
    model
        .includes_for_buttons
        .insert("f:rush".into(), vec!["f:speed".into()]);
    model
}

#[test]
fn test_full_order_flow() {
    let mut builder = Builder::new(BuilderOptions {
        root_tag_id: Some("t:root".into()),
        ..Default::default()
    });
    builder.load(storefront_model()).expect("load failed");
    let services = plan_services();

    // 1. 可见性: 初始池 + 按钮揭示
    let visible = builder.visible_fields("t:root", &[]);
    assert_eq!(visible, vec!["f:plan".to_string(), "f:rush".to_string()]);
    let visible = builder.visible_fields("t:root", &["f:rush".to_string()]);
    assert_eq!(
        visible,
        vec!["f:plan".to_string(), "f:rush".to_string(), "f:speed".to_string()]
    );

    // 2. 组合: 选择顺序 [o:util, o:base2, o:base3] → [200, 300, 400]
    let selection = Selection::from_ids(["o:util", "o:base2", "o:base3"]);
    let resolution = resolve_visible_group(&builder, &selection, map_resolver(&services))
        .expect("group expected");
    let GroupResolution::Single(group) = resolution else {
        panic!("expected single group");
    };
    assert_eq!(group.tag_id, "t:root");
    let rates: Vec<f64> = group.services.iter().map(|s| s.rate).collect();
    assert_eq!(rates, vec![200.0, 300.0, 400.0]);

    // 3. 模拟: svc-200 当选 primary，svc-400 超出 10% 上浮被标记
    let diagnostics = validate_rate_coherence_deep(
        &builder,
        &services,
        "t:root",
        &RatePolicy::WithinPct { pct: 10.0 },
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].offender.id, "svc-400");
    assert_eq!(diagnostics[0].primary_id, "svc-200");
    assert_eq!(diagnostics[0].simulation_anchor, "f:plan");

    // 4. 回退过滤: svc-200 已占用 → 剔除；svc-400 费率违规；svc-300 通过 lte 检查失败
    let raw: RawRule = serde_json::from_value(serde_json::json!({
        "id": "rate-equal",
        "op": "all_equal",
        "projection": "service.rate",
        "severity": "warning"
    }))
    .unwrap();
    let policies = compile_policies(&[raw]);
    let used = vec!["svc-200".to_string()];
    let constraints = HashMap::new();
    let settings = FallbackSettings {
        rate_policy: RatePolicy::LtePrimary,
        ..Default::default()
    };
    let ctx = FallbackContext {
        tag_id: "t:root",
        used_service_ids: &used,
        effective_constraints: &constraints,
        policies: &policies,
        fallback: &settings,
        services: &services,
    };
    let candidates = vec![
        "svc-200".to_string(),
        "svc-300".to_string(),
        "svc-400".to_string(),
    ];
    let checks = filter_services_for_visible_group(&candidates, &ctx);

    assert_eq!(checks.len(), 2, "svc-200 已占用必须剔除");
    let c300 = checks.iter().find(|c| c.id == "svc-300").unwrap();
    assert!(!c300.passes_rate, "300 > primary 200");
    let c400 = checks.iter().find(|c| c.id == "svc-400").unwrap();
    assert!(!c400.passes_rate);
    // all_equal 规则对 (200, 候选) 求值必然失败
    assert!(checks.iter().all(|c| !c.passes_policies && !c.ok));
}

#[test]
fn test_edit_session_with_undo_redo() {
    let mut builder = Builder::new(BuilderOptions {
        root_tag_id: Some("t:root".into()),
        ..Default::default()
    });
    builder.load(storefront_model()).expect("load failed");
    let services = service_map(&[("svc-200", 200.0), ("svc-150", 150.0)]);

    // 运营加一档更便宜的 base 价位
    builder
        .apply(Command::UpsertField {
            field: Field::new("f:promo").bound_to("t:root").with_options(vec![
                FieldOption::new("o:promo", PricingRole::Base).with_service("svc-150"),
            ]),
        })
        .expect("apply failed");

    // lte_primary 下，primary 仍是声明在前的 svc-200，svc-150 更便宜不违规
    let diagnostics =
        validate_rate_coherence_deep(&builder, &services, "t:root", &RatePolicy::LtePrimary);
    assert!(diagnostics.is_empty());

    // 改成“至少低 30%”: 150 > 200×0.7=140 → 违规，归因到 f:promo
    let diagnostics = validate_rate_coherence_deep(
        &builder,
        &services,
        "t:root",
        &RatePolicy::AtLeastPctLower { pct: 30.0 },
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].offender.id, "svc-150");
    assert_eq!(diagnostics[0].simulation_anchor, "f:promo");

    // 撤销后新档位消失，模拟结果回到单候选
    assert!(builder.undo());
    let diagnostics = validate_rate_coherence_deep(
        &builder,
        &services,
        "t:root",
        &RatePolicy::AtLeastPctLower { pct: 30.0 },
    );
    assert!(diagnostics.is_empty());

    // 重做恢复
    assert!(builder.redo());
    assert!(builder.props().field("f:promo").is_some());
}
