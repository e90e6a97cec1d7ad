// ==========================================
// 测试夹具 - 配置与服务表构造
// ==========================================
// 职责: 提供各引擎测试共用的小型配置图与服务表
// ==========================================

use pricing_config_engine::{
    ConfigModel, Field, FieldOption, PricingRole, ServiceCapability, ServiceMap, Tag,
};
use serde_json::Value;

/// 构造服务能力记录
pub fn service(id: &str, rate: f64) -> ServiceCapability {
    ServiceCapability::new(id, rate)
}

/// 构造带标志的服务能力记录
pub fn service_with_flags(id: &str, rate: f64, flags: &[(&str, Value)]) -> ServiceCapability {
    let mut s = ServiceCapability::new(id, rate);
    for (key, value) in flags {
        s = s.with_flag(*key, value.clone());
    }
    s
}

/// 由 (id, rate) 列表构造服务表
pub fn service_map(entries: &[(&str, f64)]) -> ServiceMap {
    entries
        .iter()
        .map(|(id, rate)| (id.to_string(), service(id, *rate)))
        .collect()
}

/// 最小门店配置：根标签 + 套餐字段（一个 utility、两个 base 选项）
///
/// 选项服务: o:util→svc-300, o:base2→svc-200, o:base3→svc-400
pub fn plan_model() -> ConfigModel {
    ConfigModel {
        tags: vec![Tag::new("t:root")],
        fields: vec![Field::new("f:plan").bound_to("t:root").with_options(vec![
            FieldOption::new("o:util", PricingRole::Utility).with_service("svc-300"),
            FieldOption::new("o:base2", PricingRole::Base).with_service("svc-200"),
            FieldOption::new("o:base3", PricingRole::Base).with_service("svc-400"),
        ])],
        ..Default::default()
    }
}

/// plan_model 对应的服务表
pub fn plan_services() -> ServiceMap {
    service_map(&[("svc-200", 200.0), ("svc-300", 300.0), ("svc-400", 400.0)])
}
