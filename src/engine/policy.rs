// ==========================================
// 定价下单配置系统 - 结构规则引擎
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 4.5 规则引擎
// ==========================================
// 职责: 宽松规则描述 → 封闭算子求值器；按作用域对投影后的
//       服务列表求值
// 红线: 畸形投影/未知算子失败闭合，绝不静默跳过；
//       severity 只标注诊断，不改变通过/失败判定
// ==========================================

use crate::domain::policy::{RawRule, RoleFilter};
use crate::domain::service::ServiceCapability;
use crate::domain::types::{PolicyScope, Severity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

// ==========================================
// 编译产物
// ==========================================

/// 封闭算子（编译后穷尽匹配）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum PolicyOp {
    AllEqual,
    Unique,
    NoMix,
    AllTrue,
    AnyTrue,
    MaxCount { bound: usize },
    MinCount { bound: usize },
    /// 未知算子或缺失阈值：求值恒失败（失败闭合）
    Unsupported,
}

/// 投影路径（编译期校验格式，求值期解析）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum Projection {
    /// 去掉 "service." 前缀后的点路径
    Valid(String),
    /// 缺失或不以 "service." 开头：求值恒失败
    Malformed,
}

/// 编译后的结构规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledPolicy {
    pub id: String,
    pub scope: PolicyScope,
    pub op: PolicyOp,
    pub projection: Projection,
    pub role_filter: RoleFilter,
    pub severity: Severity,
}

/// 单条规则求值结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyResult {
    pub rule_id: String,
    pub passed: bool,
    pub severity: Severity,
    /// 失败时的显式原因
    pub detail: Option<String>,
}

// ==========================================
// 编译
// ==========================================

/// 把宽松规则列表编译为求值器
///
/// # 兜底规则
/// - 缺失 id → "rule-{序号}"
/// - 缺失/未知 scope → visible_group；severity → error；filter.role → both
/// - 未知 op、缺失 count 阈值、畸形投影 → 失败闭合的求值器（不拒绝）
pub fn compile_policies(rules: &[RawRule]) -> Vec<CompiledPolicy> {
    rules
        .iter()
        .enumerate()
        .map(|(index, rule)| compile_one(index, rule))
        .collect()
}

fn compile_one(index: usize, rule: &RawRule) -> CompiledPolicy {
    let id = rule
        .id
        .clone()
        .unwrap_or_else(|| format!("rule-{}", index));

    let scope = match rule.scope.as_deref() {
        Some("global") => PolicyScope::Global,
        _ => PolicyScope::VisibleGroup,
    };

    let severity = match rule.severity.as_deref() {
        Some("warning") => Severity::Warning,
        _ => Severity::Error,
    };

    let role_filter = match rule.filter.as_ref().and_then(|f| f.role.as_deref()) {
        Some("base") => RoleFilter::Base,
        Some("utility") => RoleFilter::Utility,
        _ => RoleFilter::Both,
    };

    let bound = rule.bound.filter(|b| *b >= 0.0).map(|b| b as usize);
    let op = match rule.op.as_deref() {
        Some("all_equal") => PolicyOp::AllEqual,
        Some("unique") => PolicyOp::Unique,
        Some("no_mix") => PolicyOp::NoMix,
        Some("all_true") => PolicyOp::AllTrue,
        Some("any_true") => PolicyOp::AnyTrue,
        Some("max_count") => match bound {
            Some(bound) => PolicyOp::MaxCount { bound },
            None => PolicyOp::Unsupported,
        },
        Some("min_count") => match bound {
            Some(bound) => PolicyOp::MinCount { bound },
            None => PolicyOp::Unsupported,
        },
        _ => PolicyOp::Unsupported,
    };

    let projection = match rule.projection.as_deref() {
        Some(path) => match path.strip_prefix("service.") {
            Some(rest) if !rest.is_empty() => Projection::Valid(rest.to_string()),
            _ => Projection::Malformed,
        },
        None => Projection::Malformed,
    };

    CompiledPolicy {
        id,
        scope,
        op,
        projection,
        role_filter,
        severity,
    }
}

// ==========================================
// 求值
// ==========================================

/// 按作用域求值全部规则
///
/// # 参数
/// - scope: 本次求值的作用域；作用域不匹配的规则跳过
/// - services: 作用域内的服务列表（global = 全局涉及服务，
///   visible_group = 当前分组组合服务）
pub fn evaluate_policies(
    compiled: &[CompiledPolicy],
    scope: PolicyScope,
    services: &[ServiceCapability],
) -> Vec<PolicyResult> {
    compiled
        .iter()
        .filter(|rule| rule.scope == scope)
        .map(|rule| evaluate_one(rule, services))
        .collect()
}

fn evaluate_one(rule: &CompiledPolicy, services: &[ServiceCapability]) -> PolicyResult {
    let fail = |detail: String| PolicyResult {
        rule_id: rule.id.clone(),
        passed: false,
        severity: rule.severity,
        detail: Some(detail),
    };
    let pass = || PolicyResult {
        rule_id: rule.id.clone(),
        passed: true,
        severity: rule.severity,
        detail: None,
    };

    let path = match &rule.projection {
        Projection::Valid(path) => path,
        Projection::Malformed => {
            return fail("投影畸形：必须以 service. 开头".to_string());
        }
    };
    let subjects: Vec<&ServiceCapability> = services
        .iter()
        .filter(|s| role_matches(rule.role_filter, s))
        .collect();

    // 投影；不可解析路径失败闭合（no_mix 的 null 值除外，见下）
    let mut values: Vec<Value> = Vec::with_capacity(subjects.len());
    for subject in &subjects {
        match subject.project(path) {
            Some(value) => values.push(value),
            None if rule.op == PolicyOp::NoMix => values.push(Value::Null),
            None => {
                return fail(format!("投影不可解析: service.{} (id={})", path, subject.id));
            }
        }
    }

    match &rule.op {
        PolicyOp::AllEqual => {
            let all_equal = values.windows(2).all(|w| w[0] == w[1]);
            if all_equal {
                pass()
            } else {
                fail(format!("投影值不一致: service.{}", path))
            }
        }
        PolicyOp::Unique => {
            let mut seen: HashSet<String> = HashSet::new();
            for value in &values {
                if !seen.insert(value.to_string()) {
                    return fail(format!("投影值重复: {}", value));
                }
            }
            pass()
        }
        PolicyOp::NoMix => {
            let distinct: HashSet<String> = values
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| v.to_string())
                .collect();
            if distinct.len() > 1 {
                fail(format!("出现 {} 个不同的非空投影值", distinct.len()))
            } else {
                pass()
            }
        }
        PolicyOp::AllTrue => {
            if values.iter().all(is_truthy) {
                pass()
            } else {
                fail(format!("存在假值投影: service.{}", path))
            }
        }
        PolicyOp::AnyTrue => {
            if values.iter().any(is_truthy) {
                pass()
            } else {
                fail(format!("无真值投影: service.{}", path))
            }
        }
        PolicyOp::MaxCount { bound } => {
            let count = values.iter().filter(|v| is_truthy(v)).count();
            if count > *bound {
                fail(format!("匹配数 {} 超过上限 {}", count, bound))
            } else {
                pass()
            }
        }
        PolicyOp::MinCount { bound } => {
            let count = values.iter().filter(|v| is_truthy(v)).count();
            if count < *bound {
                fail(format!("匹配数 {} 低于下限 {}", count, bound))
            } else {
                pass()
            }
        }
        PolicyOp::Unsupported => fail("未知算子或缺失阈值".to_string()),
    }
}

/// 角色前置过滤：匹配能力记录上的 role 标志
///
/// Both 不过滤；Base/Utility 要求 role 标志字符串精确匹配。
fn role_matches(filter: RoleFilter, service: &ServiceCapability) -> bool {
    match filter {
        RoleFilter::Both => true,
        RoleFilter::Base => service.flags.get("role").and_then(Value::as_str) == Some("base"),
        RoleFilter::Utility => {
            service.flags.get("role").and_then(Value::as_str) == Some("utility")
        }
    }
}

/// JS 语义的真值判定（规则输入源自宽松 JSON）
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
