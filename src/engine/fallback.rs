// ==========================================
// 定价下单配置系统 - 回退候选过滤器
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 4.6 回退候选过滤
// ==========================================
// 职责: 对可见分组的替换候选服务逐一打分：
//       约束匹配 + 费率策略 + 结构规则
// 红线: 已占用服务直接从输出剔除；每个结论必须输出 reason
// ==========================================

use crate::domain::policy::{FallbackMode, FallbackSettings};
use crate::domain::service::{ServiceCapability, ServiceMap};
use crate::domain::types::{CandidateReason, PolicyScope};
use crate::engine::policy::{evaluate_policies, CompiledPolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// 过滤上下文
pub struct FallbackContext<'a> {
    pub tag_id: &'a str,
    /// 同一订单/会话内已占用的服务 id（顺序即占用顺序）
    pub used_service_ids: &'a [String],
    /// 能力标志 → 要求值，逐项精确匹配
    pub effective_constraints: &'a HashMap<String, Value>,
    pub policies: &'a [CompiledPolicy],
    pub fallback: &'a FallbackSettings,
    pub services: &'a ServiceMap,
}

/// 单个候选的检查结论
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCheck {
    pub id: String,
    pub ok: bool,
    pub fits_constraints: bool,
    pub passes_rate: bool,
    pub passes_policies: bool,
    /// 保序去重的失败原因
    pub reasons: Vec<CandidateReason>,
    /// 未通过的规则 id
    pub policy_errors: Vec<String>,
}

/// 过滤可见分组的回退候选
///
/// # 规则
/// - 已占用候选整条剔除，不出现在输出里
/// - fits_constraints: 全部约束键与候选同名标志精确匹配
/// - passes_rate: 无已占用服务时默认通过；否则以第一个可解析的
///   已占用服务为 primary 执行费率策略
/// - passes_policies: visible_group 作用域对 (已占用 ∪ 候选) 求值
/// - ok: Strict 三项全门禁；Dev 模式规则失败仅记录不门禁；
///   require_constraint_fit=false 时约束失败记录原因但不门禁
pub fn filter_services_for_visible_group(
    candidate_ids: &[String],
    ctx: &FallbackContext<'_>,
) -> Vec<CandidateCheck> {
    let primary = ctx
        .used_service_ids
        .iter()
        .find_map(|id| ctx.services.get(id));

    let used_resolved: Vec<ServiceCapability> = ctx
        .used_service_ids
        .iter()
        .filter_map(|id| ctx.services.get(id).cloned())
        .collect();

    let mut checks = Vec::new();
    for candidate_id in candidate_ids {
        if ctx.used_service_ids.iter().any(|u| u == candidate_id) {
            debug!(tag = ctx.tag_id, candidate = %candidate_id, "候选已占用，剔除");
            continue;
        }

        let candidate = ctx
            .services
            .get(candidate_id)
            .cloned()
            .unwrap_or_else(|| ServiceCapability::placeholder(candidate_id.clone()));

        let mut reasons: Vec<CandidateReason> = Vec::new();

        // 1. 约束匹配
        let fits_constraints = ctx
            .effective_constraints
            .iter()
            .all(|(key, required)| candidate.flags.get(key) == Some(required));
        if !fits_constraints {
            reasons.push(CandidateReason::ConstraintMismatch);
        }

        // 2. 费率策略（无 primary 默认通过）
        let passes_rate = match primary {
            None => true,
            Some(primary) => !ctx
                .fallback
                .rate_policy
                .violated_by(primary.rate, candidate.rate),
        };
        if !passes_rate {
            reasons.push(CandidateReason::RatePolicy);
        }

        // 3. 结构规则：已占用 ∪ 候选
        let mut evaluated = used_resolved.clone();
        evaluated.push(candidate.clone());
        let results = evaluate_policies(ctx.policies, PolicyScope::VisibleGroup, &evaluated);
        let policy_errors: Vec<String> = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.rule_id.clone())
            .collect();
        let passes_policies = policy_errors.is_empty();
        if !passes_policies {
            reasons.push(CandidateReason::PolicyError);
        }

        let constraint_gate = fits_constraints || !ctx.fallback.require_constraint_fit;
        let policy_gate = passes_policies || ctx.fallback.mode == FallbackMode::Dev;
        let ok = constraint_gate && passes_rate && policy_gate;

        checks.push(CandidateCheck {
            id: candidate_id.clone(),
            ok,
            fits_constraints,
            passes_rate,
            passes_policies,
            reasons,
            policy_errors,
        });
    }

    checks
}

/// 按选择策略从检查结论中选出回退服务
///
/// # 返回
/// - None: 没有 ok 的候选
pub fn select_fallback(
    checks: &[CandidateCheck],
    services: &ServiceMap,
    settings: &FallbackSettings,
) -> Option<String> {
    use crate::domain::policy::SelectionStrategy;

    let eligible = checks.iter().filter(|c| c.ok);
    match settings.selection_strategy {
        SelectionStrategy::FirstEligible => eligible.map(|c| c.id.clone()).next(),
        SelectionStrategy::CheapestEligible => eligible
            .min_by(|a, b| {
                let rate = |c: &CandidateCheck| {
                    services.get(&c.id).map(|s| s.rate).unwrap_or(f64::MAX)
                };
                rate(a).total_cmp(&rate(b))
            })
            .map(|c| c.id.clone()),
    }
}
