// ==========================================
// 定价下单配置系统 - 费率一致性模拟器
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 4.4 费率一致性模拟
// ==========================================
// 职责: 静态枚举标签下全部可达选择路径，选举 primary，
//       对其余可达 base 候选执行费率策略检查
// 红线: 只读静态分析，不触碰真实选中状态；
//       utility 无条件排除；标签级 service_id 永不作为候选
// ==========================================

use crate::config::model::ConfigModel;
use crate::domain::field::Field;
use crate::domain::service::{ServiceCapability, ServiceMap};
use crate::domain::types::{PricingRole, RatePolicy, RateViolationReason, Severity};
use crate::engine::builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, instrument};

/// 费率不一致诊断
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateDiagnostic {
    /// 违规候选服务
    pub offender: ServiceCapability,
    /// 选举出的 primary 服务 id
    pub primary_id: String,
    /// 揭示该候选的模拟路径起点（锚点 id）
    pub simulation_anchor: String,
    pub severity: Severity,
    pub reason: RateViolationReason,
}

/// base 候选：服务 id + 揭示它的锚点
#[derive(Debug, Clone, PartialEq)]
struct BaseCandidate {
    service_id: String,
    anchor_id: String,
}

/// 深度费率一致性校验
///
/// # 算法
/// 1. 按声明顺序枚举标签下锚点（button 字段 / 携带选项的字段）
/// 2. 逐锚点展开揭示序列，收集 base 角色且携带 service_id 的候选
/// 3. 首个可解析的不同候选当选 primary
/// 4. 其余不同候选逐一执行费率策略，违规产出诊断
///
/// 不足两个不同候选时输出为空。
#[instrument(skip(builder, services), fields(tag = %tag_id))]
pub fn validate_rate_coherence_deep(
    builder: &Builder,
    services: &ServiceMap,
    tag_id: &str,
    rate_policy: &RatePolicy,
) -> Vec<RateDiagnostic> {
    let props = builder.props();
    let model: &ConfigModel = &props;

    let candidates = collect_base_candidates(model, tag_id);
    debug!(count = candidates.len(), "base 候选收集完成");

    let mut diagnostics = Vec::new();
    let mut seen_services: HashSet<String> = HashSet::new();
    let mut primary: Option<ServiceCapability> = None;

    for candidate in candidates {
        if !seen_services.insert(candidate.service_id.clone()) {
            continue;
        }
        let Some(capability) = services.get(&candidate.service_id) else {
            // 服务表解析不到的候选无法比较费率，宽容跳过
            debug!(service = %candidate.service_id, "候选服务不可解析，跳过");
            continue;
        };

        match &primary {
            None => primary = Some(capability.clone()),
            Some(primary_cap) => {
                if rate_policy.violated_by(primary_cap.rate, capability.rate) {
                    diagnostics.push(RateDiagnostic {
                        offender: capability.clone(),
                        primary_id: primary_cap.id.clone(),
                        simulation_anchor: candidate.anchor_id,
                        severity: Severity::Error,
                        reason: rate_policy.violation_reason(primary_cap.rate, capability.rate),
                    });
                }
            }
        }
    }

    diagnostics
}

/// 按锚点声明顺序、揭示遭遇顺序收集 base 候选
///
/// 标签自身的 service_id 不进入候选（允许存在，选举时忽略）。
fn collect_base_candidates(model: &ConfigModel, tag_id: &str) -> Vec<BaseCandidate> {
    let mut candidates = Vec::new();

    for anchor in enumerate_anchors(model, tag_id) {
        if anchor.has_options() {
            // 锚点自带选项：选项即候选，按声明顺序
            for option in &anchor.options {
                if option.pricing_role == PricingRole::Base {
                    if let Some(service_id) = &option.service_id {
                        candidates.push(BaseCandidate {
                            service_id: service_id.clone(),
                            anchor_id: anchor.id.clone(),
                        });
                    }
                }
            }
        } else {
            expand_reveal_sequence(model, &anchor.id, &mut candidates);
        }
    }

    candidates
}

/// 标签下的锚点：绑定字段与标签 includes 里能作为选择起点的字段
///
/// 顺序 = 修订内声明顺序（绑定字段在前，include 字段随后）。
fn enumerate_anchors<'a>(model: &'a ConfigModel, tag_id: &'a str) -> Vec<&'a Field> {
    let mut anchors: Vec<&Field> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    let mut admit = |field: &'a Field, anchors: &mut Vec<&'a Field>, seen: &mut HashSet<&'a str>| {
        if (field.button || field.has_options()) && seen.insert(field.id.as_str()) {
            anchors.push(field);
        }
    };

    for field in model.bound_fields(tag_id) {
        admit(field, &mut anchors, &mut seen);
    }
    if let Some(tag) = model.tag(tag_id) {
        for id in &tag.includes {
            if let Some(field) = model.field(id) {
                admit(field, &mut anchors, &mut seen);
            }
        }
    }
    anchors
}

/// 广度展开 button 锚点的揭示序列（循环防护）
///
/// 队列元素是触发器 id；每个新揭示的字段本身与其选项继续入队，
/// base 角色且携带 service_id 的字段/选项按首次遭遇顺序收集。
fn expand_reveal_sequence(
    model: &ConfigModel,
    anchor_id: &str,
    candidates: &mut Vec<BaseCandidate>,
) {
    let mut queue: VecDeque<String> = VecDeque::new();
    let mut visited_triggers: HashSet<String> = HashSet::new();
    let mut visited_fields: HashSet<String> = HashSet::new();

    queue.push_back(anchor_id.to_string());
    visited_triggers.insert(anchor_id.to_string());

    while let Some(trigger) = queue.pop_front() {
        let Some(revealed) = model.includes_for_buttons.get(&trigger) else {
            continue;
        };

        for field_id in revealed {
            let Some(field) = model.field(field_id) else {
                continue;
            };
            if !visited_fields.insert(field.id.clone()) {
                continue;
            }

            if field.pricing_role == Some(PricingRole::Base) {
                if let Some(service_id) = &field.service_id {
                    candidates.push(BaseCandidate {
                        service_id: service_id.clone(),
                        anchor_id: anchor_id.to_string(),
                    });
                }
            }

            for option in &field.options {
                if option.pricing_role == PricingRole::Base {
                    if let Some(service_id) = &option.service_id {
                        candidates.push(BaseCandidate {
                            service_id: service_id.clone(),
                            anchor_id: anchor_id.to_string(),
                        });
                    }
                }
                // 选项本身也是触发器，其 reveal 继续展开
                if visited_triggers.insert(option.id.clone()) {
                    queue.push_back(option.id.clone());
                }
            }

            if field.button && visited_triggers.insert(field.id.clone()) {
                queue.push_back(field.id.clone());
            }
        }
    }
}
