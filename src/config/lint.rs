// ==========================================
// 定价下单配置系统 - 引用体检 (Lint)
// ==========================================
// 职责: 扫描 include/exclude/order/reveal 映射中的悬空引用
// 说明: 可见性解析对未知 id 宽容跳过；本模块面向调用方
//       产出 warning 级诊断，一次报告全部问题，永不失败
// ==========================================

use crate::config::model::ConfigModel;
use crate::domain::types::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 引用来源位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceContext {
    /// tag.includes / tag.excludes
    TagInclude { tag_id: String },
    TagExclude { tag_id: String },
    /// 触发器 reveal 映射（键侧）
    RevealTrigger,
    /// 触发器 reveal 映射（值侧字段列表）
    RevealTarget { trigger_id: String },
    /// order_for_tags 的键或条目
    OrderTag,
    OrderEntry { tag_id: String },
}

/// 未知引用诊断
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintDiagnostic {
    pub severity: Severity,
    pub context: ReferenceContext,
    pub referenced_id: String,
}

impl fmt::Display for LintDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] 未知引用 {} ({:?})",
            self.severity, self.referenced_id, self.context
        )
    }
}

/// 扫描修订内全部映射引用，产出 warning 诊断
///
/// # 覆盖范围
/// - 标签 includes/excludes 引用的字段 id
/// - reveal 映射键（必须可解析为触发器）与值（字段 id）
/// - order_for_tags 的标签键与字段条目
pub fn lint_references(model: &ConfigModel) -> Vec<LintDiagnostic> {
    let mut diagnostics = Vec::new();

    let mut warn = |context: ReferenceContext, id: &str| {
        diagnostics.push(LintDiagnostic {
            severity: Severity::Warning,
            context,
            referenced_id: id.to_string(),
        });
    };

    for tag in &model.tags {
        for id in &tag.includes {
            if model.field(id).is_none() {
                warn(
                    ReferenceContext::TagInclude {
                        tag_id: tag.id.clone(),
                    },
                    id,
                );
            }
        }
        for id in &tag.excludes {
            if model.field(id).is_none() {
                warn(
                    ReferenceContext::TagExclude {
                        tag_id: tag.id.clone(),
                    },
                    id,
                );
            }
        }
    }

    for map in [&model.includes_for_buttons, &model.excludes_for_buttons] {
        for (trigger_id, targets) in map {
            if model.resolve_trigger_id(trigger_id).is_none() {
                warn(ReferenceContext::RevealTrigger, trigger_id);
            }
            for target in targets {
                if model.field(target).is_none() {
                    warn(
                        ReferenceContext::RevealTarget {
                            trigger_id: trigger_id.clone(),
                        },
                        target,
                    );
                }
            }
        }
    }

    for (tag_id, order) in &model.order_for_tags {
        if model.tag(tag_id).is_none() {
            warn(ReferenceContext::OrderTag, tag_id);
        }
        for field_id in order {
            if model.field(field_id).is_none() {
                warn(
                    ReferenceContext::OrderEntry {
                        tag_id: tag_id.clone(),
                    },
                    field_id,
                );
            }
        }
    }

    diagnostics
}
