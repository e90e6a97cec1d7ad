// ==========================================
// 定价下单配置系统 - 领域类型定义
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 3. 数据模型
// 红线: 所有校验结果必须输出 reason
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 计价角色 (Pricing Role)
// ==========================================
// 红线: utility 角色永远不携带 service_id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingRole {
    /// 主计价项，可被选为 primary
    Base,
    /// 辅助项，永远不计价、不参与 primary 选举
    Utility,
    /// 附加项，随选随加
    Addon,
}

impl PricingRole {
    pub fn as_str(&self) -> &str {
        match self {
            PricingRole::Base => "base",
            PricingRole::Utility => "utility",
            PricingRole::Addon => "addon",
        }
    }
}

impl fmt::Display for PricingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 诊断严重级别 (Severity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

// ==========================================
// 规则作用域 (Policy Scope)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScope {
    /// 全局：系统内全部已涉及服务
    Global,
    /// 当前可见分组的已组合服务
    VisibleGroup,
}

impl Default for PolicyScope {
    fn default() -> Self {
        PolicyScope::VisibleGroup
    }
}

// ==========================================
// 费率策略 (Rate Policy)
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 4.4 费率一致性
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatePolicy {
    /// 候选费率不得高于 primary
    LtePrimary,
    /// 候选费率超出 primary 的百分比不得大于 pct（只看超出，更低不违规）
    WithinPct { pct: f64 },
    /// 候选费率必须比 primary 至少低 pct%
    AtLeastPctLower { pct: f64 },
}

impl RatePolicy {
    /// 判定候选费率是否违反策略
    ///
    /// # 参数
    /// - primary_rate: primary 服务费率（比较基准）
    /// - candidate_rate: 候选服务费率
    ///
    /// # 返回
    /// - true: 违反策略
    pub fn violated_by(&self, primary_rate: f64, candidate_rate: f64) -> bool {
        match self {
            RatePolicy::LtePrimary => candidate_rate > primary_rate,
            RatePolicy::WithinPct { pct } => {
                if primary_rate == 0.0 {
                    return candidate_rate > 0.0;
                }
                (candidate_rate - primary_rate) / primary_rate * 100.0 > *pct
            }
            RatePolicy::AtLeastPctLower { pct } => {
                candidate_rate > primary_rate * (1.0 - pct / 100.0)
            }
        }
    }

    /// 构造违规原因（调用方已确认 violated_by 为 true）
    pub fn violation_reason(&self, primary_rate: f64, candidate_rate: f64) -> RateViolationReason {
        match self {
            RatePolicy::LtePrimary => RateViolationReason::AbovePrimary {
                primary_rate,
                candidate_rate,
            },
            RatePolicy::WithinPct { pct } => RateViolationReason::OveragePctExceeded {
                pct_limit: *pct,
                overage_pct: if primary_rate == 0.0 {
                    f64::INFINITY
                } else {
                    (candidate_rate - primary_rate) / primary_rate * 100.0
                },
            },
            RatePolicy::AtLeastPctLower { pct } => RateViolationReason::NotSufficientlyLower {
                pct_required: *pct,
                max_allowed_rate: primary_rate * (1.0 - pct / 100.0),
            },
        }
    }
}

impl Default for RatePolicy {
    fn default() -> Self {
        RatePolicy::LtePrimary
    }
}

// ==========================================
// 费率违规原因 (Rate Violation Reason)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateViolationReason {
    /// 高于 primary 费率
    AbovePrimary {
        primary_rate: f64,
        candidate_rate: f64,
    },
    /// 超出允许的上浮百分比
    OveragePctExceeded { pct_limit: f64, overage_pct: f64 },
    /// 未达到要求的下浮幅度
    NotSufficientlyLower {
        pct_required: f64,
        max_allowed_rate: f64,
    },
}

impl fmt::Display for RateViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateViolationReason::AbovePrimary {
                primary_rate,
                candidate_rate,
            } => write!(
                f,
                "候选费率 {} 高于 primary 费率 {}",
                candidate_rate, primary_rate
            ),
            RateViolationReason::OveragePctExceeded {
                pct_limit,
                overage_pct,
            } => write!(f, "上浮 {:.2}% 超出允许的 {:.2}%", overage_pct, pct_limit),
            RateViolationReason::NotSufficientlyLower {
                pct_required,
                max_allowed_rate,
            } => write!(
                f,
                "候选费率需至少低 {:.2}% (允许上限 {:.2})",
                pct_required, max_allowed_rate
            ),
        }
    }
}

// ==========================================
// 候选过滤原因 (Candidate Reason)
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 4.6 候选过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateReason {
    /// 能力约束不匹配
    ConstraintMismatch,
    /// 违反费率策略
    RatePolicy,
    /// 结构规则未通过
    PolicyError,
}

impl CandidateReason {
    pub fn as_str(&self) -> &str {
        match self {
            CandidateReason::ConstraintMismatch => "constraint_mismatch",
            CandidateReason::RatePolicy => "rate_policy",
            CandidateReason::PolicyError => "policy_error",
        }
    }
}

impl fmt::Display for CandidateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
