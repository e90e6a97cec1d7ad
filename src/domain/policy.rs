// ==========================================
// 定价下单配置系统 - 规则与回退设置
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 4.5 规则引擎 / 4.6 候选过滤
// 说明: 规则输入为宽松 JSON，缺失字段在编译期兜底，不拒绝
// ==========================================

use crate::domain::types::RatePolicy;
use serde::{Deserialize, Serialize};

// ==========================================
// 原始规则 (Raw Rule)
// ==========================================
/// 宽松格式的结构规则描述
///
/// 字段全部可缺省：scope/severity/filter 缺失走默认值，
/// 未知 op 与畸形 projection 编译为失败闭合的求值器（见 engine::policy）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRule {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,

    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default)]
    pub op: Option<String>,

    /// 点路径投影，必须以 "service." 开头
    #[serde(default)]
    pub projection: Option<String>,

    #[serde(default)]
    pub filter: Option<RawRuleFilter>,

    /// max_count / min_count 的阈值
    #[serde(default)]
    pub bound: Option<f64>,

    #[serde(default)]
    pub severity: Option<String>,
}

/// 规则前置过滤器
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRuleFilter {
    /// base / utility / both
    #[serde(default)]
    pub role: Option<String>,
}

// ==========================================
// 规则角色过滤 (Role Filter)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleFilter {
    Base,
    Utility,
    Both,
}

impl Default for RoleFilter {
    fn default() -> Self {
        RoleFilter::Both
    }
}

// ==========================================
// 回退候选选择策略 (Selection Strategy)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// 取第一个通过全部检查的候选
    FirstEligible,
    /// 在通过检查的候选中取费率最低者
    CheapestEligible,
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        SelectionStrategy::FirstEligible
    }
}

// ==========================================
// 回退模式 (Fallback Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// 约束、费率、规则三项全部作为门禁
    Strict,
    /// 规则失败仅记录原因，不阻断候选
    Dev,
}

impl Default for FallbackMode {
    fn default() -> Self {
        FallbackMode::Strict
    }
}

// ==========================================
// 回退设置 (Fallback Settings)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackSettings {
    #[serde(default)]
    pub rate_policy: RatePolicy,

    #[serde(default = "default_true")]
    pub require_constraint_fit: bool,

    #[serde(default)]
    pub selection_strategy: SelectionStrategy,

    #[serde(default)]
    pub mode: FallbackMode,
}

fn default_true() -> bool {
    true
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            rate_policy: RatePolicy::default(),
            require_constraint_fit: true,
            selection_strategy: SelectionStrategy::default(),
            mode: FallbackMode::default(),
        }
    }
}
