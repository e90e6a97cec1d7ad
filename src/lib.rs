// ==========================================
// 定价下单配置系统 - 核心库
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 1. 范围
// 系统定位: 配置图解析与校验引擎（渲染/协作/布局为外部协作方）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 修订模型与校验
pub mod config;

// 引擎层 - 核心算法
pub mod engine;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{lint_references, ConfigError, ConfigModel, ConfigViolation, LintDiagnostic};
pub use domain::{
    CandidateReason, FallbackMode, FallbackSettings, Field, FieldOption, FieldType, PolicyScope,
    PricingRole, RatePolicy, RawRule, RoleFilter, SelectionStrategy, ServiceCapability,
    ServiceMap, Severity, Tag,
};
pub use engine::{
    compile_policies, compose_services, evaluate_policies, filter_services_for_visible_group,
    resolve_visible_fields, resolve_visible_group, select_fallback, validate_rate_coherence_deep,
    Builder, BuilderOptions, CandidateCheck, Command, CompiledPolicy, FallbackContext,
    GroupResolution, PolicyResult, RateDiagnostic, Selection, VisibleGroup, VisiblePool,
};
