// ==========================================
// 定价下单配置系统 - 领域模型层
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 3. 数据模型
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含解析逻辑,不含引擎逻辑
// ==========================================

pub mod field;
pub mod policy;
pub mod service;
pub mod tag;
pub mod types;

// 重导出核心类型
pub use field::{Field, FieldOption, FieldType};
pub use policy::{
    FallbackMode, FallbackSettings, RawRule, RawRuleFilter, RoleFilter, SelectionStrategy,
};
pub use service::{identity_resolver, map_resolver, ServiceCapability, ServiceMap};
pub use tag::Tag;
pub use types::{
    CandidateReason, PolicyScope, PricingRole, RatePolicy, RateViolationReason, Severity,
};
