// ==========================================
// 定价下单配置系统 - 引擎层
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 4. 组件设计
// ==========================================
// 职责: 五大核心算法 + Builder；引擎共享同一数据模型，
//       必须在计价角色、覆盖规则、作用域上语义一致
// 红线: 除 Builder 外全部为只读纯函数；所有判定必须输出 reason
// ==========================================

pub mod builder;
pub mod commands;
pub mod composer;
pub mod fallback;
pub mod group;
pub mod policy;
pub mod selection;
pub mod simulator;
pub mod visibility;

// 重导出核心引擎
pub use builder::{Builder, BuilderOptions, ChangeNotice, StackNotice};
pub use commands::{Command, HistoryEntry};
pub use composer::compose_services;
pub use fallback::{
    filter_services_for_visible_group, select_fallback, CandidateCheck, FallbackContext,
};
pub use group::{resolve_visible_group, GroupResolution, VisibleGroup};
pub use policy::{
    compile_policies, evaluate_policies, CompiledPolicy, PolicyOp, PolicyResult, Projection,
};
pub use selection::Selection;
pub use simulator::{validate_rate_coherence_deep, RateDiagnostic};
pub use visibility::{resolve_tag_context, resolve_visible_fields, VisiblePool};
