// ==========================================
// 定价下单配置系统 - 配置层
// ==========================================
// 职责: 修订模型、结构校验、引用体检
// 红线: 修订不可变，变更只经 Builder
// ==========================================

pub mod error;
pub mod lint;
pub mod model;

// 重导出核心类型
pub use error::{ConfigError, ConfigViolation};
pub use lint::{lint_references, LintDiagnostic, ReferenceContext};
pub use model::ConfigModel;
