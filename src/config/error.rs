// ==========================================
// 定价下单配置系统 - 配置层错误类型
// ==========================================
// 职责: 定义结构性校验错误，变更失败必须快速失败且保留旧修订
// 红线: 错误信息必须包含显式原因（可解释性）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 单条结构性违规
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConfigViolation {
    /// 标签 id 重复
    DuplicateTagId { id: String },
    /// 字段 id 重复
    DuplicateFieldId { id: String },
    /// 选项 id 在所属字段内重复
    DuplicateOptionId { field_id: String, option_id: String },
    /// 字段绑定了不存在的标签
    DanglingBindId { field_id: String, bind_id: String },
    /// 标签的父标签不存在
    DanglingParentTag { tag_id: String, bind_id: String },
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigViolation::DuplicateTagId { id } => write!(f, "标签 id 重复: {}", id),
            ConfigViolation::DuplicateFieldId { id } => write!(f, "字段 id 重复: {}", id),
            ConfigViolation::DuplicateOptionId {
                field_id,
                option_id,
            } => write!(f, "选项 id 重复: field={}, option={}", field_id, option_id),
            ConfigViolation::DanglingBindId { field_id, bind_id } => {
                write!(f, "字段绑定悬空: field={}, bind_id={}", field_id, bind_id)
            }
            ConfigViolation::DanglingParentTag { tag_id, bind_id } => {
                write!(f, "父标签悬空: tag={}, bind_id={}", tag_id, bind_id)
            }
        }
    }
}

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 结构性校验失败，load/变更被拒绝，旧修订保留
    #[error("无效配置: {}", format_violations(.violations))]
    InvalidConfig { violations: Vec<ConfigViolation> },

    /// 命令目标不存在
    #[error("命令目标不存在: {kind} id={id}")]
    UnknownCommandTarget { kind: &'static str, id: String },
}

fn format_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
