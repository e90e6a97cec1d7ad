// ==========================================
// 定价下单配置系统 - 变更命令
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 4.1 Builder / 9. 设计说明
// 说明: 命令是可序列化值对象（名称 + 正向/逆向数据），
//       不是闭包；历史可检视、可封顶、可确定性重放
// 红线: utility 守卫在应用侧规范化兜底，命令本身不抛出
// ==========================================

use crate::config::error::ConfigError;
use crate::config::model::ConfigModel;
use crate::domain::field::Field;
use crate::domain::tag::Tag;
use crate::domain::types::PricingRole;
use serde::{Deserialize, Serialize};

/// 可逆变更命令
///
/// 空列表语义: SetRevealRules / SetTagOrder 传空列表时移除对应映射条目。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    UpsertTag {
        tag: Tag,
    },
    RemoveTag {
        id: String,
    },
    UpsertField {
        field: Field,
    },
    RemoveField {
        id: String,
    },
    /// 设置字段自身的计价角色与服务引用
    SetFieldPricing {
        field_id: String,
        role: Option<PricingRole>,
        service_id: Option<String>,
    },
    /// 设置选项的计价角色与服务引用
    SetOptionPricing {
        field_id: String,
        option_id: String,
        role: PricingRole,
        service_id: Option<String>,
    },
    /// 设置触发器的 reveal 规则
    SetRevealRules {
        trigger_id: String,
        includes: Vec<String>,
        excludes: Vec<String>,
    },
    /// 设置标签的显示顺序前缀
    SetTagOrder {
        tag_id: String,
        order: Vec<String>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::UpsertTag { .. } => "upsert_tag",
            Command::RemoveTag { .. } => "remove_tag",
            Command::UpsertField { .. } => "upsert_field",
            Command::RemoveField { .. } => "remove_field",
            Command::SetFieldPricing { .. } => "set_field_pricing",
            Command::SetOptionPricing { .. } => "set_option_pricing",
            Command::SetRevealRules { .. } => "set_reveal_rules",
            Command::SetTagOrder { .. } => "set_tag_order",
        }
    }

    /// 基于当前修订计算逆命令（在 apply 之前调用）
    pub fn invert(&self, model: &ConfigModel) -> Result<Command, ConfigError> {
        match self {
            Command::UpsertTag { tag } => Ok(match model.tag(&tag.id) {
                Some(old) => Command::UpsertTag { tag: old.clone() },
                None => Command::RemoveTag { id: tag.id.clone() },
            }),
            Command::RemoveTag { id } => {
                let old = model.tag(id).ok_or(ConfigError::UnknownCommandTarget {
                    kind: "tag",
                    id: id.clone(),
                })?;
                Ok(Command::UpsertTag { tag: old.clone() })
            }
            Command::UpsertField { field } => Ok(match model.field(&field.id) {
                Some(old) => Command::UpsertField { field: old.clone() },
                None => Command::RemoveField {
                    id: field.id.clone(),
                },
            }),
            Command::RemoveField { id } => {
                let old = model.field(id).ok_or(ConfigError::UnknownCommandTarget {
                    kind: "field",
                    id: id.clone(),
                })?;
                Ok(Command::UpsertField { field: old.clone() })
            }
            Command::SetFieldPricing { field_id, .. } => {
                let old = model
                    .field(field_id)
                    .ok_or(ConfigError::UnknownCommandTarget {
                        kind: "field",
                        id: field_id.clone(),
                    })?;
                Ok(Command::SetFieldPricing {
                    field_id: field_id.clone(),
                    role: old.pricing_role,
                    service_id: old.service_id.clone(),
                })
            }
            Command::SetOptionPricing {
                field_id,
                option_id,
                ..
            } => {
                let field = model
                    .field(field_id)
                    .ok_or(ConfigError::UnknownCommandTarget {
                        kind: "field",
                        id: field_id.clone(),
                    })?;
                let old = field
                    .option(option_id)
                    .ok_or(ConfigError::UnknownCommandTarget {
                        kind: "option",
                        id: option_id.clone(),
                    })?;
                Ok(Command::SetOptionPricing {
                    field_id: field_id.clone(),
                    option_id: option_id.clone(),
                    role: old.pricing_role,
                    service_id: old.service_id.clone(),
                })
            }
            Command::SetRevealRules { trigger_id, .. } => Ok(Command::SetRevealRules {
                trigger_id: trigger_id.clone(),
                includes: model
                    .includes_for_buttons
                    .get(trigger_id)
                    .cloned()
                    .unwrap_or_default(),
                excludes: model
                    .excludes_for_buttons
                    .get(trigger_id)
                    .cloned()
                    .unwrap_or_default(),
            }),
            Command::SetTagOrder { tag_id, .. } => Ok(Command::SetTagOrder {
                tag_id: tag_id.clone(),
                order: model.order_for_tags.get(tag_id).cloned().unwrap_or_default(),
            }),
        }
    }

    /// 正向应用，产出新修订（调用方负责 normalize + 校验）
    pub fn apply(&self, model: &ConfigModel) -> Result<ConfigModel, ConfigError> {
        let mut next = model.clone();
        match self {
            Command::UpsertTag { tag } => {
                match next.tags.iter().position(|t| t.id == tag.id) {
                    Some(index) => next.tags[index] = tag.clone(),
                    None => next.tags.push(tag.clone()),
                }
            }
            Command::RemoveTag { id } => {
                if next.tag(id).is_none() {
                    return Err(ConfigError::UnknownCommandTarget {
                        kind: "tag",
                        id: id.clone(),
                    });
                }
                next.tags.retain(|t| t.id != *id);
            }
            Command::UpsertField { field } => {
                match next.fields.iter().position(|f| f.id == field.id) {
                    Some(index) => next.fields[index] = field.clone(),
                    None => next.fields.push(field.clone()),
                }
            }
            Command::RemoveField { id } => {
                if next.field(id).is_none() {
                    return Err(ConfigError::UnknownCommandTarget {
                        kind: "field",
                        id: id.clone(),
                    });
                }
                next.fields.retain(|f| f.id != *id);
            }
            Command::SetFieldPricing {
                field_id,
                role,
                service_id,
            } => {
                let field = next
                    .fields
                    .iter_mut()
                    .find(|f| f.id == *field_id)
                    .ok_or(ConfigError::UnknownCommandTarget {
                        kind: "field",
                        id: field_id.clone(),
                    })?;
                field.pricing_role = *role;
                field.service_id = service_id.clone();
            }
            Command::SetOptionPricing {
                field_id,
                option_id,
                role,
                service_id,
            } => {
                let field = next
                    .fields
                    .iter_mut()
                    .find(|f| f.id == *field_id)
                    .ok_or(ConfigError::UnknownCommandTarget {
                        kind: "field",
                        id: field_id.clone(),
                    })?;
                let option = field
                    .options
                    .iter_mut()
                    .find(|o| o.id == *option_id)
                    .ok_or(ConfigError::UnknownCommandTarget {
                        kind: "option",
                        id: option_id.clone(),
                    })?;
                option.pricing_role = *role;
                option.service_id = service_id.clone();
            }
            Command::SetRevealRules {
                trigger_id,
                includes,
                excludes,
            } => {
                if includes.is_empty() {
                    next.includes_for_buttons.remove(trigger_id);
                } else {
                    next.includes_for_buttons
                        .insert(trigger_id.clone(), includes.clone());
                }
                if excludes.is_empty() {
                    next.excludes_for_buttons.remove(trigger_id);
                } else {
                    next.excludes_for_buttons
                        .insert(trigger_id.clone(), excludes.clone());
                }
            }
            Command::SetTagOrder { tag_id, order } => {
                if order.is_empty() {
                    next.order_for_tags.remove(tag_id);
                } else {
                    next.order_for_tags.insert(tag_id.clone(), order.clone());
                }
            }
        }
        Ok(next)
    }
}

/// 历史条目：命令名 + 正向/逆向命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    pub forward: Command,
    pub inverse: Command,
}
