// ==========================================
// 定价下单配置系统 - 字段实体
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 3. 数据模型
// 说明: 字段是输入定义，可绑定零/一/多个标签，可携带选项
// 红线: utility 角色不得携带 service_id（写入侧清除）
// ==========================================

use crate::domain::types::PricingRole;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Map;

// ==========================================
// 字段类型 (Field Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// 简单输入（文本/数量）
    Input,
    /// 数值输入
    Number,
    /// 单选（携带选项）
    Select,
    /// 多选（携带选项）
    MultiSelect,
    /// 开关
    Toggle,
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Input
    }
}

// ==========================================
// 字段选项 (Field Option)
// ==========================================
/// 字段的可选值，选项 id 在所属字段内唯一（惯例带命名空间前缀）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,

    #[serde(default = "default_option_role")]
    pub pricing_role: PricingRole,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
}

fn default_option_role() -> PricingRole {
    PricingRole::Addon
}

impl FieldOption {
    pub fn new(id: impl Into<String>, role: PricingRole) -> Self {
        Self {
            id: id.into(),
            pricing_role: role,
            service_id: None,
        }
    }

    pub fn with_service(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }
}

// ==========================================
// 字段 (Field)
// ==========================================
/// 输入定义
///
/// - bind_ids: 所属标签 id，接受单个字符串或数组两种写法
/// - button: 字段本身作为可选触发器（无选项）
/// - pricing_role/service_id: 字段自身携带计价引用时生效
/// - meta: 自由格式元数据（含数量推导规则等，由调用方消费）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,

    #[serde(
        default,
        alias = "bind_id",
        deserialize_with = "deserialize_bind_ids",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub bind_ids: Vec<String>,

    #[serde(default, rename = "type")]
    pub field_type: FieldType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,

    #[serde(default)]
    pub button: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_role: Option<PricingRole>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, serde_json::Value>,
}

/// bind_ids 兼容两种历史写法: "tag-a" 与 ["tag-a", "tag-b"]
fn deserialize_bind_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(id)) => vec![id],
        Some(OneOrMany::Many(ids)) => ids,
    })
}

impl Field {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn bound_to(mut self, tag_id: impl Into<String>) -> Self {
        self.bind_ids.push(tag_id.into());
        self
    }

    pub fn as_button(mut self) -> Self {
        self.button = true;
        self.field_type = FieldType::Toggle;
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.field_type = FieldType::Select;
        self.options = options;
        self
    }

    pub fn with_pricing(mut self, role: PricingRole, service_id: impl Into<String>) -> Self {
        self.pricing_role = Some(role);
        self.service_id = Some(service_id.into());
        self
    }

    /// 字段是否绑定到指定标签
    pub fn is_bound_to(&self, tag_id: &str) -> bool {
        self.bind_ids.iter().any(|b| b == tag_id)
    }

    /// 字段是否携带选项
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// 按 id 查找选项
    pub fn option(&self, option_id: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}
