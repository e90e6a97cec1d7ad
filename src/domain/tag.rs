// ==========================================
// 定价下单配置系统 - 标签实体
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 3. 数据模型
// 说明: 标签是配置分类节点，经 bind_id 形成森林
// ==========================================

use serde::{Deserialize, Serialize};

/// 标签（配置分类节点）
///
/// - bind_id: 父标签 id，形成树/森林结构
/// - service_id: 标签级默认计价服务
/// - includes/excludes: 在该标签上下文中强制显示/隐藏的字段 id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

impl Tag {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_bind(mut self, bind_id: impl Into<String>) -> Self {
        self.bind_id = Some(bind_id.into());
        self
    }

    pub fn with_service(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }
}
