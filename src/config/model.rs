// ==========================================
// 定价下单配置系统 - 配置修订模型
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 3. 数据模型 / 3.1 不变量
// ==========================================
// 职责: 每修订不可变的配置快照 + 结构查询 + 结构校验
// 红线: 修订只由 Builder 替换整体产生，禁止原地修改
// ==========================================

use crate::config::error::ConfigViolation;
use crate::domain::field::{Field, FieldOption};
use crate::domain::tag::Tag;
use crate::domain::types::PricingRole;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 配置修订（不可变快照）
///
/// - includes_for_buttons / excludes_for_buttons: 触发器 id →
///   选中后加入/移出可见池的字段 id 列表
/// - order_for_tags: 标签 id → 显示顺序前缀
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigModel {
    #[serde(default)]
    pub tags: Vec<Tag>,

    #[serde(default)]
    pub fields: Vec<Field>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub includes_for_buttons: HashMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub excludes_for_buttons: HashMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub order_for_tags: HashMap<String, Vec<String>>,
}

impl ConfigModel {
    // ==========================================
    // 基础查询
    // ==========================================

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// 全局查找选项（选项 id 全局带命名空间，跨字段唯一）
    pub fn find_option(&self, option_id: &str) -> Option<(&Field, &FieldOption)> {
        self.fields
            .iter()
            .find_map(|f| f.option(option_id).map(|o| (f, o)))
    }

    /// 按声明顺序枚举绑定到指定标签的字段
    pub fn bound_fields<'a>(&'a self, tag_id: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |f| f.is_bound_to(tag_id))
    }

    /// 字段的归属标签（多绑定时取第一个可解析者）
    pub fn owning_tag_of_field(&self, field_id: &str) -> Option<&str> {
        let field = self.field(field_id)?;
        field
            .bind_ids
            .iter()
            .find(|b| self.tag(b).is_some())
            .map(|b| b.as_str())
    }

    /// 选项的归属字段
    pub fn owning_field_of_option(&self, option_id: &str) -> Option<&Field> {
        self.find_option(option_id).map(|(f, _)| f)
    }

    // ==========================================
    // 触发器 id 解析
    // ==========================================

    /// 把原始选中 id 解析为规范触发器 id
    ///
    /// # 规则
    /// - 选项 id 原样命中 → 直接使用
    /// - button 字段 id → 直接使用
    /// - 历史复合键 "fieldId::optionId" → 解析到同一个全局选项 id
    ///
    /// # 返回
    /// - None: 不是触发器（普通字段/未知 id），可见性解析时宽容跳过
    pub fn resolve_trigger_id(&self, raw: &str) -> Option<String> {
        if self.find_option(raw).is_some() {
            return Some(raw.to_string());
        }
        if let Some(field) = self.field(raw) {
            if field.button {
                return Some(raw.to_string());
            }
        }
        if let Some((field_id, option_part)) = raw.split_once("::") {
            if let Some(field) = self.field(field_id) {
                // 选项 id 本身可能带命名空间（等于复合键全文）
                if field.option(raw).is_some() {
                    return Some(raw.to_string());
                }
                if field.option(option_part).is_some() {
                    return Some(option_part.to_string());
                }
            }
            if self.find_option(option_part).is_some() {
                return Some(option_part.to_string());
            }
        }
        None
    }

    // ==========================================
    // 标签树遍历（循环防护）
    // ==========================================

    /// 祖先链，自近及远；bind_id 出现环时在重访处截断
    pub fn parent_chain(&self, tag_id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(tag_id);

        let mut current = self.tag(tag_id).and_then(|t| t.bind_id.as_deref());
        while let Some(parent_id) = current {
            if !visited.insert(parent_id) {
                break;
            }
            chain.push(parent_id.to_string());
            current = self.tag(parent_id).and_then(|t| t.bind_id.as_deref());
        }
        chain
    }

    /// 直接子标签（仅一层）
    pub fn children_of(&self, tag_id: &str) -> Vec<&Tag> {
        self.tags
            .iter()
            .filter(|t| t.bind_id.as_deref() == Some(tag_id))
            .collect()
    }

    // ==========================================
    // 规范化与校验
    // ==========================================

    /// utility 守卫：utility 角色的字段/选项清除 service_id
    ///
    /// 写入侧自动纠正，保证已提交修订内不变量恒成立。
    pub fn normalize(&mut self) {
        for field in &mut self.fields {
            if field.pricing_role == Some(PricingRole::Utility) {
                field.service_id = None;
            }
            for option in &mut field.options {
                if option.pricing_role == PricingRole::Utility {
                    option.service_id = None;
                }
            }
        }
    }

    /// 结构性校验，返回全部违规（一次报告所有问题）
    pub fn validate(&self) -> Vec<ConfigViolation> {
        let mut violations = Vec::new();

        let mut tag_ids: HashSet<&str> = HashSet::new();
        for tag in &self.tags {
            if !tag_ids.insert(&tag.id) {
                violations.push(ConfigViolation::DuplicateTagId {
                    id: tag.id.clone(),
                });
            }
        }

        let mut field_ids: HashSet<&str> = HashSet::new();
        for field in &self.fields {
            if !field_ids.insert(&field.id) {
                violations.push(ConfigViolation::DuplicateFieldId {
                    id: field.id.clone(),
                });
            }

            let mut option_ids: HashSet<&str> = HashSet::new();
            for option in &field.options {
                if !option_ids.insert(&option.id) {
                    violations.push(ConfigViolation::DuplicateOptionId {
                        field_id: field.id.clone(),
                        option_id: option.id.clone(),
                    });
                }
            }

            for bind_id in &field.bind_ids {
                if !tag_ids.contains(bind_id.as_str()) {
                    violations.push(ConfigViolation::DanglingBindId {
                        field_id: field.id.clone(),
                        bind_id: bind_id.clone(),
                    });
                }
            }
        }

        for tag in &self.tags {
            if let Some(bind_id) = &tag.bind_id {
                if !tag_ids.contains(bind_id.as_str()) {
                    violations.push(ConfigViolation::DanglingParentTag {
                        tag_id: tag.id.clone(),
                        bind_id: bind_id.clone(),
                    });
                }
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::FieldOption;
    use crate::domain::types::PricingRole;

    fn sample_model() -> ConfigModel {
        ConfigModel {
            tags: vec![Tag::new("t:root"), Tag::new("t:sub").with_bind("t:root")],
            fields: vec![
                Field::new("f:plan").bound_to("t:root").with_options(vec![
                    FieldOption::new("f:plan::o:basic", PricingRole::Base)
                        .with_service("svc-basic"),
                ]),
                Field::new("f:extra").bound_to("t:sub").as_button(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_trigger_verbatim_option() {
        let m = sample_model();
        assert_eq!(
            m.resolve_trigger_id("f:plan::o:basic").as_deref(),
            Some("f:plan::o:basic")
        );
    }

    #[test]
    fn test_resolve_trigger_button_field() {
        let m = sample_model();
        assert_eq!(m.resolve_trigger_id("f:extra").as_deref(), Some("f:extra"));
        // 非 button 字段不是触发器
        assert!(m.resolve_trigger_id("f:plan").is_none());
    }

    #[test]
    fn test_parent_chain_stops_on_cycle() {
        let mut m = sample_model();
        // 人为制造环: root → sub → root
        m.tags[0].bind_id = Some("t:sub".into());
        let chain = m.parent_chain("t:sub");
        assert_eq!(chain, vec!["t:root".to_string()]);
    }

    #[test]
    fn test_normalize_clears_utility_service() {
        let mut m = sample_model();
        m.fields[0].options[0].pricing_role = PricingRole::Utility;
        m.normalize();
        assert!(m.fields[0].options[0].service_id.is_none());
    }

    #[test]
    fn test_validate_reports_dangling_bind() {
        let mut m = sample_model();
        m.fields.push(Field::new("f:ghost").bound_to("t:missing"));
        let violations = m.validate();
        assert!(violations
            .iter()
            .any(|v| matches!(v, ConfigViolation::DanglingBindId { .. })));
    }
}
