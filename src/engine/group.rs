// ==========================================
// 定价下单配置系统 - 可见分组解析
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 6. 对外接口
// ==========================================
// 职责: 面向渲染/工作区协作方的聚合查询：
//       标签上下文 + 有序字段 + 祖先/子标签 + 组合服务
// ==========================================

use crate::config::model::ConfigModel;
use crate::domain::field::Field;
use crate::domain::service::ServiceCapability;
use crate::engine::builder::Builder;
use crate::engine::composer::compose_services;
use crate::engine::selection::Selection;
use crate::engine::visibility::{resolve_tag_context, resolve_visible_fields};

/// 单个标签上下文的可见分组
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleGroup {
    pub tag_id: String,
    /// 有序可见字段与平行 id 列表
    pub fields: Vec<Field>,
    pub field_ids: Vec<String>,
    /// 祖先链，自近及远
    pub parent_tags: Vec<String>,
    /// 直接子标签（仅一层）
    pub children_tags: Vec<String>,
    /// 组合服务，primary 在前
    pub services: Vec<ServiceCapability>,
}

/// 分组解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum GroupResolution {
    Single(VisibleGroup),
    /// 选中集横跨多个标签时逐标签给出分组
    Multi(Vec<VisibleGroup>),
}

/// 解析当前选中集对应的可见分组
///
/// # 规则
/// - 选中集中出现多个标签 id → Multi，按选中顺序逐标签解析
/// - 否则走标签上下文推断链（见 visibility::resolve_tag_context）
/// - 推断不出标签上下文 → None
pub fn resolve_visible_group<R>(
    builder: &Builder,
    selection: &Selection,
    resolver: R,
) -> Option<GroupResolution>
where
    R: Fn(&str) -> Option<ServiceCapability>,
{
    let props = builder.props();
    let model: &ConfigModel = &props;

    let selected_tags: Vec<&str> = selection.iter().filter(|id| model.tag(id).is_some()).collect();

    if selected_tags.len() > 1 {
        let groups = selected_tags
            .iter()
            .map(|tag_id| build_group(model, tag_id, selection, &resolver))
            .collect();
        return Some(GroupResolution::Multi(groups));
    }

    let tag_id = resolve_tag_context(
        model,
        selection,
        None,
        builder.options().root_tag_id.as_deref(),
    )?;
    Some(GroupResolution::Single(build_group(
        model, &tag_id, selection, &resolver,
    )))
}

fn build_group<R>(
    model: &ConfigModel,
    tag_id: &str,
    selection: &Selection,
    resolver: &R,
) -> VisibleGroup
where
    R: Fn(&str) -> Option<ServiceCapability>,
{
    let pool = resolve_visible_fields(model, tag_id, selection);
    let services = compose_services(model, model.tag(tag_id), selection, resolver);

    VisibleGroup {
        tag_id: tag_id.to_string(),
        fields: pool.fields,
        field_ids: pool.field_ids,
        parent_tags: model.parent_chain(tag_id),
        children_tags: model
            .children_of(tag_id)
            .into_iter()
            .map(|t| t.id.clone())
            .collect(),
        services,
    }
}
