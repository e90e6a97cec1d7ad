// ==========================================
// 定价下单配置系统 - 可见性解析器
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 4.2 可见性解析
// ==========================================
// 职责: (修订, 标签上下文, 选中集) → 有序可见字段池
// 红线: 纯函数、无副作用；exclude 永远赢过 include；
//       未知引用宽容跳过（由 config::lint 负责报告）
// ==========================================

use crate::config::model::ConfigModel;
use crate::domain::field::Field;
use crate::engine::selection::Selection;
use std::collections::HashSet;

/// 可见字段池（有序字段列表 + 平行 id 列表）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisiblePool {
    pub fields: Vec<Field>,
    pub field_ids: Vec<String>,
}

/// 解析标签上下文下的可见字段
///
/// # 算法
/// 1. 选中 id 解析为触发器集（选项 id 原样、button 字段 id、历史复合键）
/// 2. 按触发器顺序并集 reveal include/exclude
/// 3. 池 = 绑定字段（声明顺序）∪ 标签 includes ∪ 触发 includes
/// 4. 移除标签 excludes ∪ 触发 excludes（在全部 include 并集之后应用）
/// 5. order_for_tags 存在时按其前缀排序，剩余按入池顺序
pub fn resolve_visible_fields(
    model: &ConfigModel,
    tag_id: &str,
    selection: &Selection,
) -> VisiblePool {
    // 1. 触发器集（保序去重）
    let mut triggers: Vec<String> = Vec::new();
    let mut seen_triggers: HashSet<String> = HashSet::new();
    for raw in selection.iter() {
        if let Some(trigger) = model.resolve_trigger_id(raw) {
            if seen_triggers.insert(trigger.clone()) {
                triggers.push(trigger);
            }
        }
    }

    // 2. reveal include/exclude 并集
    let mut trigger_include: Vec<String> = Vec::new();
    let mut trigger_exclude: HashSet<String> = HashSet::new();
    for trigger in &triggers {
        if let Some(ids) = model.includes_for_buttons.get(trigger) {
            trigger_include.extend(ids.iter().cloned());
        }
        if let Some(ids) = model.excludes_for_buttons.get(trigger) {
            trigger_exclude.extend(ids.iter().cloned());
        }
    }

    // 3. 入池（保持插入顺序）
    let mut pool_order: Vec<String> = Vec::new();
    let mut pool_member: HashSet<String> = HashSet::new();
    let mut admit = |id: &str, pool_order: &mut Vec<String>, pool_member: &mut HashSet<String>| {
        if model.field(id).is_some() && pool_member.insert(id.to_string()) {
            pool_order.push(id.to_string());
        }
    };

    for field in model.bound_fields(tag_id) {
        admit(&field.id, &mut pool_order, &mut pool_member);
    }
    if let Some(tag) = model.tag(tag_id) {
        for id in &tag.includes {
            admit(id, &mut pool_order, &mut pool_member);
        }
    }
    for id in &trigger_include {
        admit(id, &mut pool_order, &mut pool_member);
    }

    // 4. exclude 收口
    let tag_exclude: HashSet<&str> = model
        .tag(tag_id)
        .map(|t| t.excludes.iter().map(|s| s.as_str()).collect())
        .unwrap_or_default();
    pool_order.retain(|id| !tag_exclude.contains(id.as_str()) && !trigger_exclude.contains(id));

    // 5. 排序：前缀优先，剩余保持入池顺序
    let ordered_ids = match model.order_for_tags.get(tag_id) {
        Some(prefix) => {
            let in_pool: HashSet<&str> = pool_order.iter().map(|s| s.as_str()).collect();
            let mut placed: HashSet<&str> = HashSet::new();
            let mut ordered: Vec<String> = Vec::new();
            for id in prefix {
                if in_pool.contains(id.as_str()) && placed.insert(id.as_str()) {
                    ordered.push(id.clone());
                }
            }
            for id in &pool_order {
                if !placed.contains(id.as_str()) {
                    ordered.push(id.clone());
                }
            }
            ordered
        }
        None => pool_order,
    };

    let fields = ordered_ids
        .iter()
        .filter_map(|id| model.field(id).cloned())
        .collect();

    VisiblePool {
        fields,
        field_ids: ordered_ids,
    }
}

/// 无显式标签时解析标签上下文
///
/// # 优先级
/// 1. 已跟踪的当前标签
/// 2. 选中集中第一个本身是标签 id 的条目
/// 3. 第一个选中字段的绑定标签
/// 4. 选中选项所属字段的绑定标签
/// 5. 配置的根标签
pub fn resolve_tag_context(
    model: &ConfigModel,
    selection: &Selection,
    tracked: Option<&str>,
    root_tag_id: Option<&str>,
) -> Option<String> {
    if let Some(tracked) = tracked {
        return Some(tracked.to_string());
    }
    for id in selection.iter() {
        if model.tag(id).is_some() {
            return Some(id.to_string());
        }
    }
    for id in selection.iter() {
        if model.field(id).is_some() {
            if let Some(tag_id) = model.owning_tag_of_field(id) {
                return Some(tag_id.to_string());
            }
        }
    }
    for id in selection.iter() {
        // 历史复合键也先归一到全局选项 id
        let option_id = match model.resolve_trigger_id(id) {
            Some(resolved) => resolved,
            None => continue,
        };
        if let Some(field) = model.owning_field_of_option(&option_id) {
            let field_id = field.id.clone();
            if let Some(tag_id) = model.owning_tag_of_field(&field_id) {
                return Some(tag_id.to_string());
            }
        }
    }
    root_tag_id.map(|s| s.to_string())
}
