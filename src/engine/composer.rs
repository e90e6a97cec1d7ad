// ==========================================
// 定价下单配置系统 - 服务组合器
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 4.3 服务组合
// ==========================================
// 职责: (标签上下文, 选中集, 解析器) → 有序服务能力列表
// 规则: primary 在前，其余按选择顺序；首个 base 选项覆盖槽 0，
//       后续 base 追加不再覆盖（刻意宽松）
// ==========================================

use crate::config::model::ConfigModel;
use crate::domain::service::ServiceCapability;
use crate::domain::tag::Tag;
use crate::domain::types::PricingRole;
use crate::engine::selection::Selection;

/// 组合选中集隐含的服务列表
///
/// # 参数
/// - tag: 标签上下文；携带 service_id 时作为槽 0 初始 base
/// - selection: 插入顺序的选中 id 集
/// - resolver: 服务能力解析器（id → 能力记录）；解析失败的条目跳过
///
/// # 规则
/// - 无 service_id 的选中项跳过
/// - 首个 base 角色项：有标签 base 则原位覆盖槽 0，否则插入槽 0
/// - 后续 base 追加到尾部；utility/addon 按选择顺序追加
pub fn compose_services<R>(
    model: &ConfigModel,
    tag: Option<&Tag>,
    selection: &Selection,
    resolver: R,
) -> Vec<ServiceCapability>
where
    R: Fn(&str) -> Option<ServiceCapability>,
{
    let mut composed: Vec<ServiceCapability> = Vec::new();
    let mut base_supplied_by_tag = false;
    let mut base_overridden = false;

    if let Some(service_id) = tag.and_then(|t| t.service_id.as_deref()) {
        if let Some(capability) = resolver(service_id) {
            composed.push(capability);
            base_supplied_by_tag = true;
        }
    }

    for raw in selection.iter() {
        let Some((role, service_id)) = resolve_priced_entry(model, raw) else {
            continue;
        };
        let Some(capability) = resolver(&service_id) else {
            continue;
        };

        match role {
            PricingRole::Base if !base_overridden => {
                if base_supplied_by_tag {
                    composed[0] = capability;
                } else {
                    composed.insert(0, capability);
                }
                base_overridden = true;
            }
            // 后续 base 与 utility/addon 一律追加
            _ => composed.push(capability),
        }
    }

    composed
}

/// 把选中 id 解析为 (计价角色, 服务 id)
///
/// 选项优先；button 字段自身携带 service_id 时等同参与。
/// 无 service_id → None（该选中项不计价）。
fn resolve_priced_entry(model: &ConfigModel, raw: &str) -> Option<(PricingRole, String)> {
    let resolved = model.resolve_trigger_id(raw)?;

    if let Some((_, option)) = model.find_option(&resolved) {
        let service_id = option.service_id.clone()?;
        return Some((option.pricing_role, service_id));
    }

    let field = model.field(&resolved)?;
    if field.button {
        let service_id = field.service_id.clone()?;
        return Some((field.pricing_role.unwrap_or(PricingRole::Addon), service_id));
    }
    None
}
