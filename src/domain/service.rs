// ==========================================
// 定价下单配置系统 - 服务能力实体
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 3. ServiceCapability
// 说明: 服务解析由外部协作方提供，引擎只消费解析结果
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 已解析的计价服务记录
///
/// flags 承载任意布尔/字符串能力标志（如 dripfeed、platform_id），
/// 作为规则投影与约束匹配的目标，随记录扁平序列化。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceCapability {
    pub id: String,

    #[serde(default)]
    pub rate: f64,

    #[serde(flatten)]
    pub flags: Map<String, Value>,
}

impl ServiceCapability {
    pub fn new(id: impl Into<String>, rate: f64) -> Self {
        Self {
            id: id.into(),
            rate,
            flags: Map::new(),
        }
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: Value) -> Self {
        self.flags.insert(key.into(), value);
        self
    }

    /// 身份占位记录：只携带 id，费率为 0
    ///
    /// 解析器缺省实现用它包装未知 id，保证组合结果总能保序输出。
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rate: 0.0,
            flags: Map::new(),
        }
    }

    /// 按点路径投影服务记录（`rate` / `id` / 任意 flag，支持点号下钻）
    ///
    /// # 返回
    /// - None: 路径不可解析
    pub fn project(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;

        let mut current = match head {
            "id" => Value::String(self.id.clone()),
            "rate" => serde_json::Number::from_f64(self.rate).map(Value::Number)?,
            "flags" => Value::Object(self.flags.clone()),
            other => self.flags.get(other)?.clone(),
        };

        for seg in segments {
            current = current.as_object()?.get(seg)?.clone();
        }
        Some(current)
    }
}

/// 服务 id → 能力记录
pub type ServiceMap = HashMap<String, ServiceCapability>;

/// 服务能力解析函数（外部协作方注入）
pub type ServiceResolver<'a> = dyn Fn(&str) -> Option<ServiceCapability> + 'a;

/// 基于 ServiceMap 的解析器
pub fn map_resolver(services: &ServiceMap) -> impl Fn(&str) -> Option<ServiceCapability> + '_ {
    move |id: &str| services.get(id).cloned()
}

/// 身份解析器：任意 id 都包装为占位记录
pub fn identity_resolver(id: &str) -> Option<ServiceCapability> {
    Some(ServiceCapability::placeholder(id))
}
