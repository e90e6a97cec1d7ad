// ==========================================
// 定价下单配置系统 - 选中集值对象
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 9. 设计说明（显式选中集）
// 说明: 取代会话级全局选中状态；所有查询函数显式注入本对象，
//       模拟器可在不触碰真实会话的前提下构造任意假想选中集
// ==========================================

use serde::{Deserialize, Serialize};

/// 按插入顺序维护的选中 id 集合
///
/// 顺序即用户选择顺序，服务组合依赖该顺序；重复选中被忽略。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由 id 序列构建（保序去重）
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::new();
        for id in ids {
            selection.select(id.into());
        }
        selection
    }

    /// 追加选中；已存在则保持原位置
    pub fn select(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.ids.iter().any(|existing| *existing == id) {
            self.ids.push(id);
        }
    }

    pub fn deselect(&mut self, id: &str) {
        self.ids.retain(|existing| existing != id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// 插入顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(|s| s.as_str())
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}
