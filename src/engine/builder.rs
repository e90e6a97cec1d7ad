// ==========================================
// 定价下单配置系统 - Builder
// ==========================================
// 依据: Config_Engine_Specs_v0.9.md - 4.1 Builder
// ==========================================
// 职责: 持有当前修订，应用可逆命令，维护封顶的撤销/重做历史
// 红线: 单写者纪律 —— 同一逻辑会话内的变更必须串行；
//       读查询之间可并发，但不得与进行中的命令应用竞争
// ==========================================

use crate::config::error::ConfigError;
use crate::config::model::ConfigModel;
use crate::engine::commands::{Command, HistoryEntry};
use crate::engine::selection::Selection;
use crate::engine::visibility;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// Builder 配置
// ==========================================
#[derive(Debug, Clone)]
pub struct BuilderOptions {
    /// load 与命令提交时是否执行结构校验
    pub validate: bool,
    /// 撤销历史上限，超出时最旧条目被淘汰
    pub history_limit: usize,
    /// 无显式标签上下文时的兜底根标签
    pub root_tag_id: Option<String>,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            validate: true,
            history_limit: 100,
            root_tag_id: None,
        }
    }
}

// ==========================================
// 变更通知
// ==========================================
/// 命令/载入成功后的变更通知
#[derive(Debug, Clone)]
pub struct ChangeNotice {
    pub props: Arc<ConfigModel>,
    pub reason: String,
    pub command: Option<String>,
}

/// 历史栈通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackNotice {
    /// 撤销栈 + 重做栈总长度
    pub stack_size: usize,
    /// 当前游标（撤销栈长度）
    pub index: usize,
}

type ChangeListener = Box<dyn Fn(&ChangeNotice)>;
type StackListener = Box<dyn Fn(&StackNotice)>;

// ==========================================
// Builder
// ==========================================
/// 修订所有者与唯一变更入口
pub struct Builder {
    options: BuilderOptions,
    props: Arc<ConfigModel>,
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    change_listeners: Vec<ChangeListener>,
    stack_listeners: Vec<StackListener>,
}

impl Builder {
    pub fn new(options: BuilderOptions) -> Self {
        Self {
            options,
            props: Arc::new(ConfigModel::default()),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            change_listeners: Vec::new(),
            stack_listeners: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(BuilderOptions::default())
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// 当前修订（只读快照）
    pub fn props(&self) -> Arc<ConfigModel> {
        Arc::clone(&self.props)
    }

    // ==========================================
    // 载入
    // ==========================================

    /// 整体替换修订并清空历史
    ///
    /// 载入保留作者原文（utility 守卫在命令边界执行，不在载入时改写）。
    ///
    /// # 错误
    /// - InvalidConfig: 结构校验失败（开启校验时），旧修订保留
    pub fn load(&mut self, props: ConfigModel) -> Result<(), ConfigError> {
        if self.options.validate {
            let violations = props.validate();
            if !violations.is_empty() {
                return Err(ConfigError::InvalidConfig { violations });
            }
        }

        self.props = Arc::new(props);
        self.undo_stack.clear();
        self.redo_stack.clear();

        info!(
            tags = self.props.tags.len(),
            fields = self.props.fields.len(),
            "配置载入完成"
        );
        self.notify_change("load", None);
        self.notify_stack();
        Ok(())
    }

    // ==========================================
    // 结构查询
    // ==========================================

    /// 指定标签上下文下的可见字段 id（委托可见性解析器）
    ///
    /// # 参数
    /// - fallback_selection_keys: 复合键 "fieldId::optionId" 形式的合成选中集
    pub fn visible_fields(&self, tag_id: &str, fallback_selection_keys: &[String]) -> Vec<String> {
        let selection = Selection::from_ids(fallback_selection_keys.iter().cloned());
        visibility::resolve_visible_fields(&self.props, tag_id, &selection).field_ids
    }

    // ==========================================
    // 命令应用与历史
    // ==========================================

    /// 应用一条可逆命令
    ///
    /// # 规则
    /// - 逆命令在应用前基于当前修订计算
    /// - 成功后压入撤销栈（超限淘汰最旧），清空重做栈
    /// - 校验失败时旧修订保留，历史不变
    pub fn apply(&mut self, command: Command) -> Result<(), ConfigError> {
        let inverse = command.invert(&self.props)?;
        let mut next = command.apply(&self.props)?;
        next.normalize();

        if self.options.validate {
            let violations = next.validate();
            if !violations.is_empty() {
                return Err(ConfigError::InvalidConfig { violations });
            }
        }

        let name = command.name().to_string();
        self.props = Arc::new(next);
        self.undo_stack.push(HistoryEntry {
            name: name.clone(),
            forward: command,
            inverse,
        });
        if self.undo_stack.len() > self.options.history_limit {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();

        debug!(command = %name, undo_depth = self.undo_stack.len(), "命令已应用");
        self.notify_change("command", Some(name));
        self.notify_stack();
        Ok(())
    }

    /// 撤销最近一条命令
    ///
    /// # 返回
    /// - false: 无可撤销条目
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };

        match entry.inverse.apply(&self.props) {
            Ok(mut reverted) => {
                reverted.normalize();
                self.props = Arc::new(reverted);
                let name = entry.name.clone();
                self.redo_stack.push(entry);
                self.notify_change("undo", Some(name));
                self.notify_stack();
                true
            }
            Err(e) => {
                // 逆命令理论上总能应用；失败时保持原状并告警
                warn!(command = %entry.name, error = %e, "撤销失败，历史回滚");
                self.undo_stack.push(entry);
                false
            }
        }
    }

    /// 重做最近撤销的命令
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };

        match entry.forward.apply(&self.props) {
            Ok(mut next) => {
                next.normalize();
                self.props = Arc::new(next);
                let name = entry.name.clone();
                self.undo_stack.push(entry);
                self.notify_change("redo", Some(name));
                self.notify_stack();
                true
            }
            Err(e) => {
                warn!(command = %entry.name, error = %e, "重做失败，历史回滚");
                self.redo_stack.push(entry);
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// 历史检视（撤销栈，旧→新）
    pub fn history(&self) -> &[HistoryEntry] {
        &self.undo_stack
    }

    // ==========================================
    // 通知
    // ==========================================

    pub fn on_change(&mut self, listener: ChangeListener) {
        self.change_listeners.push(listener);
    }

    pub fn on_stack(&mut self, listener: StackListener) {
        self.stack_listeners.push(listener);
    }

    fn notify_change(&self, reason: &str, command: Option<String>) {
        if self.change_listeners.is_empty() {
            return;
        }
        let notice = ChangeNotice {
            props: Arc::clone(&self.props),
            reason: reason.to_string(),
            command,
        };
        for listener in &self.change_listeners {
            listener(&notice);
        }
    }

    fn notify_stack(&self) {
        if self.stack_listeners.is_empty() {
            return;
        }
        let notice = StackNotice {
            stack_size: self.undo_stack.len() + self.redo_stack.len(),
            index: self.undo_stack.len(),
        };
        for listener in &self.stack_listeners {
            listener(&notice);
        }
    }
}
