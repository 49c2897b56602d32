//! 条目处理上下文
//!
//! 封装"我正在处理第几个条目"这一信息

use std::fmt::Display;

/// 条目处理上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCtx {
    /// 来源条目索引（从 0 开始，与 paired item 一致）
    pub item_index: usize,

    /// 本次执行的条目总数（仅用于日志显示）
    pub total: usize,
}

impl ItemCtx {
    /// 创建新的条目上下文
    pub fn new(item_index: usize, total: usize) -> Self {
        Self { item_index, total }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[条目 {}/{}]", self.item_index + 1, self.total)
    }
}
