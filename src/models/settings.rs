//! 运行设置
//!
//! 一次执行内只读。可以直接从 TOML 反序列化：
//!
//! ```toml
//! mode = "static"
//! text_field = "text"
//! continue_on_fail = true
//!
//! [[categories]]
//! name = "Bug"
//! description = "defect report"
//!
//! [options]
//! multi_class = false
//! fallback = "other"
//! ```

use serde::{Deserialize, Serialize};

use super::category::Category;

/// 默认系统提示词模板
pub const DEFAULT_SYSTEM_PROMPT_TEMPLATE: &str = "Please classify the text provided by the user into one of the following categories: {categories}, and use the provided formatting instructions below. Don't explain, and only output the json.";

/// 没有分类命中时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// 丢弃条目
    #[default]
    Discard,
    /// 放入额外的 "Other" 分支
    Other,
}

impl FallbackPolicy {
    /// 额外增加的输出分支数
    pub fn extra_branches(self) -> usize {
        match self {
            FallbackPolicy::Discard => 0,
            FallbackPolicy::Other => 1,
        }
    }
}

/// 分类来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryMode {
    /// 分类来自设置，逐条目分类
    #[default]
    Static,
    /// 分类来自输入条目，整体只分类一次
    FromItems,
}

/// 分类策略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationOptions {
    /// 是否允许多个分类同时为真
    pub multi_class: bool,
    pub fallback: FallbackPolicy,
    /// 系统提示词模板，`{categories}` 会被替换为分类名称列表
    pub system_prompt_template: String,
    /// 回答不合法时是否让模型修复一次
    pub enable_auto_fixing: bool,
}

impl Default for ClassificationOptions {
    fn default() -> Self {
        Self {
            multi_class: false,
            fallback: FallbackPolicy::Discard,
            system_prompt_template: DEFAULT_SYSTEM_PROMPT_TEMPLATE.to_string(),
            enable_auto_fixing: true,
        }
    }
}

/// 一次执行的全部设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub mode: CategoryMode,
    /// 静态模式下的分类
    pub categories: Vec<Category>,
    /// 条目中待分类文本所在的字段
    pub text_field: String,
    /// 聚合模式下的待分类文本；未设置时取第一个条目的 `text_field`
    pub input_text: Option<String>,
    /// 容错模式：单条目失败时输出错误记录而不是中止
    pub continue_on_fail: bool,
    pub options: ClassificationOptions,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            mode: CategoryMode::Static,
            categories: Vec::new(),
            text_field: "text".to_string(),
            input_text: None,
            continue_on_fail: false,
            options: ClassificationOptions::default(),
        }
    }
}

impl ClassifierSettings {
    /// 静态模式设置
    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            categories,
            ..Default::default()
        }
    }
}
