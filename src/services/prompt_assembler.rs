//! 分类提示词组装 - 业务能力层
//!
//! 每次执行组装一次 [`Instruction`]，分类名称列表和待分类文本在每次调用时再绑定。

use crate::models::{CategorySet, FallbackPolicy};
use crate::services::llm_service::ChatMessage;

/// 分类名称列表占位符
pub const CATEGORIES_PLACEHOLDER: &str = "{categories}";
/// 格式说明占位符
pub const FORMAT_INSTRUCTIONS_PLACEHOLDER: &str = "{format_instructions}";

/// 互斥性说明
pub fn exclusivity_phrase(multi_class: bool) -> &'static str {
    if multi_class {
        "Categories are not mutually exclusive, and multiple can be true"
    } else {
        "Categories are mutually exclusive, and only one can be true"
    }
}

/// 兜底说明
pub fn fallback_phrase(fallback: FallbackPolicy) -> &'static str {
    match fallback {
        FallbackPolicy::Other => "If no categories apply, select the \"fallback\" option.",
        FallbackPolicy::Discard => {
            "If there is not a very fitting category, select none of the categories."
        }
    }
}

/// 组装好的分类指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// 系统提示词模板，保留两个占位符
    template: String,
    format_instructions: String,
    category_names: String,
}

impl Instruction {
    /// 组装指令
    ///
    /// 顺序：模板、格式说明占位、互斥性说明、兜底说明，以换行分隔。
    pub fn assemble(
        template: &str,
        categories: &CategorySet,
        multi_class: bool,
        fallback: FallbackPolicy,
        format_instructions: &str,
    ) -> Self {
        let template = format!(
            "{}\n{}\n{}\n{}",
            template,
            FORMAT_INSTRUCTIONS_PLACEHOLDER,
            exclusivity_phrase(multi_class),
            fallback_phrase(fallback)
        );

        Self {
            template,
            format_instructions: format_instructions.to_string(),
            category_names: categories.joined_names(),
        }
    }

    /// 渲染系统提示词
    ///
    /// 两个占位符在同一次扫描中替换，替换进来的内容不会被再次展开。
    pub fn system_prompt(&self) -> String {
        substitute(
            &self.template,
            &[
                (CATEGORIES_PLACEHOLDER, self.category_names.as_str()),
                (FORMAT_INSTRUCTIONS_PLACEHOLDER, self.format_instructions.as_str()),
            ],
        )
    }

    /// 绑定单个条目的文本，得到发给模型的消息
    pub fn render(&self, input_text: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(input_text),
        ]
    }
}

/// 从左到右扫描模板，遇到任一占位符即替换为对应的值
fn substitute(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let next = pairs
            .iter()
            .filter_map(|(placeholder, value)| {
                rest.find(placeholder).map(|at| (at, *placeholder, *value))
            })
            .min_by_key(|(at, _, _)| *at);

        match next {
            Some((at, placeholder, value)) => {
                output.push_str(&rest[..at]);
                output.push_str(value);
                rest = &rest[at + placeholder.len()..];
            }
            None => {
                output.push_str(rest);
                return output;
            }
        }
    }
}
