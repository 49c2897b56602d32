//! 结构化回答解析 - 业务能力层
//!
//! 三个能力：
//! - `format_instructions`：嵌入提示词的格式说明（含 JSON Schema）
//! - `parse`：从模型原始文本中取出 JSON 并按契约校验
//! - `repair`：把失败的回答和错误交给模型修复一次

use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::error::{AnswerParseError, ClassificationCause};
use crate::models::ClassificationAnswer;
use crate::services::llm_service::{ChatMessage, LanguageModel};
use crate::services::schema_builder::AnswerContract;

/// 结构化回答解析器
///
/// 每次执行构建一次，所有条目共用。
#[derive(Debug, Clone)]
pub struct AnswerParser {
    contract: AnswerContract,
    format_instructions: String,
}

impl AnswerParser {
    pub fn new(contract: AnswerContract) -> Self {
        let format_instructions = render_format_instructions(&contract);
        Self {
            contract,
            format_instructions,
        }
    }

    pub fn contract(&self) -> &AnswerContract {
        &self.contract
    }

    /// 嵌入提示词的格式说明
    pub fn format_instructions(&self) -> &str {
        &self.format_instructions
    }

    /// 解析并校验模型回答
    pub fn parse(&self, raw: &str) -> Result<ClassificationAnswer, AnswerParseError> {
        let json_text = extract_json(raw).ok_or_else(|| AnswerParseError::NoJsonFound {
            raw: raw.to_string(),
        })?;

        let value: JsonValue = serde_json::from_str(json_text)
            .map_err(|source| AnswerParseError::InvalidJson { source })?;

        let object = value.as_object().ok_or(AnswerParseError::NotAnObject)?;

        // 契约之外的字段一律拒绝
        if let Some(unexpected) = object.keys().find(|key| !self.contract.declares(key)) {
            return Err(AnswerParseError::UnexpectedField {
                field: unexpected.clone(),
            });
        }

        let read_bool = |name: &str| -> Result<bool, AnswerParseError> {
            match object.get(name) {
                None => Err(AnswerParseError::MissingField {
                    field: name.to_string(),
                }),
                Some(JsonValue::Bool(value)) => Ok(*value),
                Some(_) => Err(AnswerParseError::NotBoolean {
                    field: name.to_string(),
                }),
            }
        };

        let mut categories = Vec::with_capacity(self.contract.category_fields().len());
        for field in self.contract.category_fields() {
            categories.push((field.name.clone(), read_bool(&field.name)?));
        }

        let fallback = match self.contract.fallback_field() {
            Some(field) => Some(read_bool(&field.name)?),
            None => None,
        };

        Ok(ClassificationAnswer::new(categories, fallback))
    }

    /// 修复一次：把格式说明、失败的回答和错误交给模型，再解析一次
    pub async fn repair(
        &self,
        raw: &str,
        error: &AnswerParseError,
        model: &dyn LanguageModel,
    ) -> Result<ClassificationAnswer, ClassificationCause> {
        warn!("回答不满足契约，尝试修复: {}", error);

        let prompt = self.repair_prompt(raw, error);
        let repaired = model
            .invoke(&[ChatMessage::user(prompt)])
            .await
            .map_err(|e| ClassificationCause::ModelCall(e.into()))?;

        debug!("修复后的回答长度: {} 字符", repaired.len());

        Ok(self.parse(&repaired)?)
    }

    fn repair_prompt(&self, raw: &str, error: &AnswerParseError) -> String {
        format!(
            r#"Instructions:
--------------
{}
--------------
Completion:
--------------
{}
--------------

The completion above does not satisfy the instructions.
Error:
--------------
{}
--------------

Try again. Respond only with an answer that satisfies the instructions."#,
            self.format_instructions, raw, error
        )
    }
}

/// 格式说明文本
fn render_format_instructions(contract: &AnswerContract) -> String {
    let schema = serde_json::to_string(&contract.json_schema()).unwrap_or_default();
    format!(
        r#"Respond with a single JSON object that conforms to the JSON Schema below.
Every property is a boolean and every property is required. Do not add properties that are not in the schema, and do not add trailing commas.

Wrap the JSON object in a markdown code block:
```json
{}
```"#,
        schema
    )
}

fn fenced_json_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\s*(.*?)```").expect("valid fenced json regex"))
}

fn fenced_any_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("valid fenced block regex"))
}

/// 从模型输出中取出 JSON 文本
///
/// 优先 ```json 代码块，其次任意代码块，最后是最外层的 `{ ... }`。
fn extract_json(output: &str) -> Option<&str> {
    for re in [fenced_json_re(), fenced_any_re()] {
        if let Some(body) = re.captures(output).and_then(|c| c.get(1)) {
            let body = body.as_str().trim();
            if !body.is_empty() {
                return Some(body);
            }
        }
    }

    let start = output.find('{')?;
    let end = output.rfind('}')?;
    (start < end).then(|| &output[start..=end])
}
