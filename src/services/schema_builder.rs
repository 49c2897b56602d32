//! 回答契约构建 - 业务能力层
//!
//! 每次执行开始时根据分类集合构建一次：每个分类一个必填布尔字段，
//! 兜底策略为 `other` 时再加一个 `fallback` 字段。

use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;

use crate::error::ConfigError;
use crate::models::category::normalize_name;
use crate::models::{CategorySet, FallbackPolicy};

/// 兜底字段名
pub const FALLBACK_FIELD: &str = "fallback";

/// 回答契约中的一个字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerField {
    pub name: String,
    pub description: String,
}

/// 回答契约
///
/// `fields` 记录声明顺序（即分支顺序），`index` 是名称到位置的旁表。
#[derive(Debug, Clone)]
pub struct AnswerContract {
    fields: Vec<AnswerField>,
    index: HashMap<String, usize>,
    fallback: Option<AnswerField>,
}

impl AnswerContract {
    /// 按分类集合构建契约
    pub fn build(categories: &CategorySet, fallback: FallbackPolicy) -> Result<Self, ConfigError> {
        let mut fields = Vec::with_capacity(categories.len());
        let mut index = HashMap::with_capacity(categories.len());

        for (position, category) in categories.iter().enumerate() {
            let key = normalize_name(&category.name).to_string();
            if index.insert(key.clone(), position).is_some() {
                return Err(ConfigError::DuplicateCategory { name: key });
            }
            fields.push(AnswerField {
                name: category.name.clone(),
                description: format!(
                    "true if the input matches category \"{}\", described as \"{}\"",
                    category.name, category.description
                ),
            });
        }

        let fallback = match fallback {
            FallbackPolicy::Discard => None,
            FallbackPolicy::Other => {
                if index.contains_key(FALLBACK_FIELD) {
                    return Err(ConfigError::ReservedCategoryName {
                        name: FALLBACK_FIELD.to_string(),
                    });
                }
                Some(AnswerField {
                    name: FALLBACK_FIELD.to_string(),
                    description: "true if none of the other categories apply".to_string(),
                })
            }
        };

        Ok(Self {
            fields,
            index,
            fallback,
        })
    }

    /// 分类字段（不含兜底字段），按声明顺序
    pub fn category_fields(&self) -> &[AnswerField] {
        &self.fields
    }

    pub fn fallback_field(&self) -> Option<&AnswerField> {
        self.fallback.as_ref()
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// 字段总数（含兜底字段）
    pub fn field_count(&self) -> usize {
        self.fields.len() + usize::from(self.fallback.is_some())
    }

    /// 分类字段对应的分支索引
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(normalize_name(name)).copied()
    }

    /// 是否为契约声明的字段名
    pub fn declares(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
            || self.fallback.as_ref().is_some_and(|f| f.name == name)
    }

    /// 所有字段（含兜底字段），按声明顺序
    pub fn all_fields(&self) -> impl Iterator<Item = &AnswerField> {
        self.fields.iter().chain(self.fallback.iter())
    }

    /// 渲染为 JSON Schema
    pub fn json_schema(&self) -> JsonValue {
        let mut properties = Map::new();
        for field in self.all_fields() {
            properties.insert(
                field.name.clone(),
                json!({ "type": "boolean", "description": field.description }),
            );
        }
        let required: Vec<&str> = self.all_fields().map(|f| f.name.as_str()).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
            "$schema": "http://json-schema.org/draft-07/schema#"
        })
    }
}
