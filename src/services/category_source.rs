//! 分类来源 - 业务能力层
//!
//! 静态模式直接使用设置中的分类；聚合模式从每个输入条目的
//! `category` / `description` 字段各取出一个分类。

use serde_json::Value as JsonValue;

use crate::error::{AppResult, ValidationError};
use crate::models::{Category, CategoryMode, CategorySet, InputItem};

/// 聚合模式下的分类名称字段
pub const CATEGORY_FIELD: &str = "category";
/// 聚合模式下的分类描述字段
pub const DESCRIPTION_FIELD: &str = "description";

/// 解析本次执行的分类集合
pub fn resolve(
    mode: CategoryMode,
    items: &[InputItem],
    static_categories: &[Category],
) -> AppResult<CategorySet> {
    let categories = match mode {
        CategoryMode::Static => static_categories.to_vec(),
        CategoryMode::FromItems => items
            .iter()
            .map(category_from_item)
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(CategorySet::new(categories)?)
}

fn category_from_item(item: &InputItem) -> Result<Category, ValidationError> {
    Ok(Category {
        name: required_string(item, CATEGORY_FIELD)?,
        description: required_string(item, DESCRIPTION_FIELD)?,
    })
}

fn required_string(item: &InputItem, field: &str) -> Result<String, ValidationError> {
    match item.json.get(field) {
        None | Some(JsonValue::Null) => Err(ValidationError::MissingField {
            item_index: item.index,
            field: field.to_string(),
        }),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Err(ValidationError::MissingField {
            item_index: item.index,
            field: field.to_string(),
        }),
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::WrongType {
            item_index: item.index,
            field: field.to_string(),
        }),
    }
}
