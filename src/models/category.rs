use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ConfigError;

/// 单个分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// 分类名称，同时作为回答字段名和输出分支标签
    pub name: String,
    /// 给模型看的分类描述
    #[serde(default)]
    pub description: String,
}

impl Category {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// 有序、非空、名称唯一的分类集合
///
/// 顺序决定输出分支的索引。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    categories: Vec<Category>,
}

impl CategorySet {
    /// 构建分类集合
    ///
    /// 名称去除首尾空白后必须非空且互不相同，保存的是去除空白后的名称。
    pub fn new(categories: Vec<Category>) -> Result<Self, ConfigError> {
        if categories.is_empty() {
            return Err(ConfigError::EmptyCategories);
        }

        let mut seen = HashSet::with_capacity(categories.len());
        let mut normalized = Vec::with_capacity(categories.len());
        for (position, category) in categories.into_iter().enumerate() {
            let name = normalize_name(&category.name).to_string();
            if name.is_empty() {
                return Err(ConfigError::EmptyCategoryName { position });
            }
            if !seen.insert(name.clone()) {
                return Err(ConfigError::DuplicateCategory { name });
            }
            normalized.push(Category {
                name,
                description: category.description,
            });
        }

        Ok(Self {
            categories: normalized,
        })
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// 构造保证非空，恒为 false
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.categories.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// 逗号拼接的分类名称（按集合顺序）
    pub fn joined_names(&self) -> String {
        self.names().join(", ")
    }
}

impl<'a> IntoIterator for &'a CategorySet {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

/// 分类名称的规范化形式（用于判重）
pub fn normalize_name(name: &str) -> &str {
    name.trim()
}
