use serde_json::{Map, Value as JsonValue};

/// 经过校验的模型回答
///
/// 解析器按回答契约的顺序构造；分支索引由契约按字段名确定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationAnswer {
    categories: Vec<(String, bool)>,
    fallback: Option<bool>,
}

impl ClassificationAnswer {
    /// 由解析器在校验通过后构造
    pub fn new(categories: Vec<(String, bool)>, fallback: Option<bool>) -> Self {
        Self {
            categories,
            fallback,
        }
    }

    /// 按契约顺序遍历分类字段
    pub fn categories(&self) -> impl Iterator<Item = (&str, bool)> {
        self.categories.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.categories
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }

    /// 兜底字段；未声明时为 None
    pub fn fallback(&self) -> Option<bool> {
        self.fallback
    }

    /// 为真的字段数（含兜底字段）
    pub fn true_count(&self) -> usize {
        self.categories.iter().filter(|(_, v)| *v).count()
            + usize::from(self.fallback == Some(true))
    }

    /// 转回 JSON 对象（字段顺序不变）
    pub fn to_json(&self) -> Map<String, JsonValue> {
        let mut map = Map::new();
        for (name, value) in &self.categories {
            map.insert(name.clone(), JsonValue::Bool(*value));
        }
        if let Some(fallback) = self.fallback {
            map.insert("fallback".to_string(), JsonValue::Bool(fallback));
        }
        map
    }
}
