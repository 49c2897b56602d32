use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use super::settings::{CategoryMode, ClassifierSettings, FallbackPolicy};

/// 输入条目
///
/// `json` 对路由器是不透明的，只读取待分类文本字段。
#[derive(Debug, Clone, PartialEq)]
pub struct InputItem {
    /// 来源索引（paired item）
    pub index: usize,
    pub json: JsonValue,
}

impl InputItem {
    pub fn new(index: usize, json: JsonValue) -> Self {
        Self { index, json }
    }

    /// 按输入顺序编号
    pub fn from_values(values: Vec<JsonValue>) -> Vec<Self> {
        values
            .into_iter()
            .enumerate()
            .map(|(index, json)| Self::new(index, json))
            .collect()
    }

    /// 读取字符串字段；缺失、为 null 或不是字符串时返回 None
    pub fn text(&self, field: &str) -> Option<&str> {
        self.json.get(field).and_then(|v| v.as_str())
    }
}

/// 输出条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputItem {
    pub json: JsonValue,
    /// 来源条目索引
    pub paired_item: usize,
}

impl OutputItem {
    /// 原样转发的条目
    pub fn routed(item: &InputItem) -> Self {
        Self {
            json: item.json.clone(),
            paired_item: item.index,
        }
    }

    /// 错误记录
    pub fn error(message: impl Into<String>, paired_item: usize) -> Self {
        Self {
            json: json!({ "error": message.into() }),
            paired_item,
        }
    }

    pub fn is_error(&self) -> bool {
        self.json.get("error").is_some()
    }
}

/// 单个条目被分配到的分支索引
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchAssignment {
    pub branches: Vec<usize>,
}

impl BranchAssignment {
    /// 没有命中任何分支
    pub fn is_unmatched(&self) -> bool {
        self.branches.is_empty()
    }
}

/// 输出分支（每个分支一个条目列表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputBranches {
    branches: Vec<Vec<OutputItem>>,
}

impl OutputBranches {
    pub fn new(count: usize) -> Self {
        Self {
            branches: vec![Vec::new(); count],
        }
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn push(&mut self, branch: usize, item: OutputItem) {
        self.branches[branch].push(item);
    }

    pub fn branch(&self, index: usize) -> &[OutputItem] {
        &self.branches[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<OutputItem>> {
        self.branches.iter()
    }

    /// 所有分支上的条目总数
    pub fn total_items(&self) -> usize {
        self.branches.iter().map(Vec::len).sum()
    }

    /// 某个分支上的来源索引
    pub fn paired_items(&self, index: usize) -> Vec<usize> {
        self.branches[index].iter().map(|i| i.paired_item).collect()
    }
}

/// 输出分支声明
///
/// 只依赖设置即可计算，宿主在处理任何条目前据此连线。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub labels: Vec<String>,
}

impl OutputLayout {
    pub const FALLBACK_LABEL: &'static str = "Other";
    pub const AGGREGATE_LABEL: &'static str = "Output";

    pub fn from_settings(settings: &ClassifierSettings) -> Self {
        let labels = match settings.mode {
            CategoryMode::FromItems => vec![Self::AGGREGATE_LABEL.to_string()],
            CategoryMode::Static => {
                let mut labels: Vec<String> =
                    settings.categories.iter().map(|c| c.name.trim().to_string()).collect();
                if settings.options.fallback == FallbackPolicy::Other {
                    labels.push(Self::FALLBACK_LABEL.to_string());
                }
                labels
            }
        };
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
