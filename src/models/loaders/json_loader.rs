use crate::models::InputItem;
use anyhow::{Context, Result};
use serde_json::Value as JsonValue;
use std::path::Path;
use tokio::fs;

/// 从文件加载输入条目
///
/// 支持 JSON 数组或 JSON Lines（每行一个 JSON 值，空行忽略）。
pub async fn load_items(path: &Path) -> Result<Vec<InputItem>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取条目文件: {}", path.display()))?;

    let values = parse_items(&content)
        .with_context(|| format!("无法解析条目文件: {}", path.display()))?;

    tracing::info!("成功加载 {} 个条目", values.len());

    Ok(InputItem::from_values(values))
}

/// 解析条目文本
pub fn parse_items(content: &str) -> Result<Vec<JsonValue>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        let values: Vec<JsonValue> = serde_json::from_str(trimmed)?;
        return Ok(values);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_no, line)| {
            serde_json::from_str::<JsonValue>(line).with_context(|| format!("第 {} 行不是合法的 JSON", line_no + 1))
        })
        .collect()
}
