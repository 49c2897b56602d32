use crate::error::ConfigError;
use crate::models::ClassifierSettings;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载运行设置
pub async fn load_settings(path: &Path) -> Result<ClassifierSettings, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| settings_error(path, e))?;

    let settings = parse_settings(&content).map_err(|e| settings_error(path, e))?;

    tracing::info!(
        "已加载设置: {} ({} 个静态分类)",
        path.file_name().unwrap_or_default().to_string_lossy(),
        settings.categories.len()
    );

    Ok(settings)
}

/// 解析 TOML 文本
pub fn parse_settings(content: &str) -> Result<ClassifierSettings, toml::de::Error> {
    toml::from_str(content)
}

fn settings_error(
    path: &Path,
    source: impl std::error::Error + Send + Sync + 'static,
) -> ConfigError {
    ConfigError::SettingsLoadFailed {
        path: path.display().to_string(),
        source: Box::new(source),
    }
}
