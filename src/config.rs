use crate::error::ConfigError;

/// 程序配置
///
/// 只包含宿主层需要的内容（模型连接、文件路径、日志）。
/// 分类相关的运行设置见 [`crate::models::ClassifierSettings`]。
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 采样温度，分类场景默认 0
    pub llm_temperature: f32,
    // --- 文件 ---
    /// 运行设置（TOML）
    pub settings_file: String,
    /// 输入条目（JSON 数组或 JSON Lines）
    pub items_file: String,
    /// 输出分支（JSON）
    pub output_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.0,
            settings_file: "classifier.toml".to_string(),
            items_file: "items.json".to_string(),
            output_file: "branches.json".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量读取配置，无法解析的值回退到默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            settings_file: std::env::var("SETTINGS_FILE").unwrap_or(default.settings_file),
            items_file: std::env::var("ITEMS_FILE").unwrap_or(default.items_file),
            output_file: std::env::var("OUTPUT_FILE").unwrap_or(default.output_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 严格版本：数值类变量无法解析时报错
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_env();
        if let Ok(value) = std::env::var("LLM_TEMPERATURE") {
            config.llm_temperature = parse_var("LLM_TEMPERATURE", &value, "f32")?;
        }
        if let Ok(value) = std::env::var("VERBOSE_LOGGING") {
            config.verbose_logging = parse_var("VERBOSE_LOGGING", &value, "bool")?;
        }
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    var_name: &str,
    value: &str,
    expected_type: &str,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::EnvVarParseFailed {
        var_name: var_name.to_string(),
        value: value.to_string(),
        expected_type: expected_type.to_string(),
    })
}
