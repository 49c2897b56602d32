use thiserror::Error;

/// 应用程序错误类型
///
/// `Config` / `Validation` 会中止整个运行；`Classification` 只属于单个条目，
/// 是否中止由路由器的容错模式决定。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 条目校验错误（聚合模式下的分类来源条目）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 单个条目分类失败
    #[error("分类错误: {0}")]
    Classification(#[from] ClassificationError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 分类列表为空
    #[error("至少需要定义一个分类")]
    EmptyCategories,
    /// 分类名称为空
    #[error("第 {position} 个分类的名称为空")]
    EmptyCategoryName { position: usize },
    /// 分类名称重复（去除首尾空白后比较）
    #[error("分类名称重复: \"{name}\"")]
    DuplicateCategory { name: String },
    /// 分类名称与保留字段名冲突（`fallback`，聚合模式下的 `text`）
    #[error("分类名称 \"{name}\" 是保留字段名")]
    ReservedCategoryName { name: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 运行设置加载失败
    #[error("无法加载设置文件 {path}: {source}")]
    SettingsLoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 聚合模式下分类来源条目的校验错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 字段缺失或为空
    #[error("条目 {item_index} 缺少字段 \"{field}\"")]
    MissingField { item_index: usize, field: String },
    /// 字段类型错误
    #[error("条目 {item_index} 的字段 \"{field}\" 必须是字符串")]
    WrongType { item_index: usize, field: String },
}

/// 模型回答不满足回答契约
#[derive(Debug, Error)]
pub enum AnswerParseError {
    /// 回答中没有 JSON
    #[error("回答中没有找到 JSON: {raw}")]
    NoJsonFound { raw: String },
    /// JSON 语法错误
    #[error("回答不是合法的 JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    /// 顶层不是对象
    #[error("回答必须是 JSON 对象")]
    NotAnObject,
    /// 缺少契约字段
    #[error("回答缺少字段 \"{field}\"")]
    MissingField { field: String },
    /// 出现契约之外的字段
    #[error("回答包含未声明的字段 \"{field}\"")]
    UnexpectedField { field: String },
    /// 字段不是布尔值
    #[error("字段 \"{field}\" 必须是布尔值")]
    NotBoolean { field: String },
}

/// 单个条目分类失败的原因
#[derive(Debug, Error)]
pub enum ClassificationCause {
    /// 待分类文本未定义
    #[error("待分类文本未定义")]
    MissingText,
    /// 模型调用失败
    #[error("模型调用失败: {0}")]
    ModelCall(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// 回答解析失败（含修复后仍失败）
    #[error("回答解析失败: {0}")]
    AnswerParse(#[from] AnswerParseError),
}

/// 单个条目分类失败
#[derive(Debug, Error)]
#[error("条目 {item_index}: {cause}")]
pub struct ClassificationError {
    /// 来源条目索引
    pub item_index: usize,
    #[source]
    pub cause: ClassificationCause,
}

// ========== 便捷构造函数 ==========

impl ClassificationError {
    /// 待分类文本缺失
    pub fn missing_text(item_index: usize) -> Self {
        Self {
            item_index,
            cause: ClassificationCause::MissingText,
        }
    }

    /// 模型调用失败
    pub fn model_call(item_index: usize, source: anyhow::Error) -> Self {
        Self {
            item_index,
            cause: ClassificationCause::ModelCall(source.into()),
        }
    }

    /// 回答解析失败
    pub fn answer_parse(item_index: usize, source: AnswerParseError) -> Self {
        Self {
            item_index,
            cause: ClassificationCause::AnswerParse(source),
        }
    }
}

impl AppError {
    /// 出错的条目索引（如果有）
    pub fn item_index(&self) -> Option<usize> {
        match self {
            AppError::Config(_) => None,
            AppError::Validation(ValidationError::MissingField { item_index, .. })
            | AppError::Validation(ValidationError::WrongType { item_index, .. }) => {
                Some(*item_index)
            }
            AppError::Classification(e) => Some(e.item_index),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
