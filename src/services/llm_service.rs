//! LLM 服务 - 业务能力层
//!
//! 只负责"把消息发给模型并拿回文本"，不关心分类、契约和路由
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

/// 发给模型的一条消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// 语言模型
///
/// 分类核心只依赖这个 trait；测试里用脚本化的桩实现。
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// 发送一轮对话，返回模型的原始文本回答
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// LLM 服务
///
/// 职责：
/// - 调用兼容 OpenAI 的 Chat Completion 接口
/// - 不解析回答内容
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
        }
    }

    /// 转换为 async-openai 的请求消息
    fn build_messages(messages: &[ChatMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut request_messages = Vec::with_capacity(messages.len());

        for message in messages {
            let request_message = match message.role {
                Role::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(message.content.as_str())
                        .build()?,
                ),
                Role::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(message.content.as_str())
                        .build()?,
                ),
            };
            request_messages.push(request_message);
        }

        Ok(request_messages)
    }
}

#[async_trait]
impl LanguageModel for LlmService {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!(
            "消息数: {}, 总长度: {} 字符",
            messages.len(),
            messages.iter().map(|m| m.content.len()).sum::<usize>()
        );

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(Self::build_messages(messages)?)
            .temperature(self.temperature)
            .max_tokens(1024u32)
            .build()?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}
