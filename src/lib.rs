//! # Text Classifier
//!
//! 用语言模型把自由文本分到调用方定义的分类，并把每个条目分发到对应的输出分支
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 分类、设置、输入输出条目、模型回答
//! - `loaders` - 从 TOML 读设置、从 JSON 读条目
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力只做一件事
//! - `category_source` - 解析分类集合（静态 / 来自条目）
//! - `schema_builder` - 构建回答契约（每个分类一个布尔字段）
//! - `prompt_assembler` - 组装分类指令
//! - `answer_parser` - 解析、校验、修复模型回答
//! - `LlmService` - 调用兼容 OpenAI 的模型
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个条目"的分类流程
//! - `ItemCtx` - 上下文封装（条目索引）
//! - `ClassifyFlow` - 渲染 → 调用模型 → 解析 →（可选）修复
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/router` - 一次执行的分类与分发、单条目失败隔离
//! - `orchestrator/app` - 宿主应用，读写文件
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ClassificationError};
pub use models::{
    Category, CategoryMode, CategorySet, ClassificationAnswer, ClassifierSettings, FallbackPolicy,
    InputItem, OutputBranches, OutputItem, OutputLayout,
};
pub use orchestrator::{App, RouteOutcome, RouteStats, Router};
pub use services::{ChatMessage, LanguageModel, LlmService};
pub use workflow::{ClassifyFlow, ItemCtx};
