//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次执行的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 宿主应用
//! - 读取设置（TOML）和条目（JSON）
//! - 持有模型客户端（LlmService）
//! - 写出输出分支、输出全局统计
//!
//! ### `router` - 分类路由器
//! - 每次执行解析一次分类、构建一次契约和指令
//! - 逐条目调用 ClassifyFlow（严格顺序，不并发）
//! - 按回答分发条目，按容错模式处理单条目失败
//!
//! ## 层次关系
//!
//! ```text
//! app (读文件 / 写文件)
//!     ↓
//! router (处理 Vec<InputItem>)
//!     ↓
//! workflow::ClassifyFlow (处理单个条目)
//!     ↓
//! services (能力层：category_source / schema / prompt / parser / llm)
//! ```

pub mod app;
pub mod router;

// 重新导出主要类型
pub use app::App;
pub use router::{assign_branches, RouteOutcome, RouteStats, Router};
