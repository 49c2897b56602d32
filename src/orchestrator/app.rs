//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 本模块是宿主：负责加载设置和条目、持有模型客户端、
//! 调用路由器并把输出分支写入文件。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：读取设置、声明输出分支、创建 LlmService
//! 2. **加载条目**：JSON 数组或 JSON Lines
//! 3. **执行路由**：委托 `Router`
//! 4. **写出结果**：按分支标签写 JSON
//! 5. **全局统计**：输出路由/未命中/失败数量

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::warn;

use crate::config::Config;
use crate::models::{load_items, load_settings, ClassifierSettings, OutputBranches, OutputItem, OutputLayout};
use crate::orchestrator::router::{RouteOutcome, Router};
use crate::services::LlmService;
use crate::utils::logging::{log_layout, log_run_complete, log_startup};

/// 应用主结构
pub struct App {
    config: Config,
    settings: ClassifierSettings,
    layout: OutputLayout,
    llm_service: LlmService,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config.llm_model_name, &config.settings_file);

        let settings = load_settings(Path::new(&config.settings_file)).await?;

        // 输出分支只依赖设置，处理任何条目前即可确定
        let layout = OutputLayout::from_settings(&settings);
        log_layout(&layout.labels);

        let llm_service = LlmService::new(&config);

        Ok(Self {
            config,
            settings,
            layout,
            llm_service,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RouteOutcome> {
        let items = load_items(Path::new(&self.config.items_file)).await?;

        if items.is_empty() {
            warn!("⚠️ 没有找到待分类的条目");
        }

        let outcome = Router::new(&self.llm_service, &self.settings)
            .execute_with_stats(&items)
            .await?;

        self.write_output(&outcome.branches).await?;

        log_run_complete(
            outcome.stats.routed,
            outcome.stats.unmatched,
            outcome.stats.failed,
            &self.config.output_file,
        );

        Ok(outcome)
    }

    /// 写出输出分支
    async fn write_output(&self, branches: &OutputBranches) -> Result<()> {
        let content = render_output(&self.layout, branches)?;
        tokio::fs::write(&self.config.output_file, content)
            .await
            .with_context(|| format!("无法写入输出文件: {}", self.config.output_file))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct BranchReport<'a> {
    label: &'a str,
    items: &'a [OutputItem],
}

#[derive(Serialize)]
struct OutputReport<'a> {
    branches: Vec<BranchReport<'a>>,
}

/// 渲染输出 JSON
///
/// 分支数与声明不一致时按索引补标签。
pub fn render_output(layout: &OutputLayout, branches: &OutputBranches) -> Result<String> {
    let fallback_labels: Vec<String> = (0..branches.len()).map(|i| format!("branch_{}", i)).collect();

    let report = OutputReport {
        branches: branches
            .iter()
            .enumerate()
            .map(|(i, items)| BranchReport {
                label: layout
                    .labels
                    .get(i)
                    .map(String::as_str)
                    .unwrap_or(fallback_labels[i].as_str()),
                items,
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}
