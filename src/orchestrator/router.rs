//! 分类路由器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责一次完整执行：解析分类、构建契约和指令（各一次），
//! 然后逐条目分类并把条目分发到输出分支。
//!
//! ## 两种模式
//!
//! 1. **静态模式**：每个条目单独分类，按回答中为真的字段分发，
//!    兜底策略为 `other` 时多一个末尾分支
//! 2. **聚合模式**：分类来自条目本身，只分类一次，输出一个分支
//!
//! ## 失败隔离
//!
//! 单条目的结果是 `Result<BranchAssignment, ClassificationError>`，
//! 由容错模式决定是输出错误记录还是中止整次执行。

use serde_json::Value as JsonValue;
use tracing::{error, info, warn};

use crate::error::{AppResult, ClassificationError, ConfigError};
use crate::models::{
    BranchAssignment, CategoryMode, ClassificationAnswer, ClassifierSettings, InputItem,
    OutputBranches, OutputItem,
};
use crate::services::{category_source, AnswerContract, AnswerParser, Instruction, LanguageModel};
use crate::workflow::{ClassifyFlow, ItemCtx};

/// 聚合模式输出中存放输入文本的字段名
pub const AGGREGATE_TEXT_FIELD: &str = "text";

/// 路由统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouteStats {
    /// 命中至少一个分支
    pub routed: usize,
    /// 没有命中任何分支
    pub unmatched: usize,
    /// 输出为错误记录
    pub failed: usize,
}

/// 一次执行的结果
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub branches: OutputBranches,
    pub stats: RouteStats,
}

/// 分类路由器
pub struct Router<'a> {
    model: &'a dyn LanguageModel,
    settings: &'a ClassifierSettings,
}

impl<'a> Router<'a> {
    pub fn new(model: &'a dyn LanguageModel, settings: &'a ClassifierSettings) -> Self {
        Self { model, settings }
    }

    /// 执行分类并返回输出分支
    pub async fn execute(&self, items: &[InputItem]) -> AppResult<OutputBranches> {
        Ok(self.execute_with_stats(items).await?.branches)
    }

    /// 执行分类，同时返回统计信息
    pub async fn execute_with_stats(&self, items: &[InputItem]) -> AppResult<RouteOutcome> {
        let settings = self.settings;
        let options = &settings.options;

        // ========== 执行级准备（只做一次） ==========
        let categories = category_source::resolve(settings.mode, items, &settings.categories)?;
        if settings.mode == CategoryMode::FromItems
            && categories.names().contains(&AGGREGATE_TEXT_FIELD)
        {
            return Err(ConfigError::ReservedCategoryName {
                name: AGGREGATE_TEXT_FIELD.to_string(),
            }
            .into());
        }
        let contract = AnswerContract::build(&categories, options.fallback)?;
        let parser = AnswerParser::new(contract);
        let instruction = Instruction::assemble(
            &options.system_prompt_template,
            &categories,
            options.multi_class,
            options.fallback,
            parser.format_instructions(),
        );

        info!(
            "🏷️ 分类: {} (多选: {}, 兜底: {:?})",
            categories.joined_names(),
            options.multi_class,
            options.fallback
        );

        let flow = ClassifyFlow::new(
            self.model,
            &instruction,
            &parser,
            options.enable_auto_fixing,
        );

        let outcome = match settings.mode {
            CategoryMode::Static => self.route_items(&flow, parser.contract(), items).await?,
            CategoryMode::FromItems => self.classify_aggregate(&flow, items).await,
        };

        info!(
            "✓ 路由完成: 已路由 {}, 未命中 {}, 失败 {}",
            outcome.stats.routed, outcome.stats.unmatched, outcome.stats.failed
        );

        Ok(outcome)
    }

    /// 静态模式：逐条目分类并分发
    async fn route_items(
        &self,
        flow: &ClassifyFlow<'_>,
        contract: &AnswerContract,
        items: &[InputItem],
    ) -> AppResult<RouteOutcome> {
        let branch_count =
            contract.category_fields().len() + self.settings.options.fallback.extra_branches();
        let mut branches = OutputBranches::new(branch_count);
        let mut stats = RouteStats::default();

        for item in items {
            let ctx = ItemCtx::new(item.index, items.len());

            match self.classify_item(flow, contract, item, &ctx).await {
                Ok(assignment) => {
                    if assignment.is_unmatched() {
                        info!("{} 未命中任何分类", ctx);
                        stats.unmatched += 1;
                    } else {
                        info!("{} ✓ 分发到分支 {:?}", ctx, assignment.branches);
                        stats.routed += 1;
                    }
                    for branch in assignment.branches {
                        branches.push(branch, OutputItem::routed(item));
                    }
                }
                Err(e) if self.settings.continue_on_fail => {
                    warn!("{} ⚠️ 分类失败，输出错误记录: {}", ctx, e);
                    branches.push(0, OutputItem::error(e.to_string(), item.index));
                    stats.failed += 1;
                }
                Err(e) => {
                    error!("{} ❌ 分类失败，中止执行: {}", ctx, e);
                    return Err(e.into());
                }
            }
        }

        Ok(RouteOutcome { branches, stats })
    }

    /// 分类单个条目，得到分支分配
    async fn classify_item(
        &self,
        flow: &ClassifyFlow<'_>,
        contract: &AnswerContract,
        item: &InputItem,
        ctx: &ItemCtx,
    ) -> Result<BranchAssignment, ClassificationError> {
        let text = item
            .text(&self.settings.text_field)
            .ok_or_else(|| ClassificationError::missing_text(item.index))?;

        let answer = flow.run(ctx, text).await?;

        Ok(assign_branches(&answer, contract))
    }

    /// 聚合模式：只分类一次，失败也不中止
    async fn classify_aggregate(
        &self,
        flow: &ClassifyFlow<'_>,
        items: &[InputItem],
    ) -> RouteOutcome {
        let mut branches = OutputBranches::new(1);
        let mut stats = RouteStats::default();
        let ctx = ItemCtx::new(0, 1);

        let input_text = self
            .settings
            .input_text
            .as_deref()
            .or_else(|| items.first().and_then(|i| i.text(&self.settings.text_field)));

        let result = match input_text {
            Some(text) => flow.run(&ctx, text).await.map(|answer| (answer, text)),
            None => Err(ClassificationError::missing_text(0)),
        };

        match result {
            Ok((answer, text)) => {
                branches.push(0, OutputItem {
                    json: merge_answer(&answer, text),
                    paired_item: 0,
                });
                stats.routed += 1;
            }
            Err(e) => {
                warn!("{} ⚠️ 聚合分类失败，输出错误记录: {}", ctx, e);
                branches.push(0, OutputItem::error(e.to_string(), e.item_index));
                stats.failed += 1;
            }
        }

        RouteOutcome { branches, stats }
    }
}

/// 回答中为真的字段 → 分支索引
///
/// 分支索引按字段名查契约的旁表，与回答中的字段顺序无关；契约未声明的字段被忽略。
/// 不强制互斥：单选模式下模型给出多个真值时，条目会进入每个对应分支。
pub fn assign_branches(answer: &ClassificationAnswer, contract: &AnswerContract) -> BranchAssignment {
    let mut branches: Vec<usize> = answer
        .categories()
        .filter(|(_, value)| *value)
        .filter_map(|(name, _)| contract.position(name))
        .collect();
    branches.sort_unstable();
    branches.dedup();

    if contract.has_fallback() && answer.fallback() == Some(true) {
        branches.push(contract.category_fields().len());
    }

    BranchAssignment { branches }
}

/// 聚合模式的输出：回答字段 + 原始文本
fn merge_answer(answer: &ClassificationAnswer, text: &str) -> JsonValue {
    let mut map = answer.to_json();
    map.insert(AGGREGATE_TEXT_FIELD.to_string(), JsonValue::String(text.to_string()));
    JsonValue::Object(map)
}
