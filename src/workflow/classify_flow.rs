//! 单条目分类流程 - 流程层
//!
//! 核心职责：定义"一个条目"的分类流程
//!
//! 流程顺序：
//! 1. 用条目文本渲染指令
//! 2. 调用模型（每个条目恰好一次）
//! 3. 按契约解析回答
//! 4. 解析失败且开启自动修复 → 再调用一次模型修复，仍失败则报错

use tracing::{debug, info, warn};

use crate::error::ClassificationError;
use crate::models::ClassificationAnswer;
use crate::services::{AnswerParser, Instruction, LanguageModel};
use crate::utils::logging::truncate_text;
use crate::workflow::item_ctx::ItemCtx;

/// 单条目分类流程
///
/// - 不持有任何执行级状态以外的资源
/// - 指令和解析器在执行开始时构建，这里只读
/// - 不重新解析分类、不重新组装指令
pub struct ClassifyFlow<'a> {
    model: &'a dyn LanguageModel,
    instruction: &'a Instruction,
    parser: &'a AnswerParser,
    auto_fix: bool,
}

impl<'a> ClassifyFlow<'a> {
    /// 创建新的分类流程
    pub fn new(
        model: &'a dyn LanguageModel,
        instruction: &'a Instruction,
        parser: &'a AnswerParser,
        auto_fix: bool,
    ) -> Self {
        Self {
            model,
            instruction,
            parser,
            auto_fix,
        }
    }

    /// 分类单个条目
    pub async fn run(
        &self,
        ctx: &ItemCtx,
        input_text: &str,
    ) -> Result<ClassificationAnswer, ClassificationError> {
        info!("{} 文本: {}", ctx, truncate_text(input_text, 80));

        let messages = self.instruction.render(input_text);

        let raw = self
            .model
            .invoke(&messages)
            .await
            .map_err(|e| ClassificationError::model_call(ctx.item_index, e))?;

        debug!("{} 模型回答: {}", ctx, truncate_text(&raw, 200));

        match self.parser.parse(&raw) {
            Ok(answer) => Ok(answer),
            Err(parse_error) if self.auto_fix => {
                warn!("{} ⚠️ 回答不合法，自动修复中: {}", ctx, parse_error);
                self.parser
                    .repair(&raw, &parse_error, self.model)
                    .await
                    .map_err(|cause| ClassificationError {
                        item_index: ctx.item_index,
                        cause,
                    })
            }
            Err(parse_error) => Err(ClassificationError::answer_parse(ctx.item_index, parse_error)),
        }
    }
}
