/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 `info`，`verbose` 时为 `debug`。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `model_name`: 模型名称
/// - `settings_file`: 设置文件路径
pub fn log_startup(model_name: &str, settings_file: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 文本分类路由");
    info!("🤖 模型: {}", model_name);
    info!("📄 设置文件: {}", settings_file);
    info!("{}", "=".repeat(60));
}

/// 记录输出分支声明
pub fn log_layout(labels: &[String]) {
    info!("📋 输出分支 ({} 个): {}", labels.len(), labels.join(" | "));
}

/// 打印最终统计信息
///
/// # 参数
/// - `routed`: 命中至少一个分支的条目数
/// - `unmatched`: 未命中任何分支的条目数
/// - `failed`: 输出为错误记录的条目数
/// - `output_file`: 输出文件路径
pub fn log_run_complete(routed: usize, unmatched: usize, failed: usize, output_file: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 分类完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已路由: {}", routed);
    info!("➖ 未命中: {}", unmatched);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_file);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
