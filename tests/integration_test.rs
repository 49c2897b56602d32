use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Mutex;
use text_classifier::error::ConfigError;
use text_classifier::{
    AppError, Category, CategoryMode, ChatMessage, ClassifierSettings, FallbackPolicy, InputItem,
    LanguageModel, OutputBranches, OutputLayout, Router,
};

/// 按用户消息返回预设回答的桩模型，记录每次调用
struct StubModel {
    replies: HashMap<String, String>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubModel {
    fn new(replies: &[(&str, &str)]) -> Self {
        Self {
            replies: replies
                .iter()
                .map(|(input, reply)| (input.to_string(), reply.to_string()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn system_prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|messages| messages[0].content.clone())
            .collect()
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let input = &messages.last().expect("at least one message").content;
        self.replies
            .get(input)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("model unavailable for: {}", input))
    }
}

fn bug_feature_settings(fallback: FallbackPolicy, multi_class: bool) -> ClassifierSettings {
    let mut settings = ClassifierSettings::with_categories(vec![
        Category::new("Bug", "defect report"),
        Category::new("Feature", "enhancement request"),
    ]);
    settings.options.fallback = fallback;
    settings.options.multi_class = multi_class;
    settings.options.enable_auto_fixing = false;
    settings
}

fn items(texts: &[&str]) -> Vec<InputItem> {
    InputItem::from_values(texts.iter().map(|t| json!({ "text": t })).collect())
}

const BUG: &str = r#"{"Bug": true, "Feature": false, "fallback": false}"#;
const FEATURE: &str = r#"{"Bug": false, "Feature": true, "fallback": false}"#;
const BOTH: &str = r#"{"Bug": true, "Feature": true, "fallback": false}"#;
const NONE: &str = r#"{"Bug": false, "Feature": false, "fallback": true}"#;

#[tokio::test]
async fn test_bug_routed_to_first_branch_only() {
    let settings = bug_feature_settings(FallbackPolicy::Other, false);
    let model = StubModel::new(&[("app crashes on launch", BUG)]);

    let branches = Router::new(&model, &settings)
        .execute(&items(&["app crashes on launch"]))
        .await
        .unwrap();

    assert_eq!(branches.len(), 3);
    assert_eq!(branches.paired_items(0), vec![0]);
    assert!(branches.branch(1).is_empty());
    assert!(branches.branch(2).is_empty());
    assert_eq!(branches.branch(0)[0].json["text"], "app crashes on launch");
}

#[tokio::test]
async fn test_feature_routed_with_multi_class() {
    let settings = bug_feature_settings(FallbackPolicy::Other, true);
    let model = StubModel::new(&[("please add dark mode", FEATURE)]);

    let branches = Router::new(&model, &settings)
        .execute(&items(&["please add dark mode"]))
        .await
        .unwrap();

    assert!(branches.branch(0).is_empty());
    assert_eq!(branches.paired_items(1), vec![0]);
    assert!(branches.branch(2).is_empty());
    assert!(model.system_prompts()[0].contains("not mutually exclusive"));
}

#[tokio::test]
async fn test_fallback_branch_and_discard() {
    let model = StubModel::new(&[("hello there", NONE)]);

    let settings = bug_feature_settings(FallbackPolicy::Other, false);
    let branches = Router::new(&model, &settings)
        .execute(&items(&["hello there"]))
        .await
        .unwrap();
    assert_eq!(branches.paired_items(2), vec![0]);

    let model = StubModel::new(&[("hello there", r#"{"Bug": false, "Feature": false}"#)]);
    let settings = bug_feature_settings(FallbackPolicy::Discard, false);
    let branches = Router::new(&model, &settings)
        .execute(&items(&["hello there"]))
        .await
        .unwrap();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches.total_items(), 0);
}

#[tokio::test]
async fn test_single_class_does_not_enforce_exclusivity() {
    let settings = bug_feature_settings(FallbackPolicy::Other, false);
    let model = StubModel::new(&[("crash when adding dark mode", BOTH)]);

    let branches = Router::new(&model, &settings)
        .execute(&items(&["crash when adding dark mode"]))
        .await
        .unwrap();

    assert_eq!(branches.paired_items(0), vec![0]);
    assert_eq!(branches.paired_items(1), vec![0]);
}

#[tokio::test]
async fn test_one_model_call_per_item() {
    let settings = bug_feature_settings(FallbackPolicy::Other, false);
    let model = StubModel::new(&[("a", BUG), ("b", FEATURE), ("c", NONE), ("d", BOTH)]);

    Router::new(&model, &settings)
        .execute(&items(&["a", "b", "c", "d"]))
        .await
        .unwrap();

    assert_eq!(model.call_count(), 4);
    // 每个条目使用同一份系统提示词
    let prompts = model.system_prompts();
    assert!(prompts.iter().all(|p| p == &prompts[0]));
}

#[tokio::test]
async fn test_branch_totals_bounded_by_true_fields() {
    let settings = bug_feature_settings(FallbackPolicy::Other, true);
    let model = StubModel::new(&[("a", BUG), ("b", BOTH), ("c", NONE)]);

    let branches = Router::new(&model, &settings)
        .execute(&items(&["a", "b", "c"]))
        .await
        .unwrap();

    // 真值字段数：1 + 2 + 1
    assert!(branches.total_items() <= 4);
    for branch in branches.iter() {
        let mut seen: Vec<usize> = branch.iter().map(|i| i.paired_item).collect();
        let before = seen.len();
        seen.dedup();
        assert_eq!(seen.len(), before, "同一分支中条目索引重复");
    }
}

#[tokio::test]
async fn test_idempotent_runs() {
    let settings = bug_feature_settings(FallbackPolicy::Other, false);
    let model = StubModel::new(&[("a", BUG), ("b", FEATURE), ("c", NONE)]);
    let input = items(&["a", "b", "c"]);
    let router = Router::new(&model, &settings);

    let first: OutputBranches = router.execute(&input).await.unwrap();
    let second: OutputBranches = router.execute(&input).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_tolerant_mode_emits_error_record() {
    let mut settings = bug_feature_settings(FallbackPolicy::Other, false);
    settings.continue_on_fail = true;
    // "b" 没有预设回答，模型调用失败
    let model = StubModel::new(&[("a", FEATURE), ("c", FEATURE)]);

    let branches = Router::new(&model, &settings)
        .execute(&items(&["a", "b", "c"]))
        .await
        .unwrap();

    let errors: Vec<_> = branches.branch(0).iter().filter(|i| i.is_error()).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].paired_item, 1);
    assert_eq!(branches.paired_items(1), vec![0, 2]);
    assert_eq!(model.call_count(), 3);
}

#[tokio::test]
async fn test_intolerant_mode_aborts_naming_item() {
    let settings = bug_feature_settings(FallbackPolicy::Other, false);
    let model = StubModel::new(&[("a", FEATURE), ("c", FEATURE)]);

    let err = Router::new(&model, &settings)
        .execute(&items(&["a", "b", "c"]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Classification(_)));
    assert_eq!(err.item_index(), Some(1));
    // 第一个失败后不再处理后续条目
    assert_eq!(model.call_count(), 2);
}

#[tokio::test]
async fn test_missing_text_isolated() {
    let model = StubModel::new(&[("a", BUG)]);
    let input = InputItem::from_values(vec![json!({ "text": "a" }), json!({ "body": "no text" })]);

    let mut settings = bug_feature_settings(FallbackPolicy::Other, false);
    settings.continue_on_fail = true;
    let branches = Router::new(&model, &settings).execute(&input).await.unwrap();
    let paired: Vec<(usize, bool)> = branches
        .branch(0)
        .iter()
        .map(|i| (i.paired_item, i.is_error()))
        .collect();
    assert_eq!(paired, vec![(0, false), (1, true)]);
    assert_eq!(model.call_count(), 1);

    settings.continue_on_fail = false;
    let err = Router::new(&model, &settings).execute(&input).await.unwrap_err();
    assert_eq!(err.item_index(), Some(1));
}

#[tokio::test]
async fn test_auto_fix_repairs_malformed_answer() {
    let mut settings = bug_feature_settings(FallbackPolicy::Other, false);
    settings.options.enable_auto_fixing = true;

    struct RepairingModel {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl LanguageModel for RepairingModel {
        async fn invoke(&self, _messages: &[ChatMessage]) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            Ok(if *calls == 1 { "Bug".to_string() } else { BUG.to_string() })
        }
    }

    let model = RepairingModel {
        calls: Mutex::new(0),
    };
    let branches = Router::new(&model, &settings)
        .execute(&items(&["app crashes on launch"]))
        .await
        .unwrap();

    assert_eq!(branches.paired_items(0), vec![0]);
    assert_eq!(*model.calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn test_empty_categories_fail_before_any_call() {
    let settings = ClassifierSettings::default();
    let model = StubModel::new(&[("a", BUG)]);

    let err = Router::new(&model, &settings)
        .execute(&items(&["a"]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Config(ConfigError::EmptyCategories)));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_aggregate_mode_single_call() {
    let settings = ClassifierSettings {
        mode: CategoryMode::FromItems,
        input_text: Some("the rocket launched".to_string()),
        ..Default::default()
    };
    let model = StubModel::new(&[(
        "the rocket launched",
        r#"{"Space": true, "Cooking": false}"#,
    )]);
    let input = InputItem::from_values(vec![
        json!({ "category": "Space", "description": "astronomy and spaceflight" }),
        json!({ "category": "Cooking", "description": "recipes" }),
    ]);

    let branches = Router::new(&model, &settings).execute(&input).await.unwrap();

    assert_eq!(branches.len(), 1);
    assert_eq!(branches.branch(0).len(), 1);
    let payload: &JsonValue = &branches.branch(0)[0].json;
    assert_eq!(payload["Space"], true);
    assert_eq!(payload["Cooking"], false);
    assert_eq!(payload["text"], "the rocket launched");
    assert_eq!(model.call_count(), 1);
    assert!(model.system_prompts()[0].contains("Space, Cooking"));
}

#[tokio::test]
async fn test_aggregate_mode_never_aborts() {
    let settings = ClassifierSettings {
        mode: CategoryMode::FromItems,
        input_text: Some("unknown".to_string()),
        ..Default::default()
    };
    let model = StubModel::new(&[]);
    let input = InputItem::from_values(vec![json!({ "category": "A", "description": "d1" })]);

    let branches = Router::new(&model, &settings).execute(&input).await.unwrap();

    assert_eq!(branches.len(), 1);
    assert!(branches.branch(0)[0].is_error());
}

#[tokio::test]
async fn test_aggregate_mode_reads_first_item_text() {
    let settings = ClassifierSettings {
        mode: CategoryMode::FromItems,
        ..Default::default()
    };
    let model = StubModel::new(&[("the rocket launched", r#"{"Space": true, "Cooking": false}"#)]);
    let input = InputItem::from_values(vec![
        json!({ "category": "Space", "description": "astronomy", "text": "the rocket launched" }),
        json!({ "category": "Cooking", "description": "recipes", "text": "ignored" }),
    ]);

    let branches = Router::new(&model, &settings).execute(&input).await.unwrap();

    assert_eq!(model.call_count(), 1);
    let payload: &JsonValue = &branches.branch(0)[0].json;
    assert_eq!(payload["Space"], true);
    assert_eq!(payload["text"], "the rocket launched");
}

#[tokio::test]
async fn test_aggregate_mode_missing_text_yields_error_record() {
    let settings = ClassifierSettings {
        mode: CategoryMode::FromItems,
        continue_on_fail: false,
        ..Default::default()
    };
    let model = StubModel::new(&[]);
    let input = InputItem::from_values(vec![json!({ "category": "A", "description": "d1" })]);

    let branches = Router::new(&model, &settings).execute(&input).await.unwrap();

    assert_eq!(branches.len(), 1);
    assert_eq!(branches.branch(0).len(), 1);
    assert!(branches.branch(0)[0].is_error());
    assert_eq!(branches.branch(0)[0].paired_item, 0);
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_aggregate_mode_rejects_category_named_text() {
    let settings = ClassifierSettings {
        mode: CategoryMode::FromItems,
        input_text: Some("hello".to_string()),
        ..Default::default()
    };
    let model = StubModel::new(&[("hello", r#"{"text": true, "image": false}"#)]);
    let input = InputItem::from_values(vec![
        json!({ "category": "text", "description": "prose" }),
        json!({ "category": "image", "description": "pictures" }),
    ]);

    let err = Router::new(&model, &settings).execute(&input).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Config(ConfigError::ReservedCategoryName { ref name }) if name == "text"
    ));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_static_mode_allows_category_named_text() {
    let settings = ClassifierSettings::with_categories(vec![
        Category::new("text", "prose"),
        Category::new("image", "pictures"),
    ]);
    let model = StubModel::new(&[("hello", r#"{"text": true, "image": false}"#)]);

    let branches = Router::new(&model, &settings)
        .execute(&items(&["hello"]))
        .await
        .unwrap();

    assert_eq!(branches.paired_items(0), vec![0]);
    assert!(branches.branch(1).is_empty());
}

#[tokio::test]
async fn test_aggregate_mode_duplicate_categories() {
    let settings = ClassifierSettings {
        mode: CategoryMode::FromItems,
        input_text: Some("x".to_string()),
        ..Default::default()
    };
    let model = StubModel::new(&[]);
    let input = InputItem::from_values(vec![
        json!({ "category": "A", "description": "d1" }),
        json!({ "category": "A", "description": "d1" }),
    ]);

    let err = Router::new(&model, &settings).execute(&input).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Config(ConfigError::DuplicateCategory { ref name }) if name == "A"
    ));
    assert_eq!(model.call_count(), 0);
}

#[test]
fn test_layout_matches_router_branch_count() {
    let settings = bug_feature_settings(FallbackPolicy::Other, false);
    let layout = OutputLayout::from_settings(&settings);
    let model = StubModel::new(&[("a", BUG)]);

    let branches = tokio_test::block_on(Router::new(&model, &settings).execute(&items(&["a"])))
        .unwrap();

    assert_eq!(layout.len(), branches.len());
}
