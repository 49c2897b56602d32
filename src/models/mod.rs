pub mod answer;
pub mod category;
pub mod item;
pub mod loaders;
pub mod settings;

pub use answer::ClassificationAnswer;
pub use category::{Category, CategorySet};
pub use item::{BranchAssignment, InputItem, OutputBranches, OutputItem, OutputLayout};
pub use loaders::{load_items, load_settings};
pub use settings::{
    CategoryMode, ClassificationOptions, ClassifierSettings, FallbackPolicy,
    DEFAULT_SYSTEM_PROMPT_TEMPLATE,
};
