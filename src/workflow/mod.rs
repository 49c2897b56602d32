pub mod classify_flow;
pub mod item_ctx;

pub use classify_flow::ClassifyFlow;
pub use item_ctx::ItemCtx;
