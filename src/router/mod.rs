//! 路由：把自由文本请求映射到需要调用的 Agent 集合

pub mod intent;

pub use intent::{IntentClassifier, KeywordRule, SmallTalk};
