//! 会话快照：调用方从会话存储加载、运行结束后回写
//!
//! 存储本身（文件 KV）不属于编排引擎；这里只定义进出边界的数据形状。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{CartItem, Channel};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 对话中的一条消息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    pub channel: Channel,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>, channel: Channel) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            channel,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, channel: Channel) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            channel,
            timestamp: Utc::now(),
        }
    }
}

/// 调用方提供的会话快照
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub customer_id: String,
    #[serde(default)]
    pub liked_products: Vec<String>,
    #[serde(default)]
    pub cart: Vec<CartItem>,
    pub location: String,
    #[serde(default)]
    pub conversation: Vec<ConversationMessage>,
}

impl SessionSnapshot {
    /// 新会话：生成 `SESSION_xxxxxxxx` 形式的会话 ID
    pub fn new(customer_id: impl Into<String>, location: impl Into<String>) -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self {
            session_id: format!("SESSION_{}", &hex[..8]),
            customer_id: customer_id.into(),
            liked_products: Vec::new(),
            cart: Vec::new(),
            location: location.into(),
            conversation: Vec::new(),
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_cart(mut self, cart: Vec<CartItem>) -> Self {
        self.cart = cart;
        self
    }

    pub fn with_liked_products(mut self, liked: Vec<String>) -> Self {
        self.liked_products = liked;
        self
    }

    pub fn with_conversation(mut self, conversation: Vec<ConversationMessage>) -> Self {
        self.conversation = conversation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_id_format() {
        let snapshot = SessionSnapshot::new("CUST001", "Mumbai");
        assert!(snapshot.session_id.starts_with("SESSION_"));
        assert_eq!(snapshot.session_id.len(), "SESSION_".len() + 8);
        assert!(snapshot.cart.is_empty());
    }

    #[test]
    fn test_snapshot_deserializes_with_defaults() {
        let snapshot: SessionSnapshot = serde_json::from_str(
            r#"{"session_id":"S1","customer_id":"C1","location":"Pune","cart":[{"product_id":"VH002"}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.cart[0].quantity, 1);
        assert_eq!(snapshot.cart[0].size, "40");
        assert!(snapshot.conversation.is_empty());
    }
}
