//! 售后 Agent：退货、换货与通用帮助

use async_trait::async_trait;
use serde::Serialize;

use crate::agents::{Agent, AgentInput, AgentKind, AgentOutput};
use crate::core::AgentError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportTopic {
    Return,
    Exchange,
    General,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportReply {
    pub topic: SupportTopic,
    pub eligible: bool,
    /// 条件 / 可选项 / 帮助主题，依 topic 而定
    pub details: Vec<String>,
    pub timeline: Option<String>,
    pub message: String,
}

impl SupportReply {
    pub fn ready() -> Self {
        Self {
            topic: SupportTopic::None,
            eligible: false,
            details: Vec::new(),
            timeline: None,
            message: "I'm here to help! You can ask about returns, exchanges, or any issues."
                .to_string(),
        }
    }

    fn returns() -> Self {
        Self {
            topic: SupportTopic::Return,
            eligible: true,
            details: vec!["Unused with tags".into(), "Original packaging".into()],
            timeline: Some("5-7 days".into()),
            message: "You can return this item within 30 days. Pickup can be scheduled.".into(),
        }
    }

    fn exchange() -> Self {
        Self {
            topic: SupportTopic::Exchange,
            eligible: true,
            details: vec![
                "Different size".into(),
                "Different color".into(),
                "Different product".into(),
            ],
            timeline: Some("3-5 days for exchange".into()),
            message: "We can arrange an exchange. What would you like instead?".into(),
        }
    }

    fn general() -> Self {
        Self {
            topic: SupportTopic::General,
            eligible: false,
            details: vec![
                "Order tracking".into(),
                "Returns & Exchanges".into(),
                "Payment issues".into(),
                "Product questions".into(),
            ],
            timeline: None,
            message: "I can help you with orders, returns, or any questions!".into(),
        }
    }
}

pub struct SupportAgent;

fn mentions(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

#[async_trait]
impl Agent for SupportAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Support
    }

    async fn execute(&self, input: &AgentInput) -> Result<AgentOutput, AgentError> {
        let request = input.request_lower();

        let reply = if mentions(&request, &["return", "refund"]) {
            SupportReply::returns()
        } else if mentions(&request, &["exchange", "replace"]) {
            SupportReply::exchange()
        } else if mentions(&request, &["help", "issue"]) {
            SupportReply::general()
        } else {
            SupportReply::ready()
        };

        Ok(AgentOutput::Support(reply))
    }
}
