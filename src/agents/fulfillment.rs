//! 履约 Agent：配送选项与推荐时效

use async_trait::async_trait;
use serde::Serialize;

use crate::agents::{Agent, AgentInput, AgentKind, AgentOutput};
use crate::core::AgentError;
use crate::payment::Pricing;

/// 购物车金额超过该值时推荐免费标准配送
const FREE_DELIVERY_THRESHOLD: f64 = 4000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryKind {
    Express,
    Standard,
    StorePickup,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryOption {
    pub kind: DeliveryKind,
    pub timeline: String,
    pub cost: u32,
    pub available: bool,
    pub store: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulfillmentPlan {
    /// 购物车为空时为 false（no_order）
    pub has_order: bool,
    pub options: Vec<DeliveryOption>,
    pub recommended: Option<DeliveryKind>,
    pub timeline: Option<String>,
    pub message: String,
}

pub struct FulfillmentAgent {
    pricing: Pricing,
}

impl FulfillmentAgent {
    pub fn new(pricing: Pricing) -> Self {
        Self { pricing }
    }
}

fn option(kind: DeliveryKind, timeline: &str, cost: u32, store: Option<&str>) -> DeliveryOption {
    DeliveryOption {
        kind,
        timeline: timeline.to_string(),
        cost,
        available: true,
        store: store.map(String::from),
    }
}

#[async_trait]
impl Agent for FulfillmentAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Fulfillment
    }

    async fn execute(&self, input: &AgentInput) -> Result<AgentOutput, AgentError> {
        if input.cart.is_empty() {
            return Ok(AgentOutput::Fulfillment(FulfillmentPlan {
                has_order: false,
                options: Vec::new(),
                recommended: None,
                timeline: None,
                message: "No items to deliver".to_string(),
            }));
        }

        let options = vec![
            option(DeliveryKind::Express, "Tomorrow 10 AM", 99, None),
            option(DeliveryKind::Standard, "2-3 days", 0, None),
            option(DeliveryKind::StorePickup, "Today 6 PM", 0, Some("Bandra Store")),
        ];

        let free = self.pricing.cart_value(&input.cart) > FREE_DELIVERY_THRESHOLD;
        let (recommended, timeline, message) = if free {
            (DeliveryKind::Standard, "2-3 days", "Free delivery available!")
        } else {
            (DeliveryKind::Express, "Tomorrow", "Express delivery available")
        };

        Ok(AgentOutput::Fulfillment(FulfillmentPlan {
            has_order: true,
            options,
            recommended: Some(recommended),
            timeline: Some(timeline.to_string()),
            message: message.to_string(),
        }))
    }
}
