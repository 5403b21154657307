//! 支付 Agent：有付款意图时走网关故障转移，否则只报出待付金额

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::{Agent, AgentInput, AgentKind, AgentOutput};
use crate::core::AgentError;
use crate::payment::{DrawSource, FailoverProtocol, Gateway, PaymentReceipt, Pricing};

/// 触发实际扣款的关键词
const CHARGE_KEYWORDS: [&str; 3] = ["pay", "checkout", "purchase"];

pub struct PaymentAgent {
    protocol: FailoverProtocol,
    pricing: Pricing,
    draws: Arc<dyn DrawSource>,
}

impl PaymentAgent {
    pub fn new(gateways: Vec<Gateway>, pricing: Pricing, draws: Arc<dyn DrawSource>) -> Self {
        Self {
            protocol: FailoverProtocol::new(gateways),
            pricing,
            draws,
        }
    }
}

#[async_trait]
impl Agent for PaymentAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Payment
    }

    async fn execute(&self, input: &AgentInput) -> Result<AgentOutput, AgentError> {
        let request = input.request_lower();
        // 金额只在首次尝试前算一次
        let amount = self.pricing.charge_amount(&input.cart);

        let receipt = if CHARGE_KEYWORDS.iter().any(|k| request.contains(k)) {
            self.protocol
                .charge(amount, self.draws.as_ref(), &input.events)
                .await
        } else {
            PaymentReceipt::pending(amount)
        };

        Ok(AgentOutput::Payment(receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CartItem, Channel, ProgressSink};
    use crate::payment::{PaymentState, ScriptedDraws};

    fn agent(draws: ScriptedDraws) -> PaymentAgent {
        PaymentAgent::new(
            vec![Gateway::new("Razorpay", 0.3, 0), Gateway::new("UPI Direct", 1.0, 0)],
            Pricing::default(),
            Arc::new(draws),
        )
    }

    fn input(request: &str, cart: Vec<CartItem>) -> AgentInput {
        AgentInput {
            session_id: "S1".into(),
            customer_id: "CUST001".into(),
            channel: Channel::Mobile,
            request: request.into(),
            liked_products: vec![],
            cart,
            location: "Mumbai".into(),
            events: ProgressSink::disabled(),
        }
    }

    async fn receipt(agent: &PaymentAgent, input: AgentInput) -> PaymentReceipt {
        match agent.execute(&input).await.unwrap() {
            AgentOutput::Payment(r) => r,
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_buy_without_pay_keyword_is_pending() {
        let r = receipt(&agent(ScriptedDraws::new([])), input("I want to buy this", vec![])).await;
        assert_eq!(r.status, PaymentState::Pending);
        assert_eq!(r.amount, 3950.0);
        assert!(r.retry_history.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_fails_over_to_upi() {
        let cart = vec![CartItem::new("VH001", 1, "40"), CartItem::new("VH002", 2, "40")];
        let r = receipt(
            &agent(ScriptedDraws::new([0.9, 0.5, 0.5])),
            input("Checkout now", cart),
        )
        .await;
        assert!(r.success);
        assert_eq!(r.amount, 7500.0);
        assert_eq!(r.gateway.as_deref(), Some("UPI Direct"));
        assert_eq!(r.retry_history.len(), 2);
    }
}
