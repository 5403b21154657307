//! 积分 Agent：积分余额、组合优惠与最终价

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::agents::{Agent, AgentInput, AgentKind, AgentOutput, Catalog};
use crate::core::AgentError;
use crate::payment::Pricing;

/// 客户不在客户表中时的默认积分
const DEFAULT_POINTS: u32 = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoyaltySummary {
    pub points_available: u32,
    /// 1 积分 = ₹1
    pub points_value: f64,
    pub tier: Option<String>,
    pub offers: Vec<String>,
    pub discount_amount: f64,
    pub original_price: f64,
    pub final_price: f64,
    pub savings: f64,
    pub message: String,
}

pub struct LoyaltyAgent {
    catalog: Arc<Catalog>,
    pricing: Pricing,
}

impl LoyaltyAgent {
    pub fn new(catalog: Arc<Catalog>, pricing: Pricing) -> Self {
        Self { catalog, pricing }
    }
}

#[async_trait]
impl Agent for LoyaltyAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Loyalty
    }

    async fn execute(&self, input: &AgentInput) -> Result<AgentOutput, AgentError> {
        let customer = self.catalog.customer(&input.customer_id);
        let points_available = customer.map_or(DEFAULT_POINTS, |c| c.loyalty_points);
        let tier = customer.and_then(|c| c.tier.clone());

        let cart_value = self.pricing.cart_value(&input.cart);

        // 按购物车行数计算组合优惠（重复条目各算一行）
        let (offers, discount_amount) = match input.cart.len() {
            n if n >= 3 => (vec!["Bundle Offer: 20% off on 3+ items".to_string()], cart_value * 0.20),
            2 => (vec!["Multi-buy: 10% off on 2+ items".to_string()], cart_value * 0.10),
            _ => (Vec::new(), 0.0),
        };

        let points_value = f64::from(points_available);
        // 积分抵扣上限为购物车金额的 10%
        let final_price = cart_value - discount_amount - points_value.min(cart_value * 0.1);
        let savings = cart_value - final_price;

        Ok(AgentOutput::Loyalty(LoyaltySummary {
            points_available,
            points_value,
            tier,
            offers,
            discount_amount,
            original_price: cart_value,
            final_price,
            savings,
            message: format!("You're saving ₹{:.0}!", savings),
        }))
    }
}
