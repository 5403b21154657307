//! 回复合成：从最终 SharedState 渲染回复文本（纯函数）
//!
//! 段落顺序固定：问候 → 推荐 → 库存 → 积分 → 支付 → 配送 → 售后，
//! 只输出结果槽非空的段落，段落之间空一行。一个结果都没有时返回兜底文案。

use serde::Serialize;

use crate::agents::InventoryStatus;
use crate::core::SharedState;
use crate::payment::PaymentState;
use crate::router::SmallTalk;

const GREETING: &str = "Hi! I'm your AI shopping assistant. How can I help you today?";
const FALLBACK: &str =
    "I'm here to help! You can ask me about products, check availability, or place an order.";

/// 推荐段落最多列出的商品数
const TOP_RECOMMENDATIONS: usize = 3;

/// 前端据此展示下一步按钮
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    TrackOrder,
    RetryPayment,
    ViewAlternatives,
    ViewRecommendations,
}

/// 按固定顺序拼接各段落
pub fn render(state: &SharedState) -> String {
    let results = &state.results;
    if results.is_empty() {
        return FALLBACK.to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    if state.messages.is_empty() {
        parts.push(GREETING.to_string());
    }

    if let Some(recs) = results.recommendations.as_ref().filter(|r| !r.items.is_empty()) {
        parts.push(format!(
            "Based on your preferences, I found {} items you might love:",
            recs.items.len()
        ));
        for item in recs.items.iter().take(TOP_RECOMMENDATIONS) {
            parts.push(format!("• {} - ₹{:.0}", item.name, item.price));
        }
    }

    if let Some(inventory) = &results.inventory {
        parts.push(inventory_line(inventory));
    }

    if let Some(loyalty) = &results.loyalty {
        if loyalty.points_available > 0 {
            parts.push(format!(
                "💎 You have {} loyalty points (₹{:.0})",
                loyalty.points_available, loyalty.points_value
            ));
        }
        if let Some(offer) = loyalty.offers.first() {
            parts.push(format!("🎁 Special offer: {}", offer));
        }
    }

    if let Some(payment) = &results.payment {
        match (&payment.transaction_id, payment.success) {
            (Some(txn), true) => parts.push(format!("✅ Payment successful! Transaction ID: {}", txn)),
            _ => parts.push(format!("⚠️ Payment issue: {}", payment.message)),
        }
    }

    if let Some(fulfillment) = &results.fulfillment {
        let timeline = fulfillment.timeline.as_deref().unwrap_or("2-3 days");
        parts.push(format!("📦 Delivery: {}", timeline));
    }

    if let Some(support) = &results.support {
        parts.push(support.message.clone());
    }

    // 结果槽非空但没有渲染出任何段落（如 0 积分且无优惠）
    if parts.is_empty() {
        return FALLBACK.to_string();
    }

    parts.join("\n\n")
}

fn inventory_line(inventory: &InventoryStatus) -> String {
    if inventory.available {
        match &inventory.store {
            Some(store) => format!("✓ Available at {} ({} in stock)", store.name, store.stock),
            None => format!("✓ {}", inventory.message),
        }
    } else {
        let alternative = inventory
            .alternatives
            .first()
            .map(|a| a.name.as_str())
            .unwrap_or("Check other stores");
        format!("Currently unavailable. Alternative: {}", alternative)
    }
}

/// 无 Agent 路径的固定回复表
pub fn canned_reply(talk: SmallTalk) -> &'static str {
    match talk {
        SmallTalk::Greeting => "Hello! I'm your AI shopping assistant. I can help you find products, check availability, and complete your purchase. What are you looking for today?",
        SmallTalk::Thanks => "You're welcome! Is there anything else I can help you with?",
        SmallTalk::General => "I'm here to help! You can ask me about products, availability, or placing an order.",
    }
}

/// 根据最终状态推断下一步动作；支付结果优先于库存与推荐
pub fn next_action(state: &SharedState) -> Option<NextAction> {
    let results = &state.results;
    match results.payment.as_ref().map(|p| p.status) {
        Some(PaymentState::Completed) => return Some(NextAction::TrackOrder),
        Some(PaymentState::Failed) => return Some(NextAction::RetryPayment),
        _ => {}
    }
    if results.inventory.as_ref().is_some_and(|i| !i.available) {
        return Some(NextAction::ViewAlternatives);
    }
    if results.recommendations.as_ref().is_some_and(|r| !r.items.is_empty()) {
        return Some(NextAction::ViewRecommendations);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{
        Alternative, FulfillmentPlan, LoyaltySummary, RecommendedProduct, Recommendations,
        SupportReply,
    };
    use crate::core::Channel;
    use crate::payment::PaymentReceipt;
    use crate::session::{ConversationMessage, SessionSnapshot};

    fn fresh_state() -> SharedState {
        SharedState::new(SessionSnapshot::new("CUST001", "Mumbai"), "show me", Channel::Web)
    }

    fn item(id: &str, name: &str, price: f64) -> RecommendedProduct {
        RecommendedProduct {
            product_id: id.into(),
            name: name.into(),
            brand: "Van Heusen".into(),
            price,
            category: "Ties".into(),
            tags: vec![],
            match_score: 0.5,
            reasoning: "Completes your look".into(),
        }
    }

    #[test]
    fn test_top_three_recommendations_only() {
        let mut state = fresh_state();
        state.results.recommendations = Some(Recommendations {
            items: vec![
                item("A", "Tie", 800.0),
                item("B", "Belt", 1200.0),
                item("C", "Cufflinks", 600.0),
                item("D", "Socks", 300.0),
            ],
            total_found: 4,
        });

        let text = render(&state);
        let lines: Vec<&str> = text.lines().filter(|l| l.starts_with("• ")).collect();
        assert_eq!(lines, vec!["• Tie - ₹800", "• Belt - ₹1200", "• Cufflinks - ₹600"]);
        assert!(text.starts_with(GREETING));
        assert!(text.contains("I found 4 items"));
        assert!(!text.contains("Payment"));
        assert!(!text.contains("Delivery"));
        assert!(!text.contains("loyalty"));
    }

    #[test]
    fn test_greeting_omitted_with_history() {
        let mut state = fresh_state();
        state.messages.push(ConversationMessage::user("hi", Channel::Web));
        state.results.support = Some(SupportReply::ready());
        assert_eq!(render(&state), SupportReply::ready().message);
    }

    #[test]
    fn test_empty_results_fall_back() {
        assert_eq!(render(&fresh_state()), FALLBACK);
    }

    #[test]
    fn test_filled_slots_without_sections_fall_back() {
        let mut state = fresh_state();
        state.messages.push(ConversationMessage::user("earlier", Channel::Web));
        state.results.loyalty = Some(LoyaltySummary {
            points_available: 0,
            points_value: 0.0,
            tier: None,
            offers: vec![],
            discount_amount: 0.0,
            original_price: 0.0,
            final_price: 0.0,
            savings: 0.0,
            message: "You're saving ₹0!".into(),
        });
        assert_eq!(render(&state), FALLBACK);

        state.results.loyalty = None;
        state.results.recommendations = Some(Recommendations {
            items: vec![],
            total_found: 0,
        });
        assert_eq!(render(&state), FALLBACK);
    }

    #[test]
    fn test_section_order_and_separator() {
        let mut state = fresh_state();
        state.messages.push(ConversationMessage::user("earlier", Channel::Web));
        state.results.support = Some(SupportReply::ready());
        state.results.fulfillment = Some(FulfillmentPlan {
            has_order: true,
            options: vec![],
            recommended: None,
            timeline: None,
            message: String::new(),
        });
        let mut receipt = PaymentReceipt::pending(3950.0);
        receipt.message = "All payment methods failed. Please try again later.".into();
        receipt.status = PaymentState::Failed;
        state.results.payment = Some(receipt);

        let text = render(&state);
        let sections: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(
            sections,
            vec![
                "⚠️ Payment issue: All payment methods failed. Please try again later.",
                "📦 Delivery: 2-3 days",
                "I'm here to help! You can ask about returns, exchanges, or any issues.",
            ]
        );
        assert_eq!(next_action(&state), Some(NextAction::RetryPayment));
    }

    #[test]
    fn test_unavailable_inventory_names_alternative() {
        let inventory = InventoryStatus {
            available: false,
            product_id: Some("VH999".into()),
            size: Some("42".into()),
            store: None,
            can_reserve: false,
            nearby_stores: vec![],
            alternatives: vec![Alternative {
                product_id: "VH002".into(),
                name: "Navy Blue Silk Tie".into(),
                price: 800.0,
                similarity: 0.85,
            }],
            unavailable_items: vec![],
            restock_eta: Some("3 days".into()),
            message: "Size 42 unavailable at your location".into(),
        };
        assert_eq!(
            inventory_line(&inventory),
            "Currently unavailable. Alternative: Navy Blue Silk Tie"
        );

        let mut state = fresh_state();
        state.results.inventory = Some(inventory);
        assert_eq!(next_action(&state), Some(NextAction::ViewAlternatives));
    }

    #[test]
    fn test_canned_replies_are_stable() {
        let first = canned_reply(SmallTalk::detect("hello"));
        let second = canned_reply(SmallTalk::detect("hello"));
        assert_eq!(first, second);
        assert!(first.starts_with("Hello! I'm your AI shopping assistant."));
        assert_eq!(
            canned_reply(SmallTalk::Thanks),
            "You're welcome! Is there anything else I can help you with?"
        );
    }
}
