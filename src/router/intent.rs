//! 意图识别模块
//!
//! 确定性的关键词规则表（不是模型）：每组关键词对应一个 Agent，
//! 请求小写后只要包含组内任一关键词（子串匹配）即选中该 Agent。
//! 规则顺序与关键词列表直接决定活动面板中的 Agent 顺序，修改需谨慎。

use crate::agents::AgentKind;
use crate::core::SharedState;

/// 一条规则：Agent + 关键词组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub agent: AgentKind,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(agent: AgentKind, keywords: &[&str]) -> Self {
        Self {
            agent,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn matches(&self, request_lower: &str) -> bool {
        self.keywords.iter().any(|k| request_lower.contains(k.as_str()))
    }
}

/// 默认规则表（顺序即输出顺序）
pub fn default_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            AgentKind::Recommendation,
            &["recommend", "suggest", "show", "match", "pair", "goes with"],
        ),
        KeywordRule::new(
            AgentKind::Inventory,
            &["stock", "available", "store", "nearby", "reserve"],
        ),
        KeywordRule::new(
            AgentKind::Payment,
            &["pay", "payment", "checkout", "buy", "purchase"],
        ),
        KeywordRule::new(
            AgentKind::Fulfillment,
            &["deliver", "shipping", "delivery", "when will"],
        ),
        KeywordRule::new(
            AgentKind::Loyalty,
            &["discount", "offer", "points", "loyalty", "coupon"],
        ),
        KeywordRule::new(
            AgentKind::Support,
            &["return", "refund", "exchange", "problem", "issue", "help"],
        ),
    ]
}

/// 意图识别器
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<KeywordRule>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// 识别需要调用的 Agent（去重，保留首次出现顺序）
    ///
    /// 1. 各规则独立匹配
    /// 2. 购物车或喜欢列表非空时强制加入 recommendation
    /// 3. 结果非空时强制加入 loyalty（顺带检查可用优惠）
    /// 4. 结果为空 → 调用方走寒暄直出，不经分派器
    pub fn classify(&self, request: &str, state: &SharedState) -> Vec<AgentKind> {
        let request_lower = request.to_lowercase();
        let mut agents: Vec<AgentKind> = Vec::new();

        for rule in &self.rules {
            if rule.matches(&request_lower) {
                push_unique(&mut agents, rule.agent);
            }
        }

        if !state.cart.is_empty() || !state.liked_products.is_empty() {
            push_unique(&mut agents, AgentKind::Recommendation);
        }

        if !agents.is_empty() {
            push_unique(&mut agents, AgentKind::Loyalty);
        }

        agents
    }
}

fn push_unique(agents: &mut Vec<AgentKind>, kind: AgentKind) {
    if !agents.contains(&kind) {
        agents.push(kind);
    }
}

/// 无 Agent 时的寒暄类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallTalk {
    Greeting,
    Thanks,
    General,
}

impl SmallTalk {
    /// 按顺序匹配：问候 → 感谢 → 其它（同样是子串匹配，"this" 也会命中 "hi"）
    pub fn detect(request: &str) -> Self {
        let request_lower = request.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| request_lower.contains(w));
        if has(&["hi", "hello", "hey"][..]) {
            SmallTalk::Greeting
        } else if has(&["thank", "thanks"][..]) {
            SmallTalk::Thanks
        } else {
            SmallTalk::General
        }
    }

    /// 写入 SharedState.intent 的标签
    pub fn label(&self) -> &'static str {
        match self {
            SmallTalk::Greeting => "greeting",
            SmallTalk::Thanks => "thanks",
            SmallTalk::General => "general",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CartItem, Channel};
    use crate::session::SessionSnapshot;

    fn state(cart: Vec<CartItem>, liked: Vec<&str>) -> SharedState {
        let snapshot = SessionSnapshot::new("CUST001", "Mumbai")
            .with_cart(cart)
            .with_liked_products(liked.into_iter().map(String::from).collect());
        SharedState::new(snapshot, "", Channel::Web)
    }

    #[test]
    fn test_no_keyword_empty_context_selects_nothing() {
        let classifier = IntentClassifier::new();
        assert!(classifier.classify("good morning", &state(vec![], vec![])).is_empty());
    }

    #[test]
    fn test_matched_groups_plus_loyalty() {
        let classifier = IntentClassifier::new();
        let agents = classifier.classify("Is this in STOCK? I want to checkout", &state(vec![], vec![]));
        assert_eq!(
            agents,
            vec![AgentKind::Inventory, AgentKind::Payment, AgentKind::Loyalty]
        );
    }

    #[test]
    fn test_loyalty_not_duplicated() {
        let classifier = IntentClassifier::new();
        let agents = classifier.classify("any discount if I pay now", &state(vec![], vec![]));
        assert_eq!(agents, vec![AgentKind::Payment, AgentKind::Loyalty]);
    }

    #[test]
    fn test_cart_forces_recommendation() {
        let classifier = IntentClassifier::new();
        let agents = classifier.classify(
            "when will it arrive",
            &state(vec![CartItem::new("VH001", 1, "40")], vec![]),
        );
        assert_eq!(
            agents,
            vec![
                AgentKind::Fulfillment,
                AgentKind::Recommendation,
                AgentKind::Loyalty
            ]
        );
    }

    #[test]
    fn test_liked_products_alone_trigger_agents() {
        let classifier = IntentClassifier::new();
        let agents = classifier.classify("good morning", &state(vec![], vec!["VH001"]));
        assert_eq!(agents, vec![AgentKind::Recommendation, AgentKind::Loyalty]);
    }

    #[test]
    fn test_custom_rule_table() {
        let classifier =
            IntentClassifier::with_rules(vec![KeywordRule::new(AgentKind::Support, &["broken"])]);
        let agents = classifier.classify("my zip is broken, show me help", &state(vec![], vec![]));
        assert_eq!(agents, vec![AgentKind::Support, AgentKind::Loyalty]);
    }

    #[test]
    fn test_small_talk_detection() {
        assert_eq!(SmallTalk::detect("Hello there"), SmallTalk::Greeting);
        assert_eq!(SmallTalk::detect("thanks a lot"), SmallTalk::Thanks);
        assert_eq!(SmallTalk::detect("good morning"), SmallTalk::General);
        // 子串匹配，"this" 也算问候
        assert_eq!(SmallTalk::detect("is this ok"), SmallTalk::Greeting);
    }
}
