//! Declarative ability rules and their evaluator.
//!
//! Rules are kept in declaration order and the LAST matching rule decides the
//! outcome. That order is semantically load-bearing: a broad allow followed by
//! a narrower deny must end in deny for the narrow case. No matching rule
//! means deny.

use crate::model::{Action, Decision, SubjectRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectMatch {
    /// Wildcard: matches any subject.
    All,
    /// Matches every instance of one resource type.
    Type(String),
    /// Matches exactly one instance of one resource type.
    Instance { subject_type: String, id: String },
}

impl SubjectMatch {
    fn matches(&self, subject: &SubjectRef) -> bool {
        match self {
            SubjectMatch::All => true,
            SubjectMatch::Type(subject_type) => subject.subject_type == *subject_type,
            SubjectMatch::Instance { subject_type, id } => {
                subject.subject_type == *subject_type && subject.instance.as_deref() == Some(id)
            }
        }
    }
}

/// Optional predicate evaluated against request attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    AttrEquals { key: String, value: Value },
}

impl Condition {
    fn matches(&self, attrs: Option<&Value>) -> bool {
        match self {
            Condition::AttrEquals { key, value } => attrs
                .and_then(|a| a.get(key))
                .map(|found| found == value)
                .unwrap_or(false),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRule {
    pub effect: Effect,
    pub action: Action,
    pub subject: SubjectMatch,
    #[serde(default)]
    pub condition: Option<Condition>,
}

impl AbilityRule {
    pub fn allow(action: Action, subject: SubjectMatch) -> Self {
        Self {
            effect: Effect::Allow,
            action,
            subject,
            condition: None,
        }
    }

    pub fn deny(action: Action, subject: SubjectMatch) -> Self {
        Self {
            effect: Effect::Deny,
            action,
            subject,
            condition: None,
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    fn matches(&self, action: Action, subject: &SubjectRef, attrs: Option<&Value>) -> bool {
        let action_hit = self.action == Action::Manage || self.action == action;
        let condition_hit = self
            .condition
            .as_ref()
            .map(|c| c.matches(attrs))
            .unwrap_or(true);
        action_hit && self.subject.matches(subject) && condition_hit
    }
}

/// Ordered rule set for one identity. Read-only after construction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AbilitySet {
    rules: Vec<AbilityRule>,
}

impl AbilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: Vec<AbilityRule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: AbilityRule) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn check(&self, action: Action, subject: &SubjectRef) -> Decision {
        self.check_with(action, subject, None)
    }

    /// Last-match-wins over the declared rule order; default deny.
    pub fn check_with(
        &self,
        action: Action,
        subject: &SubjectRef,
        attrs: Option<&Value>,
    ) -> Decision {
        let mut verdict: Option<&AbilityRule> = None;
        for rule in &self.rules {
            if rule.matches(action, subject, attrs) {
                verdict = Some(rule);
            }
        }
        match verdict {
            Some(rule) if rule.effect == Effect::Allow => Decision::allow(),
            Some(_) => Decision::deny(format!(
                "denied by rule for {} on {}",
                action.as_str(),
                subject
            )),
            None => Decision::deny("no matching rule"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_set_denies_everything() {
        let abilities = AbilitySet::new();
        for action in [Action::Create, Action::Read, Action::Manage] {
            let decision = abilities.check(action, &SubjectRef::of_type("Account"));
            assert!(!decision.allow);
        }
    }

    #[test]
    fn later_deny_overrides_broad_allow() {
        let abilities = AbilitySet::from_rules(vec![
            AbilityRule::allow(Action::Manage, SubjectMatch::Type("Coupon".into())),
            AbilityRule::deny(
                Action::Update,
                SubjectMatch::Instance {
                    subject_type: "Coupon".into(),
                    id: "42".into(),
                },
            ),
        ]);

        let pinned = abilities.check(Action::Update, &SubjectRef::instance("Coupon", "42"));
        assert!(!pinned.allow);

        let other = abilities.check(Action::Update, &SubjectRef::instance("Coupon", "7"));
        assert!(other.allow);

        // Non-update actions on the pinned instance stay allowed.
        let read = abilities.check(Action::Read, &SubjectRef::instance("Coupon", "42"));
        assert!(read.allow);
    }

    #[test]
    fn manage_all_is_a_full_wildcard() {
        let abilities = AbilitySet::from_rules(vec![AbilityRule::allow(
            Action::Manage,
            SubjectMatch::All,
        )]);
        assert!(
            abilities
                .check(Action::Delete, &SubjectRef::instance("Plan", "p1"))
                .allow
        );
        assert!(abilities.check(Action::List, &SubjectRef::of_type("Entry")).allow);
    }

    #[test]
    fn instance_rule_does_not_match_type_level_check() {
        let abilities = AbilitySet::from_rules(vec![AbilityRule::allow(
            Action::Read,
            SubjectMatch::Instance {
                subject_type: "Coupon".into(),
                id: "42".into(),
            },
        )]);
        assert!(!abilities.check(Action::Read, &SubjectRef::of_type("Coupon")).allow);
        assert!(
            abilities
                .check(Action::Read, &SubjectRef::instance("Coupon", "42"))
                .allow
        );
    }

    #[test]
    fn condition_gates_the_rule() {
        let abilities = AbilitySet::from_rules(vec![AbilityRule::allow(
            Action::Update,
            SubjectMatch::Type("Entry".into()),
        )
        .when(Condition::AttrEquals {
            key: "owner".into(),
            value: json!("user-1"),
        })]);

        let subject = SubjectRef::of_type("Entry");
        assert!(
            abilities
                .check_with(Action::Update, &subject, Some(&json!({"owner": "user-1"})))
                .allow
        );
        assert!(
            !abilities
                .check_with(Action::Update, &subject, Some(&json!({"owner": "user-2"})))
                .allow
        );
        assert!(!abilities.check(Action::Update, &subject).allow);
    }
}
