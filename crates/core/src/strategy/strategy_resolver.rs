//! Pricing rule selection.
//!
//! Rules live in an arena and are indexed by channel. Selection is a
//! comparator over (specificity, priority, creation order), so the result
//! never depends on the order rules were stored in or items were submitted.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;

use crate::catalogue::{CatalogueItem, ChannelContext};
use crate::errors::{DatasetError, Result};

use super::strategy_model::{normalize_label, PricingPolicyRule, RuleGroup, StrategyKey};
use super::strategy_traits::RuleDatasetProvider;

/// Higher ranks win: more predicates, then higher priority, then earlier
/// creation.
fn rank(a: &PricingPolicyRule, b: &PricingPolicyRule) -> Ordering {
    a.specificity()
        .cmp(&b.specificity())
        .then(a.priority.cmp(&b.priority))
        .then(b.created_seq.cmp(&a.created_seq))
        .then(b.id.cmp(&a.id))
}

#[derive(Debug, Clone)]
pub struct StrategyResolver {
    rules: Vec<PricingPolicyRule>,
    /// lowercased channel -> rule positions
    by_channel: HashMap<String, Vec<usize>>,
    /// Rules without a channel predicate, default included
    any_channel: Vec<usize>,
    default_rule: usize,
}

impl StrategyResolver {
    pub fn from_provider(provider: &dyn RuleDatasetProvider) -> Result<Self> {
        Self::new(provider.pricing_rules()?)
    }

    /// Validates the rule set: unique ids, sane effects and exactly one
    /// default rule.
    pub fn new(rules: Vec<PricingPolicyRule>) -> Result<Self> {
        let mut ids = HashSet::new();
        for rule in &rules {
            rule.validate()?;
            if !ids.insert(rule.id.as_str()) {
                return Err(DatasetError::DuplicateRule(rule.id.clone()).into());
            }
        }

        let defaults: Vec<usize> = rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_default())
            .map(|(i, _)| i)
            .collect();
        let default_rule = match defaults.as_slice() {
            [single] => *single,
            other => return Err(DatasetError::DefaultRule(other.len()).into()),
        };

        let mut by_channel: HashMap<String, Vec<usize>> = HashMap::new();
        let mut any_channel = Vec::new();
        for (i, rule) in rules.iter().enumerate() {
            match &rule.channel {
                Some(channel) => by_channel
                    .entry(normalize_label(channel))
                    .or_default()
                    .push(i),
                None => any_channel.push(i),
            }
        }

        debug!(
            "Loaded {} pricing rules across {} channels",
            rules.len(),
            by_channel.len()
        );

        Ok(Self {
            rules,
            by_channel,
            any_channel,
            default_rule,
        })
    }

    pub fn resolve(&self, item: &CatalogueItem, context: &ChannelContext) -> &PricingPolicyRule {
        self.resolve_key(&StrategyKey::for_item(item, context))
    }

    /// Most specific matching rule, falling back to the default rule.
    pub fn resolve_key(&self, key: &StrategyKey) -> &PricingPolicyRule {
        &self.rules[self.resolve_index(key)]
    }

    /// Resolves many items, matching each distinct key once.
    ///
    /// Returns the rule per item (input order) and the items grouped by rule.
    pub fn resolve_batch<'a>(
        &'a self,
        requests: &[(CatalogueItem, ChannelContext)],
    ) -> (Vec<&'a PricingPolicyRule>, Vec<RuleGroup>) {
        let mut memo: HashMap<StrategyKey, usize> = HashMap::new();
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut resolved = Vec::with_capacity(requests.len());

        for (position, (item, context)) in requests.iter().enumerate() {
            let key = StrategyKey::for_item(item, context);
            let index = match memo.get(&key) {
                Some(index) => *index,
                None => {
                    let index = self.resolve_index(&key);
                    memo.insert(key, index);
                    index
                }
            };
            groups.entry(index).or_default().push(position);
            resolved.push(&self.rules[index]);
        }

        debug!(
            "Resolved {} items with {} distinct rule matches",
            requests.len(),
            memo.len()
        );

        let groups = groups
            .into_iter()
            .map(|(index, items)| RuleGroup {
                rule_id: self.rules[index].id.clone(),
                items,
            })
            .collect();
        (resolved, groups)
    }

    pub fn default_rule(&self) -> &PricingPolicyRule {
        &self.rules[self.default_rule]
    }

    pub fn get(&self, id: &str) -> Option<&PricingPolicyRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn resolve_index(&self, key: &StrategyKey) -> usize {
        let channel_rules = self
            .by_channel
            .get(&key.channel)
            .map(Vec::as_slice)
            .unwrap_or_default();

        channel_rules
            .iter()
            .chain(self.any_channel.iter())
            .copied()
            .filter(|&i| self.rules[i].matches(key))
            .max_by(|&a, &b| rank(&self.rules[a], &self.rules[b]))
            .unwrap_or(self.default_rule)
    }
}
