//! Sales aggregation
//!
//! Both maps remember the order in which keys were first seen while scanning
//! the ledger. That order is the trending tie-break and the order in which
//! histories are embedded into the oracle prompt.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::sale::Sale;

/// Cumulative units sold per product identifier, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseCounts {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl PurchaseCounts {
    pub fn record(&mut self, product_id: &str, quantity: u32) {
        let quantity = u64::from(quantity);
        match self.index.get(product_id) {
            Some(&position) => self.entries[position].1 += quantity,
            None => {
                self.index.insert(product_id.to_string(), self.entries.len());
                self.entries.push((product_id.to_string(), quantity));
            }
        }
    }

    pub fn get(&self, product_id: &str) -> Option<u64> {
        self.index.get(product_id).map(|&position| self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(id, count)| (id.as_str(), *count))
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Product names bought per user, one entry per line item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPurchaseHistory {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl UserPurchaseHistory {
    pub fn append(&mut self, user_id: &str, product_name: &str) {
        let position = self.ensure_user(user_id);
        self.entries[position].1.push(product_name.to_string());
    }

    /// Registers a user without purchases. A sale with no line items still
    /// marks its buyer as seen.
    pub fn ensure_user(&mut self, user_id: &str) -> usize {
        if let Some(&position) = self.index.get(user_id) {
            return position;
        }
        let position = self.entries.len();
        self.index.insert(user_id.to_string(), position);
        self.entries.push((user_id.to_string(), Vec::new()));
        position
    }

    pub fn for_user(&self, user_id: &str) -> Option<&[String]> {
        self.index.get(user_id).map(|&position| self.entries[position].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(user, names)| (user.as_str(), names.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for UserPurchaseHistory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (user, names) in &self.entries {
            map.serialize_entry(user, names)?;
        }
        map.end()
    }
}

/// Both per-request aggregates, built in a single ledger pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesAggregate {
    pub counts: PurchaseCounts,
    pub histories: UserPurchaseHistory,
}

impl SalesAggregate {
    pub fn from_sales(sales: &[Sale]) -> Self {
        let mut aggregate = Self::default();
        for sale in sales {
            aggregate.histories.ensure_user(&sale.user_id);
            for item in &sale.items {
                aggregate.counts.record(&item.id, item.quantity);
                aggregate.histories.append(&sale.user_id, &item.name);
            }
        }
        aggregate
    }
}
