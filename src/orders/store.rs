//! Order store: in-memory, insertion-ordered orders guarded by one lock.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::model::{Actor, Claim, Order};
use crate::error::OrderError;

/// What `create` does when the id is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreatePolicy {
    /// Replace the existing order, dropping any claim on it.
    #[default]
    Overwrite,
    /// Fail with `OrderError::AlreadyExists`.
    Reject,
}

/// Outcome of a successful release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Released {
    /// The order after release (unclaimed).
    pub order: Order,
    /// The claim that was cleared.
    pub previous: Claim,
}

/// Unclaimed/claimed partition of every order, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderStats {
    pub unclaimed: Vec<Order>,
    pub claimed: Vec<Order>,
}

#[derive(Debug, Default)]
struct Inner {
    orders: Vec<Order>,
    index: HashMap<String, usize>,
}

impl Inner {
    fn get_mut(&mut self, id: &str) -> Option<&mut Order> {
        let pos = *self.index.get(id)?;
        self.orders.get_mut(pos)
    }
}

/// Owns every order. Mutations are atomic with respect to each other.
#[derive(Debug, Default)]
pub struct OrderStore {
    inner: RwLock<Inner>,
    policy: CreatePolicy,
}

impl OrderStore {
    /// Create an empty store with the default (overwrite) create policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CreatePolicy) -> Self {
        Self {
            inner: RwLock::default(),
            policy,
        }
    }

    // No operation panics while holding the lock, so a poisoned guard still
    // protects consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace an order. Returns `true` if an existing order was replaced.
    ///
    /// A replaced order keeps its listing position but loses any claim.
    pub fn create(
        &self,
        id: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<bool, OrderError> {
        let order = Order::new(id, description);
        let mut inner = self.write();

        if let Some(&pos) = inner.index.get(&order.id) {
            if self.policy == CreatePolicy::Reject {
                debug!(order_id = %order.id, "Rejected duplicate order");
                return Err(OrderError::AlreadyExists { id: order.id });
            }
            if let Some(old) = inner.orders[pos].claim.as_ref() {
                warn!(
                    order_id = %order.id,
                    holder = %old.actor_id,
                    "Overwriting a claimed order; claim dropped"
                );
            }
            info!(order_id = %order.id, "Order replaced");
            inner.orders[pos] = order;
            return Ok(true);
        }

        info!(order_id = %order.id, "Order created");
        let pos = inner.orders.len();
        inner.index.insert(order.id.clone(), pos);
        inner.orders.push(order);
        Ok(false)
    }

    /// Claim an unclaimed order for `actor`.
    pub fn claim(&self, id: &str, actor: &Actor) -> Result<Order, OrderError> {
        let mut inner = self.write();
        let order = inner.get_mut(id).ok_or_else(|| OrderError::NotFound { id: id.into() })?;

        if let Some(existing) = &order.claim {
            debug!(order_id = %id, holder = %existing.actor_id, actor_id = %actor.id, "Claim refused");
            return Err(OrderError::AlreadyClaimed {
                id: id.into(),
                by: existing.actor_name.clone(),
            });
        }

        order.claim = Some(Claim {
            actor_id: actor.id.clone(),
            actor_name: actor.name.clone(),
            claimed_at: Utc::now(),
        });

        info!(order_id = %id, actor_id = %actor.id, "Order claimed");
        Ok(order.clone())
    }

    /// Release a claim. Only the holder or the administrator may do this.
    pub fn release(&self, id: &str, actor: &Actor) -> Result<Released, OrderError> {
        let mut inner = self.write();
        let order = inner
            .get_mut(id)
            .filter(|o| o.is_claimed())
            .ok_or_else(|| OrderError::NotFound { id: id.into() })?;

        if !actor.is_admin && !order.is_claimed_by(&actor.id) {
            warn!(order_id = %id, actor_id = %actor.id, "Release refused: not the holder");
            return Err(OrderError::Forbidden { id: id.into() });
        }

        let Some(previous) = order.claim.take() else {
            return Err(OrderError::NotFound { id: id.into() });
        };

        info!(
            order_id = %id,
            actor_id = %actor.id,
            holder = %previous.actor_id,
            "Order released"
        );
        Ok(Released {
            order: order.clone(),
            previous,
        })
    }

    pub fn get(&self, id: &str) -> Result<Order, OrderError> {
        let inner = self.read();
        inner
            .index
            .get(id)
            .and_then(|&pos| inner.orders.get(pos))
            .cloned()
            .ok_or_else(|| OrderError::NotFound { id: id.into() })
    }

    /// All unclaimed orders, insertion order.
    pub fn list_unclaimed(&self) -> Vec<Order> {
        self.filtered(|o| !o.is_claimed())
    }

    /// All orders claimed by `actor_id`, insertion order.
    pub fn list_claimed_by(&self, actor_id: &str) -> Vec<Order> {
        self.filtered(|o| o.is_claimed_by(actor_id))
    }

    /// Every order, insertion order.
    pub fn list_all(&self) -> Vec<Order> {
        self.read().orders.clone()
    }

    /// Partition every order into unclaimed and claimed under one read lock.
    pub fn stats(&self) -> OrderStats {
        let (claimed, unclaimed): (Vec<Order>, Vec<Order>) =
            self.read().orders.iter().cloned().partition(Order::is_claimed);
        OrderStats { unclaimed, claimed }
    }

    pub fn len(&self) -> usize {
        self.read().orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().orders.is_empty()
    }

    fn filtered(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        self.read().orders.iter().filter(|o| keep(o)).cloned().collect()
    }
}
