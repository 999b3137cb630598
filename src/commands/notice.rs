//! Admin notices: fire-and-forget messages about claims and releases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::orders::{Actor, Order, Released};

/// Event the administrator is told about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdminNotice {
    Claimed {
        order_id: String,
        actor_name: String,
        claimed_at: DateTime<Utc>,
        description: String,
    },
    Released {
        order_id: String,
        /// The worker whose claim was cleared.
        holder_name: String,
        /// Who performed the release (holder or admin).
        released_by: String,
        description: String,
    },
}

impl AdminNotice {
    pub fn claimed(order: &Order, actor: &Actor) -> Self {
        Self::Claimed {
            order_id: order.id.clone(),
            actor_name: actor.name.clone(),
            claimed_at: order.claimed_at().unwrap_or_else(Utc::now),
            description: order.description.clone(),
        }
    }

    pub fn released(released: &Released, actor: &Actor) -> Self {
        Self::Released {
            order_id: released.order.id.clone(),
            holder_name: released.previous.actor_name.clone(),
            released_by: actor.name.clone(),
            description: released.order.description.clone(),
        }
    }

    /// Render as the plain-text message sent to the administrator.
    pub fn text(&self) -> String {
        match self {
            Self::Claimed {
                order_id,
                actor_name,
                claimed_at,
                description,
            } => format!(
                "📢 Order #{order_id} taken!\n👤 User: {actor_name}\n⏰ Time: {}\n📝 Description: {description}",
                claimed_at.format("%d.%m.%Y %H:%M")
            ),
            Self::Released {
                order_id,
                holder_name,
                released_by,
                description,
            } => {
                let mut text = format!(
                    "⚠️ Order #{order_id} cancelled!\n👤 User: {holder_name}\n📝 Description: {description}"
                );
                if released_by != holder_name {
                    text.push_str(&format!("\n🔧 Released by: {released_by}"));
                }
                text
            }
        }
    }
}
