//! Order data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who is performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Stable identity used for ownership checks.
    pub id: String,
    /// Display handle shown in listings and notifications.
    pub name: String,
    pub is_admin: bool,
}

impl Actor {
    /// An ordinary worker.
    pub fn worker(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_admin: false,
        }
    }

    /// The administrator.
    pub fn admin(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_admin: true,
        }
    }
}

/// An active claim on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub actor_id: String,
    pub actor_name: String,
    pub claimed_at: DateTime<Utc>,
}

impl Claim {
    /// Claim time in the listing format (`dd.mm.YYYY HH:MM`).
    pub fn claimed_at_display(&self) -> String {
        self.claimed_at.format("%d.%m.%Y %H:%M").to_string()
    }
}

/// A claimable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub description: String,
    /// Holder and time of the current claim. `None` means unclaimed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<Claim>,
}

impl Order {
    /// Create a new, unclaimed order.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            claim: None,
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.claim.is_some()
    }

    /// Whether `actor_id` holds the current claim.
    pub fn is_claimed_by(&self, actor_id: &str) -> bool {
        self.claim.as_ref().is_some_and(|c| c.actor_id == actor_id)
    }

    pub fn claimed_by(&self) -> Option<&str> {
        self.claim.as_ref().map(|c| c.actor_id.as_str())
    }

    pub fn claimed_at(&self) -> Option<DateTime<Utc>> {
        self.claim.as_ref().map(|c| c.claimed_at)
    }

    /// Short button label: `#<id>: <first 15 chars>...`.
    pub fn preview(&self) -> String {
        let head: String = self.description.chars().take(15).collect();
        format!("#{}: {}...", self.id, head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_order_is_unclaimed() {
        let order = Order::new("1", "Deliver pizza");
        assert!(!order.is_claimed());
        assert_eq!(order.claimed_by(), None);
        assert_eq!(order.claimed_at(), None);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let order = Order::new("3", "Доставить пиццу на улицу Ленина");
        assert_eq!(order.preview(), "#3: Доставить пиццу...");
    }

    #[test]
    fn preview_short_description() {
        assert_eq!(Order::new("1", "Tea").preview(), "#1: Tea...");
    }

    #[test]
    fn claimed_by_checks_id_not_name() {
        let mut order = Order::new("1", "x");
        order.claim = Some(Claim {
            actor_id: "42".into(),
            actor_name: "alice".into(),
            claimed_at: Utc::now(),
        });
        assert!(order.is_claimed_by("42"));
        assert!(!order.is_claimed_by("alice"));
    }

    #[test]
    fn claimed_at_display_format() {
        let claim = Claim {
            actor_id: "1".into(),
            actor_name: "a".into(),
            claimed_at: DateTime::parse_from_rfc3339("2024-03-05T07:08:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        assert_eq!(claim.claimed_at_display(), "05.03.2024 07:08");
    }
}
