//! Response descriptors and the texts/menus the bot shows.
//!
//! Everything here is plain text; transports decide how to draw the menu.

use serde::{Deserialize, Serialize};

use super::action::{Action, ListFilter};
use crate::error::CommandError;
use crate::orders::{Actor, Order, OrderStats, Released};

/// One menu entry: a label and the action it triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    pub label: String,
    pub action: Action,
}

/// What the transport should show the actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub text: String,
    /// Menu options, in display order.
    pub menu: Vec<MenuOption>,
    pub is_error: bool,
}

impl Response {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: Vec::new(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: Vec::new(),
            is_error: true,
        }
    }

    /// Builder: append a menu option.
    pub fn with_option(mut self, label: impl Into<String>, action: Action) -> Self {
        self.menu.push(MenuOption {
            label: label.into(),
            action,
        });
        self
    }
}

const BACK_TO_MENU: &str = "🔙 Main menu";
const ORDER_LIST: &str = "📋 Order list";
const MY_ORDERS: &str = "🧾 My orders";
const CHECK_AGAIN: &str = "🔄 Check again";

pub fn main_menu(actor: &Actor) -> Response {
    let response = Response::ok("Main menu:")
        .with_option(ORDER_LIST, Action::list(ListFilter::Unclaimed))
        .with_option(MY_ORDERS, Action::list(ListFilter::ClaimedByActor));

    if !actor.is_admin {
        return response;
    }
    response
        .with_option("🗂 All orders", Action::list(ListFilter::All))
        .with_option("📊 Statistics", Action::Stats)
        .with_option("➕ Add order", Action::CreatePrompt)
}

pub fn order_list(filter: ListFilter, orders: &[Order]) -> Response {
    let (title, empty) = match filter {
        ListFilter::Unclaimed => ("Available orders:", "No available orders"),
        ListFilter::ClaimedByActor => ("Your orders:", "You have no taken orders yet"),
        ListFilter::All => ("All orders:", "No orders yet"),
    };

    let mut response = Response::ok(if orders.is_empty() { empty } else { title });
    for order in orders {
        response = response.with_option(order.preview(), Action::view(&order.id, filter));
    }
    if orders.is_empty() {
        response = response.with_option(CHECK_AGAIN, Action::list(filter));
    }

    match filter {
        ListFilter::Unclaimed => response
            .with_option(MY_ORDERS, Action::list(ListFilter::ClaimedByActor))
            .with_option(BACK_TO_MENU, Action::MainMenu),
        ListFilter::ClaimedByActor if orders.is_empty() => response
            .with_option(ORDER_LIST, Action::list(ListFilter::Unclaimed))
            .with_option(BACK_TO_MENU, Action::MainMenu),
        _ => response.with_option("🔙 Back", Action::MainMenu),
    }
}

pub fn order_detail(order: &Order, origin: ListFilter, actor: &Actor) -> Response {
    let mut text = format!(
        "📋 Order #{}\n\nDescription:\n{}\n\nStatus: {}\n",
        order.id,
        order.description,
        if order.is_claimed() { "✅ Taken" } else { "🟢 Available" }
    );
    if let Some(claim) = &order.claim {
        text.push_str(&format!("👤 Worker: {}\n", claim.actor_name));
        text.push_str(&format!("⏰ Time: {}\n", claim.claimed_at_display()));
    }

    let mut response = Response::ok(text);
    if !order.is_claimed() {
        response = response.with_option("✅ Take order", Action::claim(&order.id));
    } else if actor.is_admin || order.is_claimed_by(&actor.id) {
        response = response.with_option("❌ Cancel", Action::release(&order.id));
    }
    response.with_option("🔙 Back", Action::list(origin))
}

pub fn claimed(order: &Order) -> Response {
    Response::ok(format!(
        "✅ You took order #{}!\n\nDescription:\n{}\n\nYou can find it under 'My orders'.",
        order.id, order.description
    ))
    .with_option(MY_ORDERS, Action::list(ListFilter::ClaimedByActor))
    .with_option(ORDER_LIST, Action::list(ListFilter::Unclaimed))
}

pub fn released(released: &Released, actor: &Actor) -> Response {
    let order = &released.order;
    let headline = if released.previous.actor_id == actor.id {
        format!("❌ You cancelled order #{}", order.id)
    } else {
        format!(
            "❌ Order #{} released from {}",
            order.id, released.previous.actor_name
        )
    };
    Response::ok(format!(
        "{headline}\n\nDescription:\n{}\n\nThe order is available again.",
        order.description
    ))
    .with_option("🔙 To my orders", Action::list(ListFilter::ClaimedByActor))
    .with_option("📋 To order list", Action::list(ListFilter::Unclaimed))
}

pub fn created(id: &str, replaced: bool, actor: &Actor) -> Response {
    let verb = if replaced { "replaced" } else { "added" };
    let menu = main_menu(actor);
    Response {
        text: format!("✅ Order #{id} {verb}!"),
        ..menu
    }
}

pub fn create_prompt() -> Response {
    Response::ok("Send the order as:\n<id>: <description>\nExample: 1: Deliver pizza")
        .with_option(BACK_TO_MENU, Action::MainMenu)
}

pub fn stats(stats: &OrderStats) -> Response {
    let mut lines = vec![
        "📊 Order statistics".to_string(),
        String::new(),
        "🔄 Available orders:".to_string(),
    ];

    if stats.unclaimed.is_empty() {
        lines.push("No available orders".into());
    }
    for order in &stats.unclaimed {
        lines.push(format!("🔹 #{}: {}", order.id, order.description));
    }

    lines.push(String::new());
    lines.push("✔️ Taken orders:".into());

    if stats.claimed.is_empty() {
        lines.push("No taken orders".into());
    }
    for order in &stats.claimed {
        lines.push(format!("✅ #{}: {}", order.id, order.description));
        if let Some(claim) = &order.claim {
            lines.push(format!("👤 {}", claim.actor_name));
            lines.push(format!("⏰ {}", claim.claimed_at_display()));
        }
        lines.push(String::new());
    }

    Response::ok(lines.join("\n")).with_option("🔙 Back", Action::MainMenu)
}

/// Turn a soft failure into an error response.
pub fn command_error(err: &CommandError) -> Response {
    let response = Response::error(format!("❌ {err}"));
    match err {
        CommandError::Parse { .. } | CommandError::IdTooLong { .. } => {
            response.with_option("➕ Try again", Action::CreatePrompt)
        }
        _ => response.with_option(BACK_TO_MENU, Action::MainMenu),
    }
}
