//! Command interpreter: turns actions into store calls and responses.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::action::{Action, ListFilter};
use super::notice::AdminNotice;
use super::parse::parse_order_spec;
use super::render::{self, Response};
use crate::error::CommandError;
use crate::orders::{Actor, OrderStore};

/// Dispatches actions against the order store.
///
/// Soft failures never escape as errors: every entry point returns a
/// [`Response`], flagged `is_error` when the action was refused.
pub struct Interpreter {
    store: Arc<OrderStore>,
    notices: Option<mpsc::UnboundedSender<AdminNotice>>,
}

impl Interpreter {
    /// Create an interpreter that does not emit admin notices.
    pub fn new(store: Arc<OrderStore>) -> Self {
        Self {
            store,
            notices: None,
        }
    }

    /// Builder: send admin notices on `tx` after successful claims and releases.
    pub fn with_notices(mut self, tx: mpsc::UnboundedSender<AdminNotice>) -> Self {
        self.notices = Some(tx);
        self
    }

    pub fn store(&self) -> &Arc<OrderStore> {
        &self.store
    }

    /// Single dispatch over every action kind.
    pub fn handle(&self, action: &Action, actor: &Actor) -> Response {
        debug!(action = %action, actor_id = %actor.id, "Handling action");

        match action {
            Action::Start | Action::MainMenu => self.request_main_menu(actor),
            Action::List { filter } => self.request_order_list(*filter, actor),
            Action::ViewOrder { id, origin } => self.request_order_detail(id, *origin, actor),
            Action::Claim { id } => self.claim_order(id, actor),
            Action::Release { id } => self.release_order(id, actor),
            Action::CreateOrder { raw_text } => self.create_order(raw_text, actor),
            Action::CreatePrompt => self.request_create_prompt(actor),
            Action::Stats => self.request_stats(actor),
        }
    }

    pub fn request_main_menu(&self, actor: &Actor) -> Response {
        render::main_menu(actor)
    }

    pub fn request_order_list(&self, filter: ListFilter, actor: &Actor) -> Response {
        let orders = match filter {
            ListFilter::Unclaimed => self.store.list_unclaimed(),
            ListFilter::ClaimedByActor => self.store.list_claimed_by(&actor.id),
            ListFilter::All => self.store.list_all(),
        };
        render::order_list(filter, &orders)
    }

    pub fn request_order_detail(&self, id: &str, origin: ListFilter, actor: &Actor) -> Response {
        soft(
            self.store
                .get(id)
                .map(|order| render::order_detail(&order, origin, actor))
                .map_err(CommandError::from),
        )
    }

    pub fn claim_order(&self, id: &str, actor: &Actor) -> Response {
        soft(self.store.claim(id, actor).map_err(CommandError::from).map(|order| {
            self.notify(AdminNotice::claimed(&order, actor));
            render::claimed(&order)
        }))
    }

    pub fn release_order(&self, id: &str, actor: &Actor) -> Response {
        soft(self.store.release(id, actor).map_err(CommandError::from).map(|released| {
            self.notify(AdminNotice::released(&released, actor));
            render::released(&released, actor)
        }))
    }

    /// Admin only. `raw_text` must be `<id>: <description>`.
    pub fn create_order(&self, raw_text: &str, actor: &Actor) -> Response {
        soft(self.try_create_order(raw_text, actor))
    }

    fn try_create_order(&self, raw_text: &str, actor: &Actor) -> Result<Response, CommandError> {
        require_admin(actor)?;
        let spec = parse_order_spec(raw_text)?;
        let replaced = self.store.create(spec.id.as_str(), spec.description)?;
        Ok(render::created(&spec.id, replaced, actor))
    }

    pub fn request_create_prompt(&self, actor: &Actor) -> Response {
        soft(require_admin(actor).map(|()| render::create_prompt()))
    }

    pub fn request_stats(&self, actor: &Actor) -> Response {
        soft(require_admin(actor).map(|()| render::stats(&self.store.stats())))
    }

    fn notify(&self, notice: AdminNotice) {
        let Some(tx) = &self.notices else {
            return;
        };
        // The mutation has already committed; a dropped notice is only logged.
        if tx.send(notice).is_err() {
            warn!("Admin notice receiver closed; notice dropped");
        }
    }
}

fn require_admin(actor: &Actor) -> Result<(), CommandError> {
    if actor.is_admin {
        Ok(())
    } else {
        debug!(actor_id = %actor.id, "Admin-only action refused");
        Err(CommandError::Unauthorized)
    }
}

fn soft(result: Result<Response, CommandError>) -> Response {
    result.unwrap_or_else(|err| {
        debug!(error = %err, "Action refused");
        render::command_error(&err)
    })
}
