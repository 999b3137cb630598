//! End-to-end tests: scripted channels feed actions through the bot runtime
//! and record what every actor and the administrator get back.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use tokio::time::timeout;

use order_broker::bot::Bot;
use order_broker::channels::{ActionStream, Channel, ChannelManager, InboundAction};
use order_broker::commands::{Action, Interpreter, ListFilter, Response};
use order_broker::error::ChannelError;
use order_broker::orders::{Actor, CreatePolicy, OrderStore};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

type Log = Arc<Mutex<Vec<(String, Response)>>>;

/// Replays a fixed script and records replies (by actor id) and admin notices.
struct ScriptedChannel {
    script: Vec<(Actor, Action)>,
    replies: Log,
    notices: Arc<Mutex<Vec<String>>>,
}

impl ScriptedChannel {
    fn new(script: Vec<(Actor, Action)>) -> Self {
        Self {
            script,
            replies: Arc::default(),
            notices: Arc::default(),
        }
    }
}

#[async_trait]
impl Channel for ScriptedChannel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn start(&self) -> Result<ActionStream, ChannelError> {
        let inbound: Vec<_> = self
            .script
            .iter()
            .map(|(actor, action)| InboundAction::new("scripted", actor.clone(), action.clone()))
            .collect();
        Ok(Box::pin(stream::iter(inbound)))
    }

    async fn respond(&self, inbound: &InboundAction, response: Response) -> Result<(), ChannelError> {
        self.replies
            .lock()
            .unwrap()
            .push((inbound.actor.id.clone(), response));
        Ok(())
    }

    async fn notify_admin(&self, text: &str) -> Result<(), ChannelError> {
        self.notices.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

fn admin() -> Actor {
    Actor::admin("1", "@boss")
}

fn alice() -> Actor {
    Actor::worker("2", "@alice")
}

fn bob() -> Actor {
    Actor::worker("3", "@bob")
}

fn create(text: &str) -> Action {
    Action::CreateOrder {
        raw_text: text.into(),
    }
}

/// Run the script to completion; return replies, notices and the store.
async fn run_script(
    script: Vec<(Actor, Action)>,
) -> (Vec<(String, Response)>, Vec<String>, Arc<OrderStore>) {
    let channel = ScriptedChannel::new(script);
    let (replies, notices) = (Arc::clone(&channel.replies), Arc::clone(&channel.notices));

    let mut channels = ChannelManager::new();
    channels.add(Box::new(channel));

    let store = Arc::new(OrderStore::new());
    timeout(TEST_TIMEOUT, Bot::new(Arc::clone(&store), channels).run())
        .await
        .expect("bot run timed out")
        .expect("bot run failed");

    let replies = replies.lock().unwrap().clone();
    let notices = notices.lock().unwrap().clone();
    (replies, notices, store)
}

#[tokio::test]
async fn create_claim_release_flow() {
    let (replies, notices, store) = run_script(vec![
        (admin(), create("1: Deliver pizza to the office")),
        (alice(), Action::list(ListFilter::Unclaimed)),
        (alice(), Action::claim("1")),
        (bob(), Action::claim("1")),
        (alice(), Action::list(ListFilter::ClaimedByActor)),
        (alice(), Action::release("1")),
    ])
    .await;

    assert_eq!(replies.len(), 6);
    assert!(replies[0].1.text.contains("Order #1 added"));

    // The unclaimed list links straight to the order.
    assert!(replies[1].1.menu.iter().any(|o| o.action == Action::view("1", ListFilter::Unclaimed)));

    assert!(!replies[2].1.is_error);
    assert!(replies[2].1.text.contains("You took order #1"));

    let (who, losing) = &replies[3];
    assert_eq!(who, "3");
    assert!(losing.is_error);
    assert!(losing.text.contains("already taken by @alice"));

    assert!(replies[4].1.menu.iter().any(|o| o.label.starts_with("#1: ")));
    assert!(replies[5].1.text.contains("You cancelled order #1"));

    // One notice for the claim, one for the release; the failed claim sends none.
    assert_eq!(notices.len(), 2);
    assert!(notices[0].contains("Order #1 taken"));
    assert!(notices[0].contains("@alice"));
    assert!(notices[1].contains("#1"));

    assert!(!store.get("1").unwrap().is_claimed());
}

#[tokio::test]
async fn workers_cannot_create_orders() {
    let (replies, notices, store) = run_script(vec![
        (alice(), create("9: Sneaky order")),
        (alice(), Action::CreatePrompt),
        (alice(), Action::Stats),
    ])
    .await;

    assert!(replies.iter().all(|(_, r)| r.is_error));
    assert!(notices.is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn admin_can_release_someone_elses_order() {
    let (replies, notices, store) = run_script(vec![
        (admin(), create("5: Fix the printer")),
        (bob(), Action::claim("5")),
        (alice(), Action::release("5")),
        (admin(), Action::release("5")),
    ])
    .await;

    assert!(replies[2].1.is_error, "a non-holder worker must not release");
    assert!(!replies[3].1.is_error);
    assert!(replies[3].1.text.contains("released from @bob"));

    assert_eq!(notices.len(), 2);
    assert!(notices[1].contains("@boss"));
    assert!(!store.get("5").unwrap().is_claimed());
}

#[tokio::test]
async fn malformed_order_offers_a_retry() {
    let (replies, _, store) = run_script(vec![(admin(), create("no separator here"))]).await;

    let (_, response) = &replies[0];
    assert!(response.is_error);
    assert!(response.menu.iter().any(|o| o.action == Action::CreatePrompt));
    assert!(store.is_empty());
}

#[tokio::test]
async fn concurrent_claims_have_exactly_one_winner() {
    let store = Arc::new(OrderStore::with_policy(CreatePolicy::Reject));
    let interpreter = Arc::new(Interpreter::new(Arc::clone(&store)));
    interpreter.create_order("42: Contested job", &admin());

    let mut handles = Vec::new();
    for i in 0..16 {
        let interpreter = Arc::clone(&interpreter);
        handles.push(tokio::spawn(async move {
            let worker = Actor::worker(format!("w{i}"), format!("worker{i}"));
            interpreter.claim_order("42", &worker)
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if !handle.await.unwrap().is_error {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);

    let stats = store.stats();
    assert!(stats.unclaimed.is_empty());
    assert_eq!(stats.claimed.len(), 1);
}
