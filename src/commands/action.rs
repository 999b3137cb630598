//! Actions: the tagged union every transport converts its input into.
//!
//! Buttons carry actions as compact string tags (`claim:7`, `view:mine:7`)
//! so they fit in Telegram's callback data. Typed input goes through
//! [`Action::from_text`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest button payload a transport has to carry (Telegram's callback data cap).
pub const MAX_TAG_LEN: usize = 64;

/// Longest order id whose every button tag still fits in [`MAX_TAG_LEN`].
/// The widest tag is `view:unclaimed:<id>`.
pub const MAX_ORDER_ID_LEN: usize = MAX_TAG_LEN - "view:unclaimed:".len();

/// Which orders a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListFilter {
    /// Orders nobody has taken.
    Unclaimed,
    /// Orders held by the requesting actor.
    ClaimedByActor,
    /// Every order.
    All,
}

impl ListFilter {
    fn tag(self) -> &'static str {
        match self {
            Self::Unclaimed => "unclaimed",
            Self::ClaimedByActor => "mine",
            Self::All => "all",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "unclaimed" => Some(Self::Unclaimed),
            "mine" => Some(Self::ClaimedByActor),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Something an actor asked the bot to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Start,
    MainMenu,
    List { filter: ListFilter },
    /// Order detail; `origin` is the listing the "Back" button returns to.
    ViewOrder { id: String, origin: ListFilter },
    Claim { id: String },
    Release { id: String },
    CreateOrder { raw_text: String },
    /// Show the `id: description` format hint.
    CreatePrompt,
    Stats,
}

impl Action {
    pub fn list(filter: ListFilter) -> Self {
        Self::List { filter }
    }

    pub fn view(id: impl Into<String>, origin: ListFilter) -> Self {
        Self::ViewOrder {
            id: id.into(),
            origin,
        }
    }

    pub fn claim(id: impl Into<String>) -> Self {
        Self::Claim { id: id.into() }
    }

    pub fn release(id: impl Into<String>) -> Self {
        Self::Release { id: id.into() }
    }

    /// Compact string form used as button payload.
    pub fn tag(&self) -> String {
        match self {
            Self::Start => "start".into(),
            Self::MainMenu => "menu".into(),
            Self::List { filter } => format!("list:{}", filter.tag()),
            Self::ViewOrder { id, origin } => format!("view:{}:{id}", origin.tag()),
            Self::Claim { id } => format!("claim:{id}"),
            Self::Release { id } => format!("release:{id}"),
            Self::CreateOrder { raw_text } => format!("create:{raw_text}"),
            Self::CreatePrompt => "add_prompt".into(),
            Self::Stats => "stats".into(),
        }
    }

    /// Parse a button tag. Returns `None` for anything unrecognised.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let (head, rest) = match tag.split_once(':') {
            Some((head, rest)) => (head, Some(rest)),
            None => (tag, None),
        };

        let id = |rest: Option<&str>| rest.filter(|r| !r.is_empty()).map(str::to_string);

        match (head, rest) {
            ("start", None) => Some(Self::Start),
            ("menu", None) => Some(Self::MainMenu),
            ("stats", None) => Some(Self::Stats),
            ("add_prompt", None) => Some(Self::CreatePrompt),
            ("list", Some(filter)) => ListFilter::from_tag(filter).map(Self::list),
            ("view", Some(rest)) => {
                let (origin, id) = rest.split_once(':')?;
                let origin = ListFilter::from_tag(origin)?;
                (!id.is_empty()).then(|| Self::view(id, origin))
            }
            ("claim", rest) => id(rest).map(|id| Self::Claim { id }),
            ("release", rest) => id(rest).map(|id| Self::Release { id }),
            ("create", Some(raw)) => Some(Self::CreateOrder {
                raw_text: raw.to_string(),
            }),
            _ => None,
        }
    }

    /// Parse typed input: a slash command, or any other text as an order to create.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        let (command, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (trimmed, ""),
        };
        // Telegram appends the bot name in groups: /claim@order_bot 7
        let command = command.split('@').next().unwrap_or(command).to_lowercase();

        match (command.as_str(), arg) {
            ("/start", _) => Self::Start,
            ("/menu", _) => Self::MainMenu,
            ("/list", _) => Self::list(ListFilter::Unclaimed),
            ("/mine", _) => Self::list(ListFilter::ClaimedByActor),
            ("/all", _) => Self::list(ListFilter::All),
            ("/stats", _) => Self::Stats,
            ("/add", "") => Self::CreatePrompt,
            ("/add", spec) => Self::CreateOrder {
                raw_text: spec.to_string(),
            },
            ("/view", id) if !id.is_empty() => Self::view(id, ListFilter::Unclaimed),
            ("/claim" | "/take", id) if !id.is_empty() => Self::claim(id),
            ("/release" | "/cancel", id) if !id.is_empty() => Self::release(id),
            // Unknown or incomplete commands get the menu rather than a create attempt.
            (c, _) if c.starts_with('/') => Self::MainMenu,
            _ => Self::CreateOrder {
                raw_text: text.to_string(),
            },
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_tags_parse_back() {
        let actions = [
            Action::MainMenu,
            Action::Stats,
            Action::CreatePrompt,
            Action::list(ListFilter::ClaimedByActor),
            Action::view("12", ListFilter::All),
            Action::claim("12"),
            Action::release("A-7"),
        ];
        for action in actions {
            assert_eq!(Action::from_tag(&action.tag()), Some(action));
        }
    }

    #[test]
    fn longest_id_fits_every_tag() {
        let id = "9".repeat(MAX_ORDER_ID_LEN);
        for filter in [ListFilter::Unclaimed, ListFilter::ClaimedByActor, ListFilter::All] {
            assert!(Action::view(&id, filter).tag().len() <= MAX_TAG_LEN);
            assert!(Action::list(filter).tag().len() <= MAX_TAG_LEN);
        }
        assert!(Action::claim(&id).tag().len() <= MAX_TAG_LEN);
        assert!(Action::release(&id).tag().len() <= MAX_TAG_LEN);
        assert_eq!(Action::view(&id, ListFilter::Unclaimed).tag().len(), MAX_TAG_LEN);
    }

    #[test]
    fn view_tag_layout() {
        assert_eq!(Action::view("5", ListFilter::Unclaimed).tag(), "view:unclaimed:5");
        assert_eq!(
            Action::from_tag("view:mine:5"),
            Some(Action::view("5", ListFilter::ClaimedByActor))
        );
    }

    #[test]
    fn malformed_tags_are_rejected() {
        for tag in ["", "claim", "claim:", "view:5", "view:bogus:5", "list:x", "menu:1", "nope"] {
            assert_eq!(Action::from_tag(tag), None, "tag {tag:?}");
        }
    }

    #[test]
    fn slash_commands() {
        assert_eq!(Action::from_text("/start"), Action::Start);
        assert_eq!(Action::from_text(" /MENU "), Action::MainMenu);
        assert_eq!(Action::from_text("/list"), Action::list(ListFilter::Unclaimed));
        assert_eq!(Action::from_text("/mine"), Action::list(ListFilter::ClaimedByActor));
        assert_eq!(Action::from_text("/all"), Action::list(ListFilter::All));
        assert_eq!(Action::from_text("/stats"), Action::Stats);
        assert_eq!(Action::from_text("/add"), Action::CreatePrompt);
        assert_eq!(Action::from_text("/claim 3"), Action::claim("3"));
        assert_eq!(Action::from_text("/take@order_bot 3"), Action::claim("3"));
        assert_eq!(Action::from_text("/cancel 3"), Action::release("3"));
        assert_eq!(
            Action::from_text("/view 3"),
            Action::view("3", ListFilter::Unclaimed)
        );
    }

    #[test]
    fn add_with_argument_creates() {
        assert_eq!(
            Action::from_text("/add 4: Wash car"),
            Action::CreateOrder {
                raw_text: "4: Wash car".into()
            }
        );
    }

    #[test]
    fn plain_text_becomes_create() {
        assert_eq!(
            Action::from_text("1: Deliver pizza"),
            Action::CreateOrder {
                raw_text: "1: Deliver pizza".into()
            }
        );
    }

    #[test]
    fn incomplete_or_unknown_command_shows_menu() {
        assert_eq!(Action::from_text("/claim"), Action::MainMenu);
        assert_eq!(Action::from_text("/frobnicate 1"), Action::MainMenu);
    }
}
