//! Intent types and reply definitions.

use std::fmt;

/// Everything a player can ask the bot to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Register and show the main menu.
    Start,

    /// Show help information.
    Help,

    /// Open the free case (subject to cooldown).
    OpenCase,

    /// Open a bought case token.
    OpenToken,

    /// Show rank, REP, coins and cooldown.
    Profile,

    /// Show a garage page (zero-based).
    Garage { page: usize },

    /// Show one car by catalog index.
    ViewItem(usize),

    /// Sell one car by catalog index.
    SellItem(usize),

    /// Show owned/total counts per rarity.
    Collection,

    /// Show the shop.
    Shop,

    /// Buy one case token.
    BuyCase,

    /// Go back to the main menu.
    Menu,

    /// Button that does nothing (page counter).
    Noop,
}

impl Intent {
    /// Parses an intent from message text.
    ///
    /// Accepts slash commands (with an optional `@botname` suffix) and the
    /// plain-text triggers used on reply keyboards. Leading emoji are ignored.
    /// Returns `None` if the text is not a known trigger.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text
            .trim()
            .trim_start_matches(|c: char| !c.is_alphanumeric() && c != '/')
            .trim();

        if let Some(command) = text.strip_prefix('/') {
            return Self::parse_slash(command);
        }

        match text.to_lowercase().as_str() {
            "open case" | "open" | "case" | "free case" => Some(Self::OpenCase),
            "open token" | "use token" => Some(Self::OpenToken),
            "profile" | "me" => Some(Self::Profile),
            "garage" | "my garage" | "cars" => Some(Self::Garage { page: 0 }),
            "collection" | "catalog" => Some(Self::Collection),
            "shop" | "store" => Some(Self::Shop),
            "buy case" | "buy" => Some(Self::BuyCase),
            "menu" => Some(Self::Menu),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    /// Parses `/command[@bot] [args]` with the slash already stripped.
    fn parse_slash(command: &str) -> Option<Self> {
        let (head, args) = match command.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (command, ""),
        };
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        match name.as_str() {
            "start" => Some(Self::Start),
            "help" | "h" => Some(Self::Help),
            "open" | "case" => Some(Self::OpenCase),
            "token" => Some(Self::OpenToken),
            "profile" | "me" => Some(Self::Profile),
            "garage" | "cars" => Some(Self::Garage {
                page: parse_page(args)?,
            }),
            "collection" => Some(Self::Collection),
            "shop" => Some(Self::Shop),
            "buy" => Some(Self::BuyCase),
            "menu" => Some(Self::Menu),
            _ => None,
        }
    }

    /// Parses callback data of the form `action:owner[:arg]`.
    ///
    /// Returns the owner the button was rendered for and the intent.
    #[must_use]
    pub fn parse_callback(data: &str) -> Option<(u64, Self)> {
        let mut parts = data.split(':');
        let action = parts.next()?;
        let owner: u64 = parts.next()?.parse().ok()?;
        let arg = parts.next();

        if parts.next().is_some() {
            return None;
        }

        let intent = match (action, arg) {
            ("open", None) => Self::OpenCase,
            ("token", None) => Self::OpenToken,
            ("profile", None) => Self::Profile,
            ("garage", None) => Self::Garage { page: 0 },
            ("garage", Some(page)) => Self::Garage {
                page: page.parse().ok()?,
            },
            ("car", Some(index)) => Self::ViewItem(index.parse().ok()?),
            ("sell", Some(index)) => Self::SellItem(index.parse().ok()?),
            ("coll", None) => Self::Collection,
            ("shop", None) => Self::Shop,
            ("buy", None) => Self::BuyCase,
            ("menu", None) => Self::Menu,
            ("help", None) => Self::Help,
            ("noop", None) => Self::Noop,
            _ => return None,
        };

        Some((owner, intent))
    }

    /// Encodes the intent as callback data for `owner`.
    #[must_use]
    pub fn callback_data(&self, owner: u64) -> String {
        match self {
            Self::Garage { page } => format!("garage:{owner}:{page}"),
            Self::ViewItem(index) => format!("car:{owner}:{index}"),
            Self::SellItem(index) => format!("sell:{owner}:{index}"),
            _ => format!("{}:{owner}", self.callback_action()),
        }
    }

    const fn callback_action(&self) -> &'static str {
        match self {
            Self::Start | Self::Menu => "menu",
            Self::Help => "help",
            Self::OpenCase => "open",
            Self::OpenToken => "token",
            Self::Profile => "profile",
            Self::Garage { .. } => "garage",
            Self::ViewItem(_) => "car",
            Self::SellItem(_) => "sell",
            Self::Collection => "coll",
            Self::Shop => "shop",
            Self::BuyCase => "buy",
            Self::Noop => "noop",
        }
    }

    /// Returns the intent name as it appears in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::OpenCase => "open",
            Self::OpenToken => "token",
            Self::Profile => "profile",
            Self::Garage { .. } => "garage",
            Self::ViewItem(_) => "view",
            Self::SellItem(_) => "sell",
            Self::Collection => "collection",
            Self::Shop => "shop",
            Self::BuyCase => "buy",
            Self::Menu => "menu",
            Self::Noop => "noop",
        }
    }

    /// Returns the slash commands with their descriptions.
    #[must_use]
    pub fn all_commands() -> Vec<(&'static str, &'static str)> {
        vec![
            ("start", "Main menu"),
            ("open", "Open the free case"),
            ("token", "Open a bought case token"),
            ("profile", "Rank, REP and coins"),
            ("garage", "Your cars"),
            ("collection", "Progress per rarity"),
            ("shop", "Buy case tokens"),
            ("help", "Show this help message"),
        ]
    }
}

/// Parses a 1-based page argument into a zero-based page.
fn parse_page(args: &str) -> Option<usize> {
    if args.is_empty() {
        return Some(0);
    }
    let page: usize = args.split_whitespace().next()?.parse().ok()?;
    Some(page.saturating_sub(1))
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Garage { page } => write!(f, "garage {page}"),
            Self::ViewItem(index) => write!(f, "view {index}"),
            Self::SellItem(index) => write!(f, "sell {index}"),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Who sent an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: u64,
    pub name: Option<String>,
}

impl Player {
    #[must_use]
    pub fn new(id: u64, name: Option<String>) -> Self {
        Self { id, name }
    }

    /// Name used in messages.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("driver")
    }
}

/// A button row entry for a car in the garage menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarButton {
    pub index: usize,
    pub label: String,
}

/// Which keyboard accompanies a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Menu {
    /// No keyboard.
    None,
    /// Open case / profile / garage / collection / shop.
    Main,
    /// Car buttons plus page navigation.
    Garage {
        cars: Vec<CarButton>,
        page: usize,
        total_pages: usize,
    },
    /// Sell button for one car.
    Car { index: usize },
    /// Buy button, plus open button when tokens are held.
    Shop { has_tokens: bool },
    /// Single button back to the garage.
    BackToGarage,
    /// Single button back to the main menu.
    BackToMain,
}

/// How a reply should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// Send a new message.
    Send,
    /// Replace the message the button belonged to.
    Edit,
    /// Pop-up on a button press, plain message otherwise.
    Alert,
    /// Acknowledge the button press without output.
    Silent,
}

/// Result of handling an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text to show the player.
    pub text: String,

    /// Keyboard to attach.
    pub menu: Menu,

    /// Delivery mode.
    pub mode: ReplyMode,
}

impl Reply {
    /// Creates a reply sent as a new message.
    #[must_use]
    pub fn send(text: impl Into<String>, menu: Menu) -> Self {
        Self {
            text: text.into(),
            menu,
            mode: ReplyMode::Send,
        }
    }

    /// Creates a reply that replaces the current message.
    #[must_use]
    pub fn edit(text: impl Into<String>, menu: Menu) -> Self {
        Self {
            text: text.into(),
            menu,
            mode: ReplyMode::Edit,
        }
    }

    /// Creates a short pop-up reply.
    #[must_use]
    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: Menu::None,
            mode: ReplyMode::Alert,
        }
    }

    /// Creates a reply with no visible output.
    #[must_use]
    pub const fn silent() -> Self {
        Self {
            text: String::new(),
            menu: Menu::None,
            mode: ReplyMode::Silent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_commands() {
        assert_eq!(Intent::parse("/start"), Some(Intent::Start));
        assert_eq!(Intent::parse("/open"), Some(Intent::OpenCase));
        assert_eq!(Intent::parse("/profile"), Some(Intent::Profile));
        assert_eq!(Intent::parse("/shop"), Some(Intent::Shop));
    }

    #[test]
    fn test_parse_slash_with_bot_name() {
        assert_eq!(Intent::parse("/start@CarCaseBot"), Some(Intent::Start));
        assert_eq!(Intent::parse("/OPEN@CarCaseBot"), Some(Intent::OpenCase));
    }

    #[test]
    fn test_parse_garage_page() {
        assert_eq!(Intent::parse("/garage"), Some(Intent::Garage { page: 0 }));
        assert_eq!(Intent::parse("/garage 3"), Some(Intent::Garage { page: 2 }));
        assert_eq!(Intent::parse("/garage 0"), Some(Intent::Garage { page: 0 }));
        assert_eq!(Intent::parse("/garage two"), None);
    }

    #[test]
    fn test_parse_text_triggers() {
        assert_eq!(Intent::parse("Open case"), Some(Intent::OpenCase));
        assert_eq!(Intent::parse("📦 Open case"), Some(Intent::OpenCase));
        assert_eq!(Intent::parse("  🏎 Garage  "), Some(Intent::Garage { page: 0 }));
        assert_eq!(Intent::parse("SHOP"), Some(Intent::Shop));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Intent::parse("hello there"), None);
        assert_eq!(Intent::parse("/unknown"), None);
        assert_eq!(Intent::parse(""), None);
    }

    #[test]
    fn test_callback_data_parses_back() {
        let owner = 123_456_789;
        for intent in [
            Intent::OpenCase,
            Intent::OpenToken,
            Intent::Profile,
            Intent::Garage { page: 4 },
            Intent::ViewItem(7),
            Intent::SellItem(10),
            Intent::Collection,
            Intent::Shop,
            Intent::BuyCase,
            Intent::Menu,
            Intent::Help,
            Intent::Noop,
        ] {
            let data = intent.callback_data(owner);
            assert!(data.len() <= 64, "callback data too long: {data}");
            assert_eq!(Intent::parse_callback(&data), Some((owner, intent)));
        }
    }

    #[test]
    fn test_start_callback_maps_to_menu() {
        assert_eq!(
            Intent::parse_callback(&Intent::Start.callback_data(1)),
            Some((1, Intent::Menu))
        );
    }

    #[test]
    fn test_parse_callback_rejects_garbage() {
        assert_eq!(Intent::parse_callback("open"), None);
        assert_eq!(Intent::parse_callback("open:abc"), None);
        assert_eq!(Intent::parse_callback("car:1"), None);
        assert_eq!(Intent::parse_callback("car:1:x"), None);
        assert_eq!(Intent::parse_callback("open:1:2:3"), None);
        assert_eq!(Intent::parse_callback("fly:1"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Intent::Garage { page: 2 }.to_string(), "garage 2");
        assert_eq!(Intent::SellItem(3).to_string(), "sell 3");
        assert_eq!(Intent::Profile.to_string(), "profile");
    }

    #[test]
    fn test_player_display_name() {
        assert_eq!(Player::new(1, None).display_name(), "driver");
        assert_eq!(Player::new(1, Some("Max".to_owned())).display_name(), "Max");
    }
}
