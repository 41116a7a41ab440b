pub mod discord;
pub mod traits;
pub mod yahoo;

pub use discord::{build_payload, DiscordNotifier, WebhookPayload};
pub use traits::{MarketDataSource, Notifier};
pub use yahoo::YahooClient;
