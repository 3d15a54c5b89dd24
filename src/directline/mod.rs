//! DirectLine bot-channel client.
//!
//! A session mints a token from the channel secret, opens one conversation,
//! then exchanges activities with the bot over plain REST calls:
//!
//! ```ignore
//! let mut session = ChatSession::new(&config.directline, config.request_timeout())?;
//! session.start().await?;
//! let interaction = session.run_interaction("hello").await?;
//! print!("{interaction}");
//! ```

mod client;
mod error;
mod types;


pub use client::ChatSession;
pub use error::Error;
pub use types::{
    Activity, ActivitySet, AuthToken, ChannelAccount, Conversation, DEFAULT_BASE_URL, Interaction,
};
