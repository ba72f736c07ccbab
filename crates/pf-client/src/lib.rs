//! PlayFab client impersonating Minecraft: Bedrock Edition
//!
//! # Login
//!
//! Building a [`PlayFabClient`] runs the whole login before returning:
//!
//! 1. A [`TokenSource`] supplies a Microsoft access token.
//! 2. An [`XblExchange`] turns it into an XSTS token for `rp://playfabapi.com/`.
//! 3. `Client/LoginWithXbox` returns the player's PlayFab ID and an entity token.
//! 4. `Authentication/GetEntityToken` swaps that token for the session's.
//!
//! Any failure is returned as is and no client is created. Nothing is retried.
//!
//! # Example
//!
//! ```no_run
//! use pf_client::{
//!     Filter, HttpTimeouts, LiveTokenSource, MsTokens, PlayFabClient, PlayFabConfig,
//!     XboxLiveExchange,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let timeouts = HttpTimeouts::default();
//! let tokens = MsTokens::from_refresh_token("M.C5..".to_string());
//! let source = LiveTokenSource::new(tokens, &timeouts)?;
//! let exchange = XboxLiveExchange::new(&timeouts)?;
//! let client = PlayFabClient::connect(PlayFabConfig::minecraft(), &source, &exchange).await?;
//!
//! let emotes = client
//!     .search(&Filter {
//!         count: true,
//!         filter: "(contentType eq 'PersonaDurable' and \
//!                  displayProperties/pieceType eq 'persona_emote')"
//!             .to_string(),
//!         order_by: "creationDate desc".to_string(),
//!         scid: "4fc10100-5f7a-4470-899b-280835760c07".to_string(),
//!         limit: 300,
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{} keys", emotes.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Error reporting
//!
//! Every request asks PlayFab to report errors as HTTP 200. Typed responses
//! such as the login fail to decode when the payload is missing, but an
//! untyped [`Envelope`] decodes fine; endpoints built on
//! [`PlayFabClient::request`] must check [`Envelope::application_error`]
//! themselves.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod errors;
pub mod live;
pub mod login;
pub mod models;
pub mod requester;
pub mod session;
pub mod token;
pub mod transport;

// Re-export main types
pub use client::PlayFabClient;
pub use config::{HttpTimeouts, PlayFabConfig, XboxEndpoints};
pub use endpoints::{ApplicationError, Envelope, EnvelopeData, Filter};
pub use errors::{CredentialError, PlayFabError, Result, XboxAuthError, XstsError};
pub use live::{LiveTokenSource, XboxLiveExchange};
pub use requester::Requester;
pub use session::{MsTokens, Session};
pub use token::{StaticTokenSource, StaticXblExchange, TokenSource, XblAssertion, XblExchange};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
