//! Two-step PlayFab login
//!
//! 1. The Microsoft token is exchanged for an XSTS assertion and sent to
//!    `Client/LoginWithXbox`, yielding the player's PlayFab ID and a first
//!    entity token.
//! 2. That token authorizes `Authentication/GetEntityToken`, whose token is
//!    the one used for the rest of the session.
//!
//! Each step consumes the previous step's value, so a [`Session`] only exists
//! once both requests have succeeded.

use tracing::{debug, info, instrument};

use crate::config::{RP_PLAYFAB, minecraft, paths};
use crate::errors::Result;
use crate::models::{
    EntityKey, EntityTokenRequest, EntityTokenResponse, InfoRequestParameters, LoginRequest,
    LoginResponse,
};
use crate::requester::Requester;
use crate::session::Session;
use crate::token::{TokenSource, XblExchange};

/// Result of step 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedIn {
    pub player_id: String,
    pub entity_token: String,
}

/// Build the Client/LoginWithXbox request for an `XBL3.0` identity token
pub fn login_request(title_id: String, xbox_token: String) -> LoginRequest {
    LoginRequest {
        create_account: true,
        encrypted_request: None,
        info_request_parameters: InfoRequestParameters {
            player_profile: true,
            user_account_info: true,
            ..Default::default()
        },
        player_secret: None,
        title_id,
        xbox_token,
    }
}

/// Step 1: log in with Xbox Live, unauthenticated
#[instrument(skip_all)]
pub async fn acquire_login_token(
    requester: &Requester,
    source: &dyn TokenSource,
    exchange: &dyn XblExchange,
) -> Result<LoggedIn> {
    let credential = source.token().await?;
    let assertion = exchange.exchange(&credential, RP_PLAYFAB).await?;
    debug!("Acquired XSTS token for PlayFab");

    let config = requester.config();
    let request = login_request(config.login_title_id(), assertion.authorization_header());
    let response: LoginResponse = requester
        .request(&config.with_sdk_query(paths::LOGIN_WITH_XBOX), &request, None)
        .await?;

    debug!(
        code = response.code,
        newly_created = response.data.newly_created,
        "Logged in to PlayFab"
    );
    Ok(LoggedIn {
        player_id: response.data.play_fab_id,
        entity_token: response.data.entity_token.entity_token,
    })
}

/// Step 2: trade the login's entity token for the session's
#[instrument(skip_all, fields(player_id = %logged_in.player_id))]
pub async fn acquire_entity_token(requester: &Requester, logged_in: LoggedIn) -> Result<Session> {
    let request = EntityTokenRequest {
        entity: EntityKey {
            id: logged_in.player_id.clone(),
            entity_type: minecraft::ENTITY_TYPE.to_string(),
            type_string: String::new(),
        },
    };

    let path = requester.config().with_sdk_query(paths::GET_ENTITY_TOKEN);
    let response: EntityTokenResponse = requester
        .request(&path, &request, Some(&logged_in.entity_token))
        .await?;

    Ok(Session {
        player_id: logged_in.player_id,
        entity_token: response.data.entity_token,
        token_expiration: response.data.token_expiration,
        entity: response.data.entity,
    })
}

/// Run both steps, stopping at the first failure
pub async fn handshake(
    requester: &Requester,
    source: &dyn TokenSource,
    exchange: &dyn XblExchange,
) -> Result<Session> {
    let logged_in = acquire_login_token(requester, source, exchange).await?;
    let session = acquire_entity_token(requester, logged_in).await?;
    info!(player_id = %session.player_id, "PlayFab session established");
    Ok(session)
}
