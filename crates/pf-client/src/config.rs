use std::time::Duration;
use url::Url;

use crate::errors::Result;

/// Values the Minecraft: Bedrock Edition client sends to PlayFab
pub mod minecraft {
    /// PlayFab title ID of Minecraft: Bedrock Edition
    pub const TITLE_ID: &str = "20ca2";
    /// SDK version reported by the game client
    pub const SDK_VERSION: &str = "XPlatCppSdk-3.6.190304";
    /// User agent of the game's HTTP stack
    pub const USER_AGENT: &str = "libhttpclient/1.0.0.0";
    pub const API_HOST: &str = "playfabapi.com";
    /// Entity type requested when exchanging the login token
    pub const ENTITY_TYPE: &str = "master_player_account";
}

/// PlayFab API paths, relative to the title's API host
pub mod paths {
    pub const LOGIN_WITH_XBOX: &str = "Client/LoginWithXbox";
    pub const GET_ENTITY_TOKEN: &str = "Authentication/GetEntityToken";
    pub const CATALOG_SEARCH: &str = "Catalog/Search";
}

/// Microsoft and Xbox Live authentication endpoints
pub mod endpoints {
    pub const MS_TOKEN: &str = "https://login.live.com/oauth20_token.srf";
    pub const XBL_AUTHENTICATE: &str = "https://user.auth.xboxlive.com/user/authenticate";
    pub const XSTS_AUTHORIZE: &str = "https://xsts.auth.xboxlive.com/xsts/authorize";
}

/// Official Minecraft launcher OAuth configuration
pub mod official {
    pub const CLIENT_ID: &str = "00000000402B5328";
    pub const SCOPE: &str = "service::user.auth.xboxlive.com::MBI_SSL";
}

/// Relying party PlayFab expects the XSTS token to be scoped to
pub const RP_PLAYFAB: &str = "rp://playfabapi.com/";

/// Time skew for token expiration (refresh 5 minutes early)
pub const TOKEN_EXPIRY_SKEW: Duration = Duration::from_secs(300);

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            request: Duration::from_secs(30),
        }
    }
}

/// Configuration for the PlayFab client
///
/// The defaults impersonate the Minecraft client. Only `base_url` is meant to
/// be changed, to point the client at a proxy or a mock server.
#[derive(Debug, Clone)]
pub struct PlayFabConfig {
    pub title_id: String,
    pub api_host: String,
    pub sdk_version: String,
    pub user_agent: String,

    /// Replaces `https://<title_id>.<api_host>/` when set
    pub base_url: Option<Url>,

    pub http_timeouts: HttpTimeouts,
}

impl PlayFabConfig {
    /// Configuration matching the Minecraft: Bedrock Edition client
    pub fn minecraft() -> Self {
        Self {
            title_id: minecraft::TITLE_ID.to_string(),
            api_host: minecraft::API_HOST.to_string(),
            sdk_version: minecraft::SDK_VERSION.to_string(),
            user_agent: minecraft::USER_AGENT.to_string(),
            base_url: None,
            http_timeouts: HttpTimeouts::default(),
        }
    }

    /// Send every request to `base_url` instead of the title's API host
    pub fn with_base_url(mut self, mut base_url: Url) -> Self {
        // Url::join drops the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        self.base_url = Some(base_url);
        self
    }

    /// Root URL every API path is resolved against
    pub fn api_base(&self) -> Result<Url> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Ok(Url::parse(&format!(
                "https://{}.{}/",
                self.title_id, self.api_host
            ))?),
        }
    }

    /// Absolute URL of an API path (which may carry a query string)
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.api_base()?.join(path)?)
    }

    /// Path with the `sdk` query parameter the handshake endpoints expect
    pub fn with_sdk_query(&self, path: &str) -> String {
        format!("{}?sdk={}", path, self.sdk_version)
    }

    /// Title ID as it is sent in login requests
    pub fn login_title_id(&self) -> String {
        self.title_id.to_uppercase()
    }
}

impl Default for PlayFabConfig {
    fn default() -> Self {
        Self::minecraft()
    }
}

/// Endpoints used by [`crate::live`] collaborators
#[derive(Debug, Clone)]
pub struct XboxEndpoints {
    pub ms_token: String,
    pub xbl_authenticate: String,
    pub xsts_authorize: String,
}

impl Default for XboxEndpoints {
    fn default() -> Self {
        Self {
            ms_token: endpoints::MS_TOKEN.to_string(),
            xbl_authenticate: endpoints::XBL_AUTHENTICATE.to_string(),
            xsts_authorize: endpoints::XSTS_AUTHORIZE.to_string(),
        }
    }
}
