use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Typed PlayFab response envelope
///
/// `data` is required: an application error reported as success carries no
/// payload and therefore fails to decode.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    pub data: T,
}

/// Selects the auxiliary player information returned on login
#[derive(Debug, Clone, Default, Serialize)]
pub struct InfoRequestParameters {
    #[serde(rename = "GetCharacterInventories")]
    pub character_inventories: bool,
    #[serde(rename = "GetCharacterList")]
    pub character_list: bool,
    #[serde(rename = "GetPlayerProfile")]
    pub player_profile: bool,
    #[serde(rename = "GetPlayerStatistics")]
    pub player_statistics: bool,
    #[serde(rename = "GetTitleData")]
    pub title_data: bool,
    #[serde(rename = "GetUserAccountInfo")]
    pub user_account_info: bool,
    #[serde(rename = "GetUserData")]
    pub user_data: bool,
    #[serde(rename = "GetUserInventory")]
    pub user_inventory: bool,
    #[serde(rename = "GetUserReadOnlyData")]
    pub user_read_only_data: bool,
    #[serde(rename = "GetUserVirtualCurrency")]
    pub user_virtual_currency: bool,
    #[serde(rename = "PlayerStatisticNames")]
    pub player_statistic_names: Option<Vec<String>>,
    #[serde(rename = "ProfileConstraints")]
    pub profile_constraints: Option<Value>,
    #[serde(rename = "TitleDataKeys")]
    pub title_data_keys: Option<Vec<String>>,
    #[serde(rename = "UserDataKeys")]
    pub user_data_keys: Option<Vec<String>>,
    #[serde(rename = "UserReadOnlyDataKeys")]
    pub user_read_only_data_keys: Option<Vec<String>>,
}

/// PlayFab Client/LoginWithXbox request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest {
    pub create_account: bool,
    pub encrypted_request: Option<Value>,
    pub info_request_parameters: InfoRequestParameters,
    pub player_secret: Option<String>,
    pub title_id: String,
    /// `XBL3.0 x=<user-hash>;<token>`
    pub xbox_token: String,
}

pub type LoginResponse = ApiResponse<LoginResult>;

/// PlayFab Client/LoginWithXbox response payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoginResult {
    #[serde(deserialize_with = "null_as_default")]
    pub session_ticket: String,
    #[serde(deserialize_with = "null_as_default")]
    pub play_fab_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub newly_created: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub settings_for_user: SettingsForUser,
    pub last_login_time: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub info_result_payload: InfoResultPayload,
    #[serde(deserialize_with = "null_as_default")]
    pub entity_token: EntityTokenResult,
    #[serde(deserialize_with = "null_as_default")]
    pub treatment_assignment: TreatmentAssignment,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SettingsForUser {
    #[serde(deserialize_with = "null_as_default")]
    pub needs_attribution: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub gather_device_info: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub gather_focus_info: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InfoResultPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub account_info: AccountInfo,
    #[serde(deserialize_with = "null_as_default")]
    pub user_inventory: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub user_data_version: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub user_read_only_data_version: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub character_inventories: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub player_profile: PlayerProfile,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AccountInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub play_fab_id: String,
    pub created: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub title_info: TitleInfo,
    pub private_info: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub xbox_info: XboxInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TitleInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub origination: String,
    pub created: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub first_login: Option<DateTime<Utc>>,
    #[serde(rename = "isBanned", deserialize_with = "null_as_default")]
    pub is_banned: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub title_player_account: EntityKey,
}

/// Xbox Live account linked to the PlayFab account
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct XboxInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub xbox_user_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub xbox_user_sandbox: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PlayerProfile {
    #[serde(deserialize_with = "null_as_default")]
    pub publisher_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub player_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TreatmentAssignment {
    #[serde(deserialize_with = "null_as_default")]
    pub variants: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub variables: Vec<Value>,
}

/// Entity descriptor (ID and type)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityKey {
    #[serde(rename = "Id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "Type", deserialize_with = "null_as_default")]
    pub entity_type: String,
    #[serde(
        rename = "TypeString",
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub type_string: String,
}

/// Entity token as returned by login and by Authentication/GetEntityToken
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EntityTokenResult {
    #[serde(deserialize_with = "null_as_default")]
    pub entity_token: String,
    pub token_expiration: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub entity: EntityKey,
}

/// PlayFab Authentication/GetEntityToken request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityTokenRequest {
    pub entity: EntityKey,
}

pub type EntityTokenResponse = ApiResponse<EntityTokenResult>;

/// Microsoft OAuth token response (refresh_token grant)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MsTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Xbox Live user.authenticate request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct XblAuthRequest {
    pub properties: XblAuthProperties,
    pub relying_party: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct XblAuthProperties {
    pub auth_method: String,
    pub site_name: String,
    pub rps_ticket: String,
}

/// Response of both user.authenticate and xsts/authorize
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct XblTokenResponse {
    pub token: String,
    pub display_claims: XblDisplayClaims,
    #[serde(default)]
    pub not_after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XblDisplayClaims {
    pub xui: Vec<XblUserInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XblUserInfo {
    pub uhs: String,
}

/// XSTS authorize request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct XstsAuthRequest {
    pub properties: XstsAuthProperties,
    pub relying_party: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct XstsAuthProperties {
    pub sandbox_id: String,
    pub user_tokens: Vec<String>,
}

/// XSTS error response
#[derive(Debug, Clone, Deserialize)]
pub struct XstsErrorResponse {
    #[serde(rename = "XErr")]
    pub xerr: u64,
    #[serde(default, rename = "Message")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_request_wire_names() {
        let request = LoginRequest {
            create_account: true,
            encrypted_request: None,
            info_request_parameters: InfoRequestParameters {
                player_profile: true,
                user_account_info: true,
                ..Default::default()
            },
            player_secret: None,
            title_id: "20CA2".to_string(),
            xbox_token: "XBL3.0 x=uhs;token".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["CreateAccount"], json!(true));
        assert_eq!(value["EncryptedRequest"], Value::Null);
        assert_eq!(value["PlayerSecret"], Value::Null);
        assert_eq!(value["TitleId"], json!("20CA2"));
        assert_eq!(value["XboxToken"], json!("XBL3.0 x=uhs;token"));
        let info = &value["InfoRequestParameters"];
        assert_eq!(info["GetPlayerProfile"], json!(true));
        assert_eq!(info["GetUserAccountInfo"], json!(true));
        assert_eq!(info["GetUserInventory"], json!(false));
        assert_eq!(info["TitleDataKeys"], Value::Null);
    }

    #[test]
    fn test_login_response_decodes_nested_payload() {
        let body = json!({
            "code": 200,
            "status": "OK",
            "data": {
                "SessionTicket": "ticket",
                "PlayFabId": "P1",
                "NewlyCreated": false,
                "LastLoginTime": "2024-03-01T10:00:00Z",
                "InfoResultPayload": {
                    "AccountInfo": {
                        "PlayFabId": "P1",
                        "Created": "2021-01-01T00:00:00.123Z",
                        "TitleInfo": {
                            "DisplayName": "Steve",
                            "isBanned": false,
                            "TitlePlayerAccount": {
                                "Id": "TPA",
                                "Type": "title_player_account",
                                "TypeString": "title_player_account"
                            }
                        },
                        "PrivateInfo": {},
                        "XboxInfo": { "XboxUserId": "2535", "XboxUserSandbox": "RETAIL" }
                    },
                    "UserInventory": [],
                    "PlayerProfile": { "PlayerId": "P1", "DisplayName": "Steve" }
                },
                "EntityToken": {
                    "EntityToken": "T1",
                    "TokenExpiration": "2024-03-02T10:00:00Z",
                    "Entity": {
                        "Id": "E1",
                        "Type": "master_player_account",
                        "TypeString": "master_player_account"
                    }
                }
            }
        });

        let response: LoginResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.code, 200);
        assert_eq!(response.data.play_fab_id, "P1");
        assert_eq!(response.data.entity_token.entity_token, "T1");
        assert_eq!(response.data.entity_token.entity.entity_type, "master_player_account");
        let account = &response.data.info_result_payload.account_info;
        assert_eq!(account.title_info.display_name, "Steve");
        assert_eq!(account.xbox_info.xbox_user_id, "2535");
        assert!(response.data.last_login_time.is_some());
    }

    #[test]
    fn test_entity_request_omits_empty_type_string() {
        let request = EntityTokenRequest {
            entity: EntityKey {
                id: "P1".to_string(),
                entity_type: "master_player_account".to_string(),
                type_string: String::new(),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({ "Entity": { "Id": "P1", "Type": "master_player_account" } })
        );
    }

    #[test]
    fn test_login_response_treats_null_as_default() {
        let body = json!({
            "code": 200,
            "status": null,
            "data": {
                "SessionTicket": null,
                "PlayFabId": "P1",
                "NewlyCreated": null,
                "SettingsForUser": null,
                "InfoResultPayload": {
                    "AccountInfo": {
                        "TitleInfo": {
                            "DisplayName": null,
                            "isBanned": null,
                            "TitlePlayerAccount": null
                        },
                        "XboxInfo": null
                    },
                    "UserInventory": null,
                    "CharacterInventories": null,
                    "PlayerProfile": null
                },
                "EntityToken": {
                    "EntityToken": "T1",
                    "Entity": { "Id": "E1", "Type": null, "TypeString": null }
                },
                "TreatmentAssignment": { "Variants": null, "Variables": null }
            }
        });

        let response: LoginResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.status, "");
        assert_eq!(response.data.play_fab_id, "P1");
        assert_eq!(response.data.entity_token.entity_token, "T1");
        assert_eq!(response.data.entity_token.entity.entity_type, "");
        let payload = &response.data.info_result_payload;
        assert!(payload.user_inventory.is_empty());
        assert_eq!(payload.account_info.title_info.display_name, "");
        assert!(!payload.account_info.title_info.is_banned);
    }

    #[test]
    fn test_error_envelope_without_data_fails() {
        let body = json!({ "code": 400, "status": "BadRequest", "errorCode": 1001 });
        assert!(serde_json::from_value::<EntityTokenResponse>(body).is_err());
    }
}
