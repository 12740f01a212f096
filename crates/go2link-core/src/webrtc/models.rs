use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Public STUN server offered alongside the TURN relay
pub const DEFAULT_STUN_URL: &str = "stun:stun.l.google.com:19302";

/// Decrypted `webrtc/account` payload.
///
/// The TURN relay is described by `user`, `passwd` and `realm` (the relay
/// URL). Any other keys the service sends are kept in `extra`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of a WebRTC `iceServers` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IceServer {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl SessionCredentials {
    /// TURN relay entry, when user, password and URL are all present
    pub fn turn_server(&self) -> Option<IceServer> {
        let url = self.realm.as_ref().filter(|s| !s.is_empty())?;
        let username = self.user.as_ref().filter(|s| !s.is_empty())?;
        let credential = self.passwd.as_ref().filter(|s| !s.is_empty())?;
        Some(IceServer {
            urls: vec![url.clone()],
            username: Some(username.clone()),
            credential: Some(credential.clone()),
        })
    }

    /// ICE server list for a peer connection: the TURN relay, then STUN if given.
    pub fn ice_servers(&self, stun_url: Option<&str>) -> Vec<IceServer> {
        let mut servers: Vec<IceServer> = self.turn_server().into_iter().collect();
        if let Some(url) = stun_url {
            servers.push(IceServer {
                urls: vec![url.to_string()],
                username: None,
                credential: None,
            });
        }
        servers
    }
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("user", &self.user)
            .field("realm", &self.realm)
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_turn_payload() {
        let json = r#"{"user":"u-1","passwd":"p-1","realm":"turn:203.0.113.7:3478","ttl":86400}"#;
        let creds: SessionCredentials = serde_json::from_str(json).unwrap();

        assert_eq!(creds.user.as_deref(), Some("u-1"));
        assert_eq!(creds.extra.get("ttl"), Some(&Value::from(86400)));

        let turn = creds.turn_server().unwrap();
        assert_eq!(turn.urls, vec!["turn:203.0.113.7:3478".to_string()]);
        assert_eq!(turn.username.as_deref(), Some("u-1"));
        assert_eq!(turn.credential.as_deref(), Some("p-1"));
    }

    #[test]
    fn test_incomplete_turn_payload() {
        let creds: SessionCredentials = serde_json::from_str(r#"{"user":"u-1"}"#).unwrap();
        assert!(creds.turn_server().is_none());

        let servers = creds.ice_servers(Some(DEFAULT_STUN_URL));
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].urls, vec![DEFAULT_STUN_URL.to_string()]);
        assert!(servers[0].username.is_none());
    }

    #[test]
    fn test_ice_servers_order() {
        let creds: SessionCredentials =
            serde_json::from_str(r#"{"user":"u","passwd":"p","realm":"turn:relay:3478"}"#).unwrap();
        let servers = creds.ice_servers(Some(DEFAULT_STUN_URL));
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].urls[0], "turn:relay:3478");
        assert!(creds.ice_servers(None).len() == 1);
    }

    #[test]
    fn test_rejects_non_object_payload() {
        assert!(serde_json::from_str::<SessionCredentials>("[1,2]").is_err());
    }

    #[test]
    fn test_serialize_keeps_extra_keys() {
        let json = r#"{"user":"u","realm":"turn:relay:3478","expire":"2026-10-19"}"#;
        let creds: SessionCredentials = serde_json::from_str(json).unwrap();
        let value = serde_json::to_value(&creds).unwrap();
        assert_eq!(value["expire"], "2026-10-19");
        assert!(value.get("passwd").is_none());
    }

    #[test]
    fn test_debug_hides_password() {
        let creds: SessionCredentials =
            serde_json::from_str(r#"{"user":"u","passwd":"very-secret"}"#).unwrap();
        assert!(!format!("{:?}", creds).contains("very-secret"));
    }
}
