//! JSON messages exchanged over the WebSocket.

use serde::{Deserialize, Deserializer, Serialize};

use crate::deck::Card;
use crate::game::session::Snapshot;
use crate::game::Standing;
use crate::util::id::ConnectionId;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientToServer {
    Ping,
    Start {
        #[serde(deserialize_with = "lenient_u32")]
        rows: u32,
        #[serde(deserialize_with = "lenient_u32")]
        cols: u32,
        #[serde(deserialize_with = "lenient_u32")]
        players: u32,
    },
    Join {
        #[serde(default, alias = "displayName", alias = "name")]
        display_name: String,
    },
    Flip { coord: String },
    Reset,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerToClient {
    Welcome { connection: ConnectionId },
    GameUpdate { state: Snapshot },
    CardsUpdate { cards: Vec<Card> },
    GameOver { standings: Vec<Standing> },
    ReturnToMenu,
    Error { message: String },
    Pong,
}

/// Accept `4`, `"4"` and `" 4 "` alike.
fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got {s:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_accepts_numeric_strings() {
        let msg: ClientToServer =
            serde_json::from_str(r#"{"type":"start","rows":"4","cols":4,"players":" 2 "}"#).unwrap();
        assert_eq!(msg, ClientToServer::Start { rows: 4, cols: 4, players: 2 });
    }

    #[test]
    fn test_start_rejects_garbage() {
        let res = serde_json::from_str::<ClientToServer>(r#"{"type":"start","rows":"four","cols":4,"players":2}"#);
        assert!(res.is_err());
        let res = serde_json::from_str::<ClientToServer>(r#"{"type":"start","rows":-4,"cols":4,"players":2}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_client_messages() {
        let join: ClientToServer = serde_json::from_str(r#"{"type":"join","displayName":"Ana"}"#).unwrap();
        assert_eq!(join, ClientToServer::Join { display_name: "Ana".into() });
        let flip: ClientToServer = serde_json::from_str(r#"{"type":"flip","coord":"B3"}"#).unwrap();
        assert_eq!(flip, ClientToServer::Flip { coord: "B3".into() });
        let reset: ClientToServer = serde_json::from_str(r#"{"type":"reset"}"#).unwrap();
        assert_eq!(reset, ClientToServer::Reset);
    }

    #[test]
    fn test_server_messages_are_tagged() {
        let over = ServerToClient::GameOver {
            standings: vec![Standing { display_name: "Ana".into(), score: 1 }],
        };
        let json = serde_json::to_value(&over).unwrap();
        assert_eq!(json["type"], "game_over");
        assert_eq!(json["standings"][0]["displayName"], "Ana");
        assert!(json["standings"][0].get("display_name").is_none());
        assert_eq!(json["standings"][0]["score"], 1);

        let json = serde_json::to_value(ServerToClient::ReturnToMenu).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "return_to_menu" }));
    }
}
