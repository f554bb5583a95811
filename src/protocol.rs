//! Request builders and response shapes for the game endpoint.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::detail::{PokemonCard, RawCard};
use crate::error::ClientError;
use crate::gateway::Payload;

/// Reserved move name for running away.
pub const FLEE_MOVE: &str = "flee";

pub fn catalog_payload() -> Payload {
    Payload::query([("pokedex", "all")])
}

pub fn start_payload(display_name: &str) -> Payload {
    Payload::form([("startgame", "true"), ("mypokemon", display_name)])
}

pub fn turn_payload(session_id: &str, combatant_session_id: &str, move_name: &str) -> Payload {
    Payload::form([
        ("guid", session_id),
        ("pid", combatant_session_id),
        ("movename", move_name),
    ])
}

#[derive(Clone, Debug, PartialEq)]
pub struct StartReply {
    pub session_id: String,
    pub combatant_session_id: String,
    pub player: Option<PokemonCard>,
    pub opponent: PokemonCard,
}

#[derive(Debug, Deserialize)]
struct RawStart {
    guid: Option<Value>,
    pid: Option<Value>,
    p1: Option<RawCard>,
    p2: Option<RawCard>,
}

pub fn parse_start(body: &str, config: &ClientConfig) -> Result<StartReply, ClientError> {
    let raw: RawStart = serde_json::from_str(body)?;
    let session_id = token(raw.guid, "guid")?;
    let combatant_session_id = token(raw.pid, "pid")?;
    let opponent = raw
        .p2
        .ok_or_else(|| ClientError::malformed("missing field `p2`"))?
        .normalize(config)?;
    let player = raw.p1.map(|card| card.normalize(config)).transpose()?;
    Ok(StartReply {
        session_id,
        combatant_session_id,
        player,
        opponent,
    })
}

/// Tokens are opaque: strings pass through untouched, numbers keep their
/// textual form.
fn token(value: Option<Value>, field: &str) -> Result<String, ClientError> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ClientError::malformed(format!("missing field `{field}`"))),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Narration {
    pub move_name: String,
    pub result: String,
}

impl Narration {
    pub fn sentence(&self, actor: &str) -> String {
        if self.result.is_empty() {
            format!("{actor} played {}!", self.move_name)
        } else {
            format!("{actor} played {} and {}!", self.move_name, self.result)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HealthReading {
    pub current: u32,
    pub max: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReply {
    pub player_move: Narration,
    /// `None` when the opponent did not answer (the player fled or the match
    /// was already over).
    pub opponent_move: Option<Narration>,
    pub player: HealthReading,
    pub opponent: HealthReading,
}

#[derive(Debug, Deserialize)]
struct RawTurn {
    results: Option<RawResults>,
    p1: Option<RawHealth>,
    p2: Option<RawHealth>,
}

#[derive(Debug, Deserialize)]
struct RawResults {
    #[serde(rename = "p1-move")]
    p1_move: Option<String>,
    #[serde(rename = "p1-result")]
    p1_result: Option<String>,
    #[serde(rename = "p2-move")]
    p2_move: Option<String>,
    #[serde(rename = "p2-result")]
    p2_result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawHealth {
    #[serde(rename = "current-hp")]
    current_hp: Option<u32>,
    hp: Option<u32>,
}

pub fn parse_turn(body: &str) -> Result<TurnReply, ClientError> {
    let raw: RawTurn = serde_json::from_str(body)?;
    let results = raw
        .results
        .ok_or_else(|| ClientError::malformed("missing field `results`"))?;
    let player_move = Narration {
        move_name: results
            .p1_move
            .ok_or_else(|| ClientError::malformed("missing field `p1-move`"))?,
        result: results.p1_result.unwrap_or_default(),
    };
    let opponent_move = results.p2_move.map(|move_name| Narration {
        move_name,
        result: results.p2_result.unwrap_or_default(),
    });
    let player = health(raw.p1, "p1")?;
    let opponent = health(raw.p2, "p2")?;
    Ok(TurnReply {
        player_move,
        opponent_move,
        player,
        opponent,
    })
}

fn health(raw: Option<RawHealth>, side: &str) -> Result<HealthReading, ClientError> {
    let raw = raw.ok_or_else(|| ClientError::malformed(format!("missing field `{side}`")))?;
    let current = raw
        .current_hp
        .ok_or_else(|| ClientError::malformed(format!("missing field `{side}.current-hp`")))?;
    let max = raw
        .hp
        .ok_or_else(|| ClientError::malformed(format!("missing field `{side}.hp`")))?;
    if max == 0 || current > max {
        return Err(ClientError::malformed(format!(
            "{side} health {current}/{max} is out of range"
        )));
    }
    Ok(HealthReading { current, max })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> ClientConfig {
        ClientConfig::new("http://pokedex.test", Vec::new())
    }

    #[test]
    fn turn_payload_carries_tokens_verbatim() {
        let payload = turn_payload("g-123 ", "p/456", "quickattack");
        assert_eq!(payload.get("guid"), Some("g-123 "));
        assert_eq!(payload.get("pid"), Some("p/456"));
        assert_eq!(payload.get("movename"), Some("quickattack"));
        assert!(matches!(payload, Payload::Form(_)));
    }

    #[test]
    fn start_payload_declares_combatant() {
        let payload = start_payload("Bulbasaur");
        assert_eq!(payload.get("startgame"), Some("true"));
        assert_eq!(payload.get("mypokemon"), Some("Bulbasaur"));
    }

    #[test]
    fn parses_start_reply_with_numeric_pid() {
        let body = r#"{"guid":"abc-1","pid":42,
            "p2":{"name":"Rattata","shortname":"rattata","hp":39,
                  "moves":[{"name":"Tackle","type":"normal","dp":40}]}}"#;
        let reply = parse_start(body, &config()).expect("reply");
        assert_eq!(reply.session_id, "abc-1");
        assert_eq!(reply.combatant_session_id, "42");
        assert_eq!(reply.opponent.identifier, "rattata");
        assert_eq!(reply.opponent.hp, 39);
        assert!(reply.player.is_none());
    }

    #[test]
    fn start_reply_without_opponent_is_malformed() {
        let err = parse_start(r#"{"guid":"a","pid":"b"}"#, &config()).expect_err("malformed");
        assert!(matches!(err, ClientError::MalformedPayload(_)));
        let err = parse_start(r#"{"pid":"b","p2":{}}"#, &config()).expect_err("malformed");
        assert!(matches!(err, ClientError::MalformedPayload(_)));
    }

    #[test]
    fn parses_turn_with_null_opponent_move() {
        let body = r#"{"results":{"p1-move":"flee","p1-result":"lost",
                                  "p2-move":null,"p2-result":null},
                       "p1":{"current-hp":0,"hp":39},
                       "p2":{"current-hp":39,"hp":39}}"#;
        let reply = parse_turn(body).expect("reply");
        assert_eq!(reply.player_move.move_name, "flee");
        assert_eq!(reply.player_move.sentence("Player 1"), "Player 1 played flee and lost!");
        assert_eq!(reply.opponent_move, None);
        assert_eq!(reply.player, HealthReading { current: 0, max: 39 });
        assert_eq!(reply.opponent, HealthReading { current: 39, max: 39 });
    }

    #[test]
    fn health_above_total_is_malformed() {
        let body = r#"{"results":{"p1-move":"tackle"},
                       "p1":{"current-hp":50,"hp":39},
                       "p2":{"current-hp":10,"hp":39}}"#;
        let err = parse_turn(body).expect_err("malformed");
        assert!(matches!(err, ClientError::MalformedPayload(_)));
    }

    #[test]
    fn turn_without_health_is_malformed() {
        let body = r#"{"results":{"p1-move":"tackle"},"p1":{"hp":39}}"#;
        let err = parse_turn(body).expect_err("malformed");
        assert!(matches!(err, ClientError::MalformedPayload(_)));
    }
}
