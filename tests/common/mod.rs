#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pokedex::error::ClientError;
use pokedex::gateway::{Gateway, RawResponse, Request, Transport};

pub const LISTING: &str = "Bulbasaur:bulbasaur\nCharmander:charmander\nSquirtle:squirtle\nPikachu:pikachu\n";

pub const CHARMANDER: &str = r#"{"name":"Charmander","shortname":"charmander","hp":39,
    "info":{"id":4,"type":"fire","weakness":"water","description":"Prefers hot places."},
    "images":{"photo":"images/charmander.jpg","typeIcon":"icons/fire.jpg","weaknessIcon":"icons/water.jpg"},
    "moves":[{"name":"Ember","type":"fire","dp":40},{"name":"Quick Attack","type":"normal","dp":40}]}"#;

pub const START: &str = r#"{"guid":"game-1","pid":"player-9",
    "p1":{"name":"Charmander","shortname":"charmander","hp":39,
          "moves":[{"name":"Ember","type":"fire","dp":40},{"name":"Quick Attack","type":"normal","dp":40}]},
    "p2":{"name":"Pikachu","shortname":"pikachu","hp":35,
          "moves":[{"name":"Thunder Shock","type":"electric","dp":40}]}}"#;

pub fn turn(p1: (u32, u32), p2: (u32, u32), p1_move: &str, p2_move: Option<&str>) -> String {
    let p2_move = p2_move
        .map(|m| format!("\"{m}\""))
        .unwrap_or_else(|| "null".to_string());
    format!(
        r#"{{"results":{{"p1-move":"{p1_move}","p1-result":"hit","p2-move":{p2_move},"p2-result":"hit"}},
            "p1":{{"current-hp":{},"hp":{}}},"p2":{{"current-hp":{},"hp":{}}}}}"#,
        p1.0, p1.1, p2.0, p2.1
    )
}

/// Transport that replays canned replies in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<RawResponse, ClientError>>>,
    sent: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Result<RawResponse, ClientError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<Request> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &Request) -> Result<RawResponse, ClientError> {
        self.sent.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport("no scripted reply".into())))
    }
}

pub fn gateway(script: &Arc<ScriptedTransport>) -> Gateway {
    Gateway::from_arc(Arc::clone(script) as Arc<dyn Transport>)
}
