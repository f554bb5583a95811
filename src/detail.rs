use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gateway::{Endpoint, Gateway, Payload};

/// Move buttons available to a combatant.
pub const MAX_MOVES: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Move {
    pub name: String,
    pub type_tag: String,
    /// Damage points; `None` for moves that deal no damage.
    pub power: Option<u32>,
}

impl Move {
    /// The move name as the game endpoint expects it: lowercase, no whitespace.
    pub fn wire_name(&self) -> String {
        self.name
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }

    pub fn power_label(&self) -> Option<String> {
        self.power.map(|dp| format!("{dp} DP"))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CardImages {
    pub photo: Option<String>,
    pub type_icon: Option<String>,
    pub weakness_icon: Option<String>,
}

/// Normalized detail record for one pokedex entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PokemonCard {
    pub identifier: String,
    pub name: String,
    pub hp: u32,
    pub type_tag: Option<String>,
    pub weakness: Option<String>,
    pub description: String,
    pub images: CardImages,
    pub moves: Vec<Move>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCard {
    name: Option<String>,
    shortname: Option<String>,
    hp: Option<u32>,
    #[serde(default)]
    info: RawInfo,
    #[serde(default)]
    images: RawImages,
    moves: Option<Vec<RawMove>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawInfo {
    #[serde(rename = "type")]
    type_tag: Option<String>,
    weakness: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawImages {
    photo: Option<String>,
    #[serde(rename = "typeIcon")]
    type_icon: Option<String>,
    #[serde(rename = "weaknessIcon")]
    weakness_icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMove {
    name: String,
    #[serde(rename = "type", default)]
    type_tag: String,
    dp: Option<u32>,
}

impl RawCard {
    pub(crate) fn normalize(self, config: &ClientConfig) -> Result<PokemonCard, ClientError> {
        let name = required_text(self.name, "name")?;
        let identifier = required_text(self.shortname, "shortname")?;
        let hp = self
            .hp
            .ok_or_else(|| ClientError::malformed("missing field `hp`"))?;
        if hp == 0 {
            return Err(ClientError::malformed(format!(
                "{identifier} has a health total of 0"
            )));
        }
        let raw_moves = self
            .moves
            .ok_or_else(|| ClientError::malformed("missing field `moves`"))?;
        if raw_moves.len() > MAX_MOVES {
            tracing::debug!(
                identifier = %identifier,
                count = raw_moves.len(),
                limit = MAX_MOVES,
                "dropping extra moves"
            );
        }
        let moves = raw_moves
            .into_iter()
            .take(MAX_MOVES)
            .map(|raw| Move {
                name: raw.name.trim().to_string(),
                type_tag: raw.type_tag.trim().to_string(),
                power: raw.dp,
            })
            .collect();

        let resolve = |path: Option<String>| {
            path.filter(|p| !p.trim().is_empty())
                .map(|p| config.asset_url(p.trim()))
        };

        Ok(PokemonCard {
            identifier,
            name,
            hp,
            type_tag: self.info.type_tag,
            weakness: self.info.weakness,
            description: self.info.description.unwrap_or_default(),
            images: CardImages {
                photo: resolve(self.images.photo),
                type_icon: resolve(self.images.type_icon),
                weakness_icon: resolve(self.images.weakness_icon),
            },
            moves,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ClientError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ClientError::malformed(format!("missing field `{field}`")))
}

pub fn parse_card(body: &str, config: &ClientConfig) -> Result<PokemonCard, ClientError> {
    let raw: RawCard = serde_json::from_str(body)?;
    raw.normalize(config)
}

/// Fetches one entry's detail record. Single attempt, no retries.
pub async fn fetch_detail(
    gateway: &Gateway,
    config: &ClientConfig,
    identifier: &str,
) -> Result<PokemonCard, ClientError> {
    let body = gateway
        .send(Endpoint::Pokedex, Payload::query([("pokemon", identifier)]))
        .await?;
    parse_card(&body, config)
}
