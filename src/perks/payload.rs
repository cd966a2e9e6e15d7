//! Typed tuning payloads carried by perk nodes
//!
//! The engine never interprets these numbers; effect code outside the core
//! matches on [`PerkPayload`] to read them. Decoding is driven by the perk
//! type's [`PayloadKind`], so a node missing a field its type requires is
//! rejected at load time instead of surfacing as a zero at runtime.

use crate::perks::types::PayloadKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tuning data for a single perk node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PerkPayload {
    Amount {
        amount: f32,
    },
    Duration {
        amount: f32,
        time: u32,
    },
    LichFeast {
        health: f32,
        hunger: f32,
    },
    EntityList {
        entities: Vec<String>,
    },
    UnstableSummoning {
        chance: f32,
        entities: Vec<String>,
    },
    GhostStep {
        amount: f32,
        time: u32,
        cooldown: u32,
    },
    ActiveAbility(AbilityTuning),
}

/// Tuning shared by every triggered ability
///
/// Fields a given ability does not use stay at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AbilityTuning {
    pub mana_cost: f32,
    pub cooldown: u32,
    pub damage: f32,
    pub freeze_time: u32,
    pub radius: f32,
    pub dash_length: f32,
    pub dash_duration: f32,
}

#[derive(Deserialize)]
struct AmountFields {
    amount: f32,
}

#[derive(Deserialize)]
struct DurationFields {
    amount: f32,
    time: u32,
}

#[derive(Deserialize)]
struct LichFeastFields {
    health: f32,
    hunger: f32,
}

#[derive(Deserialize)]
struct EntityListFields {
    entities: Vec<String>,
}

#[derive(Deserialize)]
struct UnstableSummoningFields {
    chance: f32,
    entities: Vec<String>,
}

#[derive(Deserialize)]
struct GhostStepFields {
    amount: f32,
    time: u32,
    cooldown: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AbilityFields {
    mana_cost: f32,
    cooldown: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashFields {
    mana_cost: f32,
    cooldown: u32,
    dash_length: f32,
    dash_duration: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IceBlastFields {
    mana_cost: f32,
    cooldown: u32,
    damage: f32,
    freeze_time: u32,
    radius: f32,
}

fn fields<T: DeserializeOwned>(raw: &Map<String, Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(raw.clone()))
}

impl PerkPayload {
    /// Decode the payload for `kind` from the node's loose tuning fields
    pub fn decode(kind: PayloadKind, raw: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        let payload = match kind {
            PayloadKind::Amount => {
                let f: AmountFields = fields(raw)?;
                PerkPayload::Amount { amount: f.amount }
            }
            PayloadKind::Duration => {
                let f: DurationFields = fields(raw)?;
                PerkPayload::Duration {
                    amount: f.amount,
                    time: f.time,
                }
            }
            PayloadKind::LichFeast => {
                let f: LichFeastFields = fields(raw)?;
                PerkPayload::LichFeast {
                    health: f.health,
                    hunger: f.hunger,
                }
            }
            PayloadKind::EntityList => {
                let f: EntityListFields = fields(raw)?;
                PerkPayload::EntityList { entities: f.entities }
            }
            PayloadKind::UnstableSummoning => {
                let f: UnstableSummoningFields = fields(raw)?;
                PerkPayload::UnstableSummoning {
                    chance: f.chance,
                    entities: f.entities,
                }
            }
            PayloadKind::GhostStep => {
                let f: GhostStepFields = fields(raw)?;
                PerkPayload::GhostStep {
                    amount: f.amount,
                    time: f.time,
                    cooldown: f.cooldown,
                }
            }
            PayloadKind::ActiveAbility => {
                let f: AbilityFields = fields(raw)?;
                PerkPayload::ActiveAbility(AbilityTuning {
                    mana_cost: f.mana_cost,
                    cooldown: f.cooldown,
                    ..AbilityTuning::default()
                })
            }
            PayloadKind::Dash => {
                let f: DashFields = fields(raw)?;
                PerkPayload::ActiveAbility(AbilityTuning {
                    mana_cost: f.mana_cost,
                    cooldown: f.cooldown,
                    dash_length: f.dash_length,
                    dash_duration: f.dash_duration,
                    ..AbilityTuning::default()
                })
            }
            PayloadKind::IceBlast => {
                let f: IceBlastFields = fields(raw)?;
                PerkPayload::ActiveAbility(AbilityTuning {
                    mana_cost: f.mana_cost,
                    cooldown: f.cooldown,
                    damage: f.damage,
                    freeze_time: f.freeze_time,
                    radius: f.radius,
                    ..AbilityTuning::default()
                })
            }
        };
        Ok(payload)
    }

    /// Primary magnitude of the effect, if the payload has one
    pub fn amount(&self) -> Option<f32> {
        match self {
            PerkPayload::Amount { amount }
            | PerkPayload::Duration { amount, .. }
            | PerkPayload::GhostStep { amount, .. } => Some(*amount),
            PerkPayload::UnstableSummoning { chance, .. } => Some(*chance),
            PerkPayload::LichFeast { .. }
            | PerkPayload::EntityList { .. }
            | PerkPayload::ActiveAbility(_) => None,
        }
    }

    /// Cooldown in ticks, if the effect has one
    pub fn cooldown(&self) -> Option<u32> {
        match self {
            PerkPayload::GhostStep { cooldown, .. } => Some(*cooldown),
            PerkPayload::ActiveAbility(tuning) => Some(tuning.cooldown),
            PerkPayload::Amount { .. }
            | PerkPayload::Duration { .. }
            | PerkPayload::LichFeast { .. }
            | PerkPayload::EntityList { .. }
            | PerkPayload::UnstableSummoning { .. } => None,
        }
    }
}
