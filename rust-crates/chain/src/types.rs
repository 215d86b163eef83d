use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
    de,
};
use std::{
    fmt,
    str::FromStr,
};

/// 32-byte identifiers rendered as 0x-prefixed hex, the way the chain's
/// JSON gateway encodes them.
macro_rules! hex_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            pub fn zeroed() -> Self {
                Self([0u8; 32])
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self)
            }
        }

        impl FromStr for $name {
            type Err = hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(raw)?;
                let bytes: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| hex::FromHexError::InvalidStringLength)?;
                Ok(Self(bytes))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }
    };
}

hex_id!(ObjectId);
hex_id!(Address);
hex_id!(TxDigest);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetStats {
    pub energy: u8,
    pub happiness: u8,
    pub hunger: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetGameData {
    pub coins: u64,
    pub experience: u64,
    pub level: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Personality {
    Balanced,
    Athletic,
    Studious,
    Lazy,
}

impl Personality {
    /// Wire encoding used by the contract: 0 Balanced, 1 Athletic, 2 Studious,
    /// 3 Lazy. Unknown codes collapse to Balanced, matching the web client.
    pub fn from_wire(code: u8) -> Self {
        match code {
            1 => Personality::Athletic,
            2 => Personality::Studious,
            3 => Personality::Lazy,
            _ => Personality::Balanced,
        }
    }

    pub fn wire_code(self) -> u8 {
        match self {
            Personality::Balanced => 0,
            Personality::Athletic => 1,
            Personality::Studious => 2,
            Personality::Lazy => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Personality::Balanced => "Balanced",
            Personality::Athletic => "Athletic",
            Personality::Studious => "Studious",
            Personality::Lazy => "Lazy",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: ObjectId,
    pub name: String,
    pub image_url: String,
    pub adopted_at_ms: u64,
    pub stats: PetStats,
    pub game_data: PetGameData,
    pub personality: Personality,
    /// Surfaced as a dynamic field on the pet object; true while the pet is
    /// asleep on-chain.
    pub is_sleeping: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessoryKind {
    Glasses,
    Hat,
    Toy,
}

impl AccessoryKind {
    /// Wire encoding: 1 glasses, 2 hat, 3 toy.
    pub fn from_wire(code: u8) -> Option<Self> {
        match code {
            1 => Some(AccessoryKind::Glasses),
            2 => Some(AccessoryKind::Hat),
            3 => Some(AccessoryKind::Toy),
            _ => None,
        }
    }

    pub fn wire_code(self) -> u8 {
        match self {
            AccessoryKind::Glasses => 1,
            AccessoryKind::Hat => 2,
            AccessoryKind::Toy => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AccessoryKind::Glasses => "glasses",
            AccessoryKind::Hat => "hat",
            AccessoryKind::Toy => "toy",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessory {
    pub id: ObjectId,
    pub name: String,
    pub image_url: String,
    pub kind: AccessoryKind,
}

/// A marketplace listing for a pet. The embedded pet is present only while
/// the listing is live; a sold or cancelled listing object keeps its id but
/// loses the embedded item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetListing {
    pub id: ObjectId,
    pub seller: Address,
    pub price: u64,
    pub pet: Option<Pet>,
}

impl PetListing {
    pub fn is_active(&self) -> bool {
        self.pet.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryListing {
    pub id: ObjectId,
    pub seller: Address,
    pub price: u64,
    pub accessory: Option<Accessory>,
}

impl AccessoryListing {
    pub fn is_active(&self) -> bool {
        self.accessory.is_some()
    }
}

/// Contract constants governing which actions are currently permissible.
/// Mirrored client-side only to disable controls preemptively; the contract
/// re-validates every call and remains the sole source of truth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameBalance {
    pub max_stat: u64,

    pub feed_coins_cost: u64,
    pub feed_experience_gain: u64,
    pub feed_hunger_gain: u64,

    pub play_energy_loss: u64,
    pub play_hunger_loss: u64,
    pub play_experience_gain: u64,
    pub play_happiness_gain: u64,

    pub work_energy_loss: u64,
    pub work_happiness_loss: u64,
    pub work_hunger_loss: u64,
    pub work_coins_gain: u64,

    pub exercise_energy_loss: u64,
    pub exercise_hunger_loss: u64,
    pub exercise_happiness_gain: u64,
    pub exercise_experience_gain: u64,

    pub study_energy_loss: u64,
    pub study_happiness_loss: u64,
    pub study_experience_gain: u64,

    pub rest_energy_gain: u64,

    pub sleep_energy_gain_ms: u64,
    pub sleep_happiness_loss_ms: u64,
    pub sleep_hunger_loss_ms: u64,

    pub exp_per_level: u64,
    pub evolve_level_requirement: u64,
}

impl Default for GameBalance {
    fn default() -> Self {
        GameBalance {
            max_stat: 100,

            feed_coins_cost: 5,
            feed_experience_gain: 5,
            feed_hunger_gain: 20,

            play_energy_loss: 15,
            play_hunger_loss: 15,
            play_experience_gain: 10,
            play_happiness_gain: 25,

            work_energy_loss: 20,
            work_happiness_loss: 20,
            work_hunger_loss: 20,
            work_coins_gain: 10,

            exercise_energy_loss: 20,
            exercise_hunger_loss: 15,
            exercise_happiness_gain: 10,
            exercise_experience_gain: 8,

            study_energy_loss: 10,
            study_happiness_loss: 5,
            study_experience_gain: 15,

            rest_energy_gain: 20,

            sleep_energy_gain_ms: 1_000,
            sleep_happiness_loss_ms: 700,
            sleep_hunger_loss_ms: 500,

            exp_per_level: 100,
            evolve_level_requirement: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn hex_id__round_trips_through_display_and_from_str() {
        // given
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let id = ObjectId(bytes);

        // when
        let rendered = id.to_string();
        let parsed: ObjectId = rendered.parse().unwrap();

        // then
        assert!(rendered.starts_with("0xab"));
        assert_eq!(id, parsed);
    }

    #[test]
    fn hex_id__parses_without_0x_prefix() {
        let id: Address = hex::encode([7u8; 32]).parse().unwrap();
        assert_eq!(id, Address([7u8; 32]));
    }

    #[test]
    fn hex_id__rejects_wrong_length() {
        assert!("0xdeadbeef".parse::<TxDigest>().is_err());
    }

    #[test]
    fn hex_id__serializes_as_hex_string_json() {
        let id = ObjectId([0x11u8; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"0x{}\"", hex::encode([0x11u8; 32])));
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn personality__wire_codes_round_trip() {
        for code in 0..=3u8 {
            assert_eq!(Personality::from_wire(code).wire_code(), code);
        }
        // unknown codes collapse to Balanced
        assert_eq!(Personality::from_wire(9), Personality::Balanced);
    }

    #[test]
    fn accessory_kind__unknown_wire_code_is_none() {
        assert_eq!(AccessoryKind::from_wire(0), None);
        assert_eq!(AccessoryKind::from_wire(4), None);
    }
}
