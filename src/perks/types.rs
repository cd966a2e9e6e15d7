//! Perk type tags and categories

use serde::{Deserialize, Serialize};

/// What effect a perk node grants, independent of school and tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerkType {
    // === PASSIVES ===
    PassiveSummonHealth,
    PassiveSummoningPower,
    PassiveSummonDefense,
    PassiveLichFeast,
    PassiveManaTap,
    PassiveFireThorns,
    PassiveHealingAmplification,
    PassiveFreeJump,
    PassiveDeflection,
    PassiveStoneSkin,
    PassiveUnstableSummoning,
    PassiveGhostStep,
    PassiveSoulspike,
    PassiveHydration,
    PassiveColdWalker,
    PassiveMobPacification,

    // === ACTIVE ABILITIES ===
    ActiveGroundSlam,
    ActiveIceBlast,
    ActiveFireDash,
    ActiveAirDash,
    ActiveGhostStep,
    ActiveCurseField,
    ActiveSanctuary,
    ActiveSwapAbility,
    ActiveSwarm,
}

/// Shape of the tuning payload a perk type carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Amount,
    Duration,
    LichFeast,
    EntityList,
    UnstableSummoning,
    GhostStep,
    ActiveAbility,
    Dash,
    IceBlast,
}

impl PerkType {
    /// Every perk type in enumeration order
    pub const ALL: [PerkType; 25] = [
        PerkType::PassiveSummonHealth,
        PerkType::PassiveSummoningPower,
        PerkType::PassiveSummonDefense,
        PerkType::PassiveLichFeast,
        PerkType::PassiveManaTap,
        PerkType::PassiveFireThorns,
        PerkType::PassiveHealingAmplification,
        PerkType::PassiveFreeJump,
        PerkType::PassiveDeflection,
        PerkType::PassiveStoneSkin,
        PerkType::PassiveUnstableSummoning,
        PerkType::PassiveGhostStep,
        PerkType::PassiveSoulspike,
        PerkType::PassiveHydration,
        PerkType::PassiveColdWalker,
        PerkType::PassiveMobPacification,
        PerkType::ActiveGroundSlam,
        PerkType::ActiveIceBlast,
        PerkType::ActiveFireDash,
        PerkType::ActiveAirDash,
        PerkType::ActiveGhostStep,
        PerkType::ActiveCurseField,
        PerkType::ActiveSanctuary,
        PerkType::ActiveSwapAbility,
        PerkType::ActiveSwarm,
    ];

    /// Configuration tag, e.g. `PASSIVE_FIRE_THORNS`
    pub fn tag(&self) -> &'static str {
        match self {
            PerkType::PassiveSummonHealth => "PASSIVE_SUMMON_HEALTH",
            PerkType::PassiveSummoningPower => "PASSIVE_SUMMONING_POWER",
            PerkType::PassiveSummonDefense => "PASSIVE_SUMMON_DEFENSE",
            PerkType::PassiveLichFeast => "PASSIVE_LICH_FEAST",
            PerkType::PassiveManaTap => "PASSIVE_MANA_TAP",
            PerkType::PassiveFireThorns => "PASSIVE_FIRE_THORNS",
            PerkType::PassiveHealingAmplification => "PASSIVE_HEALING_AMPLIFICATION",
            PerkType::PassiveFreeJump => "PASSIVE_FREE_JUMP",
            PerkType::PassiveDeflection => "PASSIVE_DEFLECTION",
            PerkType::PassiveStoneSkin => "PASSIVE_STONE_SKIN",
            PerkType::PassiveUnstableSummoning => "PASSIVE_UNSTABLE_SUMMONING",
            PerkType::PassiveGhostStep => "PASSIVE_GHOST_STEP",
            PerkType::PassiveSoulspike => "PASSIVE_SOULSPIKE",
            PerkType::PassiveHydration => "PASSIVE_HYDRATION",
            PerkType::PassiveColdWalker => "PASSIVE_COLD_WALKER",
            PerkType::PassiveMobPacification => "PASSIVE_MOB_PACIFICATION",
            PerkType::ActiveGroundSlam => "ACTIVE_GROUND_SLAM",
            PerkType::ActiveIceBlast => "ACTIVE_ICE_BLAST",
            PerkType::ActiveFireDash => "ACTIVE_FIRE_DASH",
            PerkType::ActiveAirDash => "ACTIVE_AIR_DASH",
            PerkType::ActiveGhostStep => "ACTIVE_GHOST_STEP",
            PerkType::ActiveCurseField => "ACTIVE_CURSE_FIELD",
            PerkType::ActiveSanctuary => "ACTIVE_SANCTUARY",
            PerkType::ActiveSwapAbility => "ACTIVE_SWAP_ABILITY",
            PerkType::ActiveSwarm => "ACTIVE_SWARM",
        }
    }

    /// Parse a configuration tag
    pub fn from_tag(tag: &str) -> Option<PerkType> {
        PerkType::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// Member of the exclusivity group: one per actor at a time
    ///
    /// Swarm is a summon, not a triggered ability, and sits outside the group.
    pub fn is_active_ability(&self) -> bool {
        matches!(
            self,
            PerkType::ActiveGroundSlam
                | PerkType::ActiveIceBlast
                | PerkType::ActiveFireDash
                | PerkType::ActiveAirDash
                | PerkType::ActiveGhostStep
                | PerkType::ActiveCurseField
                | PerkType::ActiveSanctuary
                | PerkType::ActiveSwapAbility
        )
    }

    /// Payload shape the catalog decoder expects for this type
    pub fn payload_kind(&self) -> PayloadKind {
        match self {
            PerkType::PassiveManaTap
            | PerkType::PassiveFireThorns
            | PerkType::PassiveHealingAmplification
            | PerkType::PassiveFreeJump
            | PerkType::PassiveSoulspike
            | PerkType::PassiveColdWalker => PayloadKind::Amount,
            PerkType::PassiveDeflection
            | PerkType::PassiveSummonHealth
            | PerkType::PassiveSummoningPower
            | PerkType::PassiveSummonDefense
            | PerkType::PassiveStoneSkin
            | PerkType::PassiveHydration => PayloadKind::Duration,
            PerkType::PassiveLichFeast => PayloadKind::LichFeast,
            PerkType::PassiveMobPacification => PayloadKind::EntityList,
            PerkType::PassiveUnstableSummoning => PayloadKind::UnstableSummoning,
            PerkType::PassiveGhostStep => PayloadKind::GhostStep,
            PerkType::ActiveIceBlast => PayloadKind::IceBlast,
            PerkType::ActiveFireDash | PerkType::ActiveAirDash | PerkType::ActiveGhostStep => {
                PayloadKind::Dash
            }
            PerkType::ActiveGroundSlam
            | PerkType::ActiveCurseField
            | PerkType::ActiveSanctuary
            | PerkType::ActiveSwapAbility
            | PerkType::ActiveSwarm => PayloadKind::ActiveAbility,
        }
    }
}

impl std::fmt::Display for PerkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Broad grouping of perk nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerkCategory {
    /// Always-on effects
    Passive,
    /// Triggered abilities
    Active,
    Utility,
    /// Effects that improve by taking several tiers
    Stackable,
}

impl PerkCategory {
    pub fn from_tag(tag: &str) -> Option<PerkCategory> {
        match tag {
            "PASSIVE" => Some(PerkCategory::Passive),
            "ACTIVE" => Some(PerkCategory::Active),
            "UTILITY" => Some(PerkCategory::Utility),
            "STACKABLE" => Some(PerkCategory::Stackable),
            _ => None,
        }
    }
}
