use std::str::FromStr;

use crate::foundation::error::{PipevizError, PipevizResult};

/// Identity of one of the six pipeline stages.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageId {
    /// Wallets and dApps submitting transactions.
    Users,
    /// Transaction forwarding to upcoming leaders.
    GulfStream,
    /// Leader turning transactions into a block.
    BlockBuilding,
    /// Fork choice and rooting.
    Consensus,
    /// Validators replaying the block.
    BlockVerification,
    /// Shred propagation tree.
    Turbine,
}

impl StageId {
    /// All stages in display order.
    pub const ALL: [StageId; 6] = [
        StageId::Users,
        StageId::GulfStream,
        StageId::BlockBuilding,
        StageId::Consensus,
        StageId::BlockVerification,
        StageId::Turbine,
    ];

    /// Kebab-case name, as accepted by [`FromStr`].
    pub fn slug(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::GulfStream => "gulf-stream",
            Self::BlockBuilding => "block-building",
            Self::Consensus => "consensus",
            Self::BlockVerification => "block-verification",
            Self::Turbine => "turbine",
        }
    }

    /// Static catalogue entry for this stage.
    pub fn stage(self) -> &'static Stage {
        // STAGES is in `ALL` order.
        &STAGES[self as usize]
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for StageId {
    type Err = PipevizError;

    fn from_str(s: &str) -> PipevizResult<Self> {
        let norm = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|id| id.slug() == norm || id.slug().replace('-', "") == norm)
            .ok_or_else(|| PipevizError::validation(format!("unknown stage '{s}'")))
    }
}

/// Immutable description of a diagram stage.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Stage {
    /// Identity.
    pub id: StageId,
    /// Display title; also the only parameter of the explanation prompt.
    pub title: &'static str,
    /// One-line caption.
    pub description: &'static str,
    /// Layout slot the rendering layer places this stage in.
    pub slot: &'static str,
}

/// The fixed stage catalogue.
pub static STAGES: [Stage; 6] = [
    Stage {
        id: StageId::Users,
        title: "Users",
        description: "Wallets & dApps submitting transactions.",
        slot: "users",
    },
    Stage {
        id: StageId::GulfStream,
        title: "Gulf Stream",
        description: "Transaction forwarding protocol.",
        slot: "gulfstream",
    },
    Stage {
        id: StageId::BlockBuilding,
        title: "Block Building",
        description: "Processing transactions into a block.",
        slot: "building",
    },
    Stage {
        id: StageId::Consensus,
        title: "Consensus",
        description: "Confirming the sequence of blocks.",
        slot: "consensus",
    },
    Stage {
        id: StageId::BlockVerification,
        title: "Block Verification",
        description: "Validators verify and replay the block.",
        slot: "verification",
    },
    Stage {
        id: StageId::Turbine,
        title: "Turbine",
        description: "Block propagation protocol.",
        slot: "turbine",
    },
];

#[cfg(test)]
#[path = "../../tests/unit/stages/catalog.rs"]
mod tests;
