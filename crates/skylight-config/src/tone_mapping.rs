//! Tone mapping operators understood by the renderer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tone mapping operator applied to the HDR output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToneMapping {
    None,
    Linear,
    Reinhard,
    Cineon,
    #[default]
    AcesFilmic,
    AgX,
    Neutral,
}

impl ToneMapping {
    /// Every operator, in panel order.
    pub const ALL: [ToneMapping; 7] = [
        ToneMapping::None,
        ToneMapping::Linear,
        ToneMapping::Reinhard,
        ToneMapping::Cineon,
        ToneMapping::AcesFilmic,
        ToneMapping::AgX,
        ToneMapping::Neutral,
    ];

    /// Name as shown in the parameter panel, e.g. `ACESFilmicToneMapping`.
    pub fn panel_name(&self) -> &'static str {
        match self {
            ToneMapping::None => "NoToneMapping",
            ToneMapping::Linear => "LinearToneMapping",
            ToneMapping::Reinhard => "ReinhardToneMapping",
            ToneMapping::Cineon => "CineonToneMapping",
            ToneMapping::AcesFilmic => "ACESFilmicToneMapping",
            ToneMapping::AgX => "AgXToneMapping",
            ToneMapping::Neutral => "NeutralToneMapping",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            ToneMapping::None => "none",
            ToneMapping::Linear => "linear",
            ToneMapping::Reinhard => "reinhard",
            ToneMapping::Cineon => "cineon",
            ToneMapping::AcesFilmic => "aces",
            ToneMapping::AgX => "agx",
            ToneMapping::Neutral => "neutral",
        }
    }
}

impl fmt::Display for ToneMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.panel_name())
    }
}

/// Returned when a tone mapping name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tone mapping `{0}`")]
pub struct UnknownToneMapping(pub String);

impl FromStr for ToneMapping {
    type Err = UnknownToneMapping;

    /// Accepts panel names (`AgXToneMapping`) and short names (`agx`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToneMapping::ALL
            .into_iter()
            .find(|tm| {
                tm.panel_name().eq_ignore_ascii_case(s) || tm.short_name().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| UnknownToneMapping(s.to_string()))
    }
}
