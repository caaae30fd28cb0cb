use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::StudioError;

/// Target length of every short produced by one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum ShortLength {
    Fifteen,
    #[default]
    Thirty,
    Sixty,
}

impl ShortLength {
    /// Lengths offered by the length selector, in display order.
    pub const ALL: [Self; 3] = [Self::Fifteen, Self::Thirty, Self::Sixty];

    pub fn seconds(self) -> u32 {
        match self {
            Self::Fifteen => 15,
            Self::Thirty => 30,
            Self::Sixty => 60,
        }
    }

    pub fn from_seconds(seconds: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|length| length.seconds() == seconds)
    }
}

impl From<ShortLength> for u32 {
    fn from(value: ShortLength) -> Self {
        value.seconds()
    }
}

impl TryFrom<u32> for ShortLength {
    type Error = StudioError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_seconds(value).ok_or_else(|| StudioError::InvalidConfig {
            reason: format!("short length must be 15, 30 or 60 seconds, got {value}"),
        })
    }
}

impl Display for ShortLength {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.seconds())
    }
}

/// Transition applied between shots of a generated short.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionStyle {
    #[default]
    Fade,
    CrossDissolve,
    CinematicZoom,
}

impl TransitionStyle {
    /// Styles offered by the transition selector, in display order.
    pub const ALL: [Self; 3] = [Self::Fade, Self::CrossDissolve, Self::CinematicZoom];

    pub fn value(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::CrossDissolve => "cross-dissolve",
            Self::CinematicZoom => "cinematic-zoom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fade => "Fade",
            Self::CrossDissolve => "Cross-dissolve",
            Self::CinematicZoom => "Cinematic zoom",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.value() == value)
    }
}

impl Display for TransitionStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// External platform a finished short can be shared to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareTarget {
    pub name: &'static str,
    pub destination_url: &'static str,
    pub description: &'static str,
    pub accent: &'static str,
}

/// Share destinations exposed unchanged to the rendering layer.
pub const SHARE_TARGETS: [ShareTarget; 3] = [
    ShareTarget {
        name: "TikTok",
        destination_url: "https://www.tiktok.com/",
        description: "Share to TikTok",
        accent: "#25F4EE",
    },
    ShareTarget {
        name: "Instagram Reels",
        destination_url: "https://www.instagram.com/",
        description: "Share to Instagram Reels",
        accent: "#FF2D55",
    },
    ShareTarget {
        name: "YouTube Shorts",
        destination_url: "https://www.youtube.com/shorts",
        description: "Share to YouTube Shorts",
        accent: "#FF0000",
    },
];
