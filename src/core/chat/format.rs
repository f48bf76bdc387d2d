use serde::{Deserialize, Serialize};

use crate::svg;

/// Output the model is steered into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Unconstrained replies.
    Free,
    /// Every reply continues an SVG root tag and stops at its closing tag.
    #[default]
    Svg,
}

impl OutputFormat {
    /// Opening fragment seeded as an assistant prefix.
    #[must_use]
    pub const fn prefix(self) -> Option<&'static str> {
        match self {
            Self::Free => None,
            Self::Svg => Some(svg::ROOT_PREFIX),
        }
    }

    #[must_use]
    pub const fn stop_sequence(self) -> Option<&'static str> {
        match self {
            Self::Free => None,
            Self::Svg => Some(svg::ROOT_CLOSE),
        }
    }

    #[must_use]
    pub const fn is_forced(self) -> bool {
        matches!(self, Self::Svg)
    }
}
