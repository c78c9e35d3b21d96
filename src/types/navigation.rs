use serde::{Deserialize, Serialize};

/// A directional command issued by the titlebar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum NavigationAction {
    Back,
    Forward,
    Reload,
    ZoomIn,
    ZoomOut,
}

impl NavigationAction {
    /// Parses the wire name (`back`, `forward`, `reload`, `zoomIn`, `zoomOut`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "back" => Some(Self::Back),
            "forward" => Some(Self::Forward),
            "reload" => Some(Self::Reload),
            "zoomIn" => Some(Self::ZoomIn),
            "zoomOut" => Some(Self::ZoomOut),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Forward => "forward",
            Self::Reload => "reload",
            Self::ZoomIn => "zoomIn",
            Self::ZoomOut => "zoomOut",
        }
    }
}

/// Command envelope. The `id` is the change signal: two signals with the same
/// action are still distinct commands when their ids differ.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NavigationSignal {
    pub action: Option<NavigationAction>,
    pub id: String,
}

impl NavigationSignal {
    /// True for the initial empty signal that no controller should act on.
    pub fn is_idle(&self) -> bool {
        self.action.is_none() || self.id.is_empty()
    }
}
