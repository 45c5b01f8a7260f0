use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum Category {
    #[serde(rename = "App Idea")]
    AppIdea,
    Philosophy,
    Parenting,
    Venting,
    Technical,
    #[serde(rename = "Networking Insight")]
    Networking,
    #[serde(rename = "Absurd Observation")]
    Absurd,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::AppIdea => "App Idea",
            Self::Philosophy => "Philosophy",
            Self::Parenting => "Parenting",
            Self::Venting => "Venting",
            Self::Technical => "Technical",
            Self::Networking => "Networking Insight",
            Self::Absurd => "Absurd Observation",
            Self::Other => "Other",
        }
    }
}

/// One classified capture. Fields the map does not use (timestamp, tags,
/// tone) are ignored on deserialization.
#[derive(Clone, Debug, Deserialize)]
pub struct Note {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub summary: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeMeta {
    pub id: String,
    #[serde(default = "default_significance")]
    pub significance: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LinkMeta {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_strength")]
    pub strength: f64,
    #[serde(default)]
    pub bidirectional: bool,
}

/// Significance scores and links produced by the analysis service.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MapMetadata {
    #[serde(default)]
    pub nodes: Vec<NodeMeta>,
    #[serde(default)]
    pub links: Vec<LinkMeta>,
}

fn default_significance() -> f64 {
    5.0
}

fn default_strength() -> f64 {
    1.0
}

#[derive(Clone, Debug, Default)]
pub struct Workspace {
    pub notes: Vec<Note>,
    pub metadata: Option<MapMetadata>,
}
