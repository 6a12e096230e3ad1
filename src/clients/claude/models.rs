#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClaudeModel {
    #[default]
    Haiku35,  // "claude-3-5-haiku-latest"
    Sonnet37, // "claude-3-7-sonnet-latest"
    Sonnet4,  // "claude-sonnet-4-20250514"
    Override(String),
}

impl ClaudeModel {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Haiku35 => "claude-3-5-haiku-latest",
            Self::Sonnet37 => "claude-3-7-sonnet-latest",
            Self::Sonnet4 => "claude-sonnet-4-20250514",
            Self::Override(s) => s.as_str(),
        }
    }
}

impl From<&str> for ClaudeModel {
    fn from(id: &str) -> Self {
        match id {
            "claude-3-5-haiku-latest" => Self::Haiku35,
            "claude-3-7-sonnet-latest" => Self::Sonnet37,
            "claude-sonnet-4-20250514" => Self::Sonnet4,
            other => Self::Override(other.to_string()),
        }
    }
}
