#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeminiModel {
    #[default]
    Flash20,     // "gemini-2.0-flash"
    Flash20Lite, // "gemini-2.0-flash-lite"
    Flash25,     // "gemini-2.5-flash"
    Pro25,       // "gemini-2.5-pro"
    Override(String),
}

impl GeminiModel {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Flash20 => "gemini-2.0-flash",
            Self::Flash20Lite => "gemini-2.0-flash-lite",
            Self::Flash25 => "gemini-2.5-flash",
            Self::Pro25 => "gemini-2.5-pro",
            Self::Override(s) => s.as_str(),
        }
    }
}

impl From<&str> for GeminiModel {
    fn from(id: &str) -> Self {
        match id {
            "gemini-2.0-flash" => Self::Flash20,
            "gemini-2.0-flash-lite" => Self::Flash20Lite,
            "gemini-2.5-flash" => Self::Flash25,
            "gemini-2.5-pro" => Self::Pro25,
            other => Self::Override(other.to_string()),
        }
    }
}
