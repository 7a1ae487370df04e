use std::fmt;

/// Coarse user-agent classification used by the statistics counters.
///
/// Derived by ordered substring match; the order is part of the persisted
/// contract (a UA string containing both "Android" and "Linux" counts as
/// android, an iPhone UA advertising "Macintosh" counts as mac).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAgentClass {
    Windows,
    Mac,
    Ios,
    Android,
    Linux,
    Other,
}

impl UserAgentClass {
    pub fn classify(user_agent: &str) -> Self {
        if user_agent.contains("Windows") {
            Self::Windows
        } else if user_agent.contains("Macintosh") {
            Self::Mac
        } else if user_agent.contains("iPhone") {
            Self::Ios
        } else if user_agent.contains("Android") {
            Self::Android
        } else if user_agent.contains("Linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Mac => "mac",
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Linux => "linux",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for UserAgentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
