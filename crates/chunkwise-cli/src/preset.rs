use clap::ValueEnum;

/// Chunk size presets, sized for common embedding model context lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Small chunks for fine-grained retrieval
    Small,
    /// Default sizing for general code search
    Medium,
    /// Large chunks for long-context models
    Large,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// Default minimum chunk size in bytes.
    pub fn default_min_size(&self) -> usize {
        match self {
            Self::Small => 256,
            Self::Medium => 1_000,
            Self::Large => 4_000,
        }
    }

    /// Default maximum chunk size in bytes.
    pub fn default_max_size(&self) -> usize {
        match self {
            Self::Small => 1_000,
            Self::Medium => 4_000,
            Self::Large => 16_000,
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
