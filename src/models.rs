use std::fmt;

/// Sentinel choice meaning "write nothing".
pub const NONE_CHOICE: &str = "None";

/// The two artifact families gitman knows how to provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum TemplateKind {
    Gitignore,
    License,
}

/// Whether a picker returns one name or an ordered list of names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickMode {
    Single,
    Multi,
}

impl TemplateKind {
    /// Subdirectory of the config root (and of `.cache`) holding this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Gitignore => "gitignores",
            Self::License => "licenses",
        }
    }

    /// Filename suffix stripped from store entries to recover the name.
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Gitignore => Some(".gitignore"),
            Self::License => None,
        }
    }

    /// File written into the target repository.
    pub fn artifact_name(self) -> &'static str {
        match self {
            Self::Gitignore => ".gitignore",
            Self::License => "LICENSE",
        }
    }

    pub fn pick_mode(self) -> PickMode {
        match self {
            Self::Gitignore => PickMode::Multi,
            Self::License => PickMode::Single,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Gitignore => "gitignore",
            Self::License => "license",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
