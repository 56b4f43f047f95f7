/// Which of a profile's photo albums to harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum AlbumKind {
    /// Photos the account is tagged in.
    #[value(name = "of")]
    TaggedIn,
    /// Photos the account uploaded.
    #[value(name = "by")]
    UploadedBy,
}

impl AlbumKind {
    /// Suffix used in the album URL and in downloaded filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlbumKind::TaggedIn => "of",
            AlbumKind::UploadedBy => "by",
        }
    }
}

impl std::fmt::Display for AlbumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
