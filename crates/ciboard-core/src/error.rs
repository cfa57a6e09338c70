use std::fmt;

/// Machine-readable error codes surfaced by the CLI and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    UnknownView,
    UnknownSection,
    KindMismatch,
    InvalidValueKey,
    DuplicateSection,
    InvalidDefault,
    MalformedValue,
    SummaryParseError,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::UnknownView => "E1002",
            Self::UnknownSection => "E2001",
            Self::KindMismatch => "E2002",
            Self::InvalidValueKey => "E2003",
            Self::DuplicateSection => "E2004",
            Self::InvalidDefault => "E2005",
            Self::MalformedValue => "E3001",
            Self::SummaryParseError => "E3002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::UnknownView => "Unknown dashboard view",
            Self::UnknownSection => "Filter section not in schema",
            Self::KindMismatch => "Operation does not apply to this section kind",
            Self::InvalidValueKey => "Invalid value for filter section",
            Self::DuplicateSection => "Filter section registered twice",
            Self::InvalidDefault => "Enum default is not an allowed value",
            Self::MalformedValue => "Malformed query value",
            Self::SummaryParseError => "Aggregate summary parse error",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .ciboard/config.toml and retry."),
            Self::UnknownView => Some("Run `cib schema --list` to see the available views."),
            Self::UnknownSection => Some("Run `cib schema --view <view>` to list its sections."),
            Self::KindMismatch => {
                Some("Use toggle/replace for sets, --min/--max for ranges, --value for enums.")
            }
            Self::InvalidValueKey => {
                Some("Value keys must be non-empty, contain no ',' and belong to the section domain.")
            }
            Self::DuplicateSection | Self::InvalidDefault => {
                Some("Fix the view declaration in the config file.")
            }
            Self::MalformedValue => None,
            Self::SummaryParseError => Some("Check that the summary file is a JSON object."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Wiring errors between a caller and the governing [`FilterSchema`].
///
/// These indicate that code and schema disagree. They are returned as hard
/// failures and never substituted with defaults.
///
/// [`FilterSchema`]: crate::schema::FilterSchema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("unknown filter section '{0}'")]
    UnknownSection(String),

    #[error("section '{section}' is a {kind} section; {operation} does not apply")]
    KindMismatch {
        section: String,
        kind: &'static str,
        operation: &'static str,
    },

    #[error("invalid value '{value}' for section '{section}': {reason}")]
    InvalidValueKey {
        section: String,
        value: String,
        reason: &'static str,
    },

    #[error("filter section '{0}' is registered twice")]
    DuplicateSection(String),

    #[error("default '{default}' of section '{section}' is not one of its allowed values")]
    InvalidDefault { section: String, default: String },
}

impl FilterError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownSection(_) => ErrorCode::UnknownSection,
            Self::KindMismatch { .. } => ErrorCode::KindMismatch,
            Self::InvalidValueKey { .. } => ErrorCode::InvalidValueKey,
            Self::DuplicateSection(_) => ErrorCode::DuplicateSection,
            Self::InvalidDefault { .. } => ErrorCode::InvalidDefault,
        }
    }

    /// Remediation hint for operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// A query field whose value did not match its section's kind.
///
/// Recovered locally: the section falls back to its empty default and the
/// rest of the record still decodes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed value for '{key}': {reason} (got '{raw}')")]
pub struct MalformedValue {
    /// Section the field belongs to.
    pub section: String,
    /// Query key that carried the value.
    pub key: String,
    pub raw: String,
    pub reason: &'static str,
}
