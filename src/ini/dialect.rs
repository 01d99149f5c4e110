use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The surface syntax of a configuration file. Both dialects share
/// the key/value body and only differ in how section headers are
/// delimited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dialect {
    /// `[section]` headers, as read by fv2d.
    #[default]
    Standard,
    /// `<section>` headers, as read by Athena++.
    Athena,
}

impl Dialect {
    /// Guess the dialect from the file name. Athena input files are
    /// conventionally called `athinput.<problem>` or `<problem>.athinput`.
    pub fn infer(path: &Path) -> Self {
        let has_athena_extension = path
            .extension()
            .map(|ext| ext == "athinput")
            .unwrap_or(false);
        let has_athena_prefix = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with("athinput"))
            .unwrap_or(false);
        if has_athena_extension || has_athena_prefix {
            Self::Athena
        } else {
            Self::Standard
        }
    }

    /// The file extension used when writing a new file of this dialect.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Standard => "ini",
            Self::Athena => "athinput",
        }
    }

    /// Translate text in this dialect into the standard one.
    /// The substitution is applied to the whole text, not just to headers.
    pub fn to_standard(self, text: &str) -> String {
        match self {
            Self::Standard => text.to_owned(),
            Self::Athena => text.replace('<', "[").replace('>', "]"),
        }
    }

    /// Translate standard text into this dialect.
    pub fn render(self, text: &str) -> String {
        match self {
            Self::Standard => text.to_owned(),
            Self::Athena => text.replace('[', "<").replace(']', ">"),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Athena => write!(f, "athena"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "ini" | "fv2d" => Ok(Self::Standard),
            "athena" | "athinput" => Ok(Self::Athena),
            other => Err(format!(
                "unknown dialect {other:?}, expected 'standard' or 'athena'"
            )),
        }
    }
}
