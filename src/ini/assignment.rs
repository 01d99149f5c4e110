use std::str::FromStr;

use crate::error::Error;

/// A parameter assignment given on the command line, written as
/// `section.option=value` or `section/option=value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub section: String,
    pub option: String,
    pub value: String,
}

/// A parameter location given as `section.option` or `section/option`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionPath {
    pub section: String,
    pub option: String,
}

impl FromStr for OptionPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (section, option) = s
            .split_once('/')
            .or_else(|| s.split_once('.'))
            .ok_or_else(|| Error::Parameters(format!("expected section.option, found {s:?}")))?;
        let (section, option) = (section.trim(), option.trim());
        if section.is_empty() || option.is_empty() {
            return Err(Error::Parameters(format!(
                "empty section or option in {s:?}"
            )));
        }
        Ok(Self {
            section: section.to_owned(),
            option: option.to_owned(),
        })
    }
}

impl FromStr for Assignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, value) = s
            .split_once('=')
            .ok_or_else(|| Error::Parameters(format!("expected section.option=value, found {s:?}")))?;
        let OptionPath { section, option } = path.parse()?;
        Ok(Self {
            section,
            option,
            value: value.trim().to_owned(),
        })
    }
}
