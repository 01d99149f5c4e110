use std::fmt;

use linked_hash_map::LinkedHashMap;

use crate::error::Error;
use crate::error::Result;

/// Name of the section whose options serve as fallback for every
/// other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Clone, Debug, PartialEq)]
struct Entry {
    key: String,
    value: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Section {
    // Keyed by the lowercase option name, the original spelling is in `Entry`.
    options: LinkedHashMap<String, Entry>,
}

impl Section {
    fn get(&self, option: &str) -> Option<&str> {
        self.options
            .get(&option_key(option))
            .map(|entry| entry.value.as_str())
    }
}

fn option_key(option: &str) -> String {
    option.to_lowercase()
}

/// An ordered key/value document made of named sections.
/// Sections and options are kept in the order in which they were
/// read or added. Option names are matched case-insensitively.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IniDocument {
    sections: LinkedHashMap<String, Section>,
}

struct Continuation {
    key: String,
    indent: usize,
}

impl IniDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let mut document = Self::default();
        let mut current_section: Option<String> = None;
        let mut continuation: Option<Continuation> = None;
        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continuation = None;
                continue;
            }
            if line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let indent = raw_line.len() - raw_line.trim_start().len();
            if let (Some(section), Some(cont)) = (&current_section, &continuation) {
                let entry = document
                    .sections
                    .get_mut(section)
                    .and_then(|s| s.options.get_mut(&cont.key));
                if let (true, Some(entry)) = (indent > cont.indent, entry) {
                    entry.value.push('\n');
                    entry.value.push_str(line);
                    continue;
                }
            }
            continuation = None;
            if let Some(name) = parse_section_header(line) {
                if document.sections.contains_key(name) {
                    return Err(Error::DuplicateSection(name.to_owned()));
                }
                document
                    .sections
                    .insert(name.to_owned(), Section::default());
                current_section = Some(name.to_owned());
                continue;
            }
            let section = current_section.as_ref().ok_or_else(|| Error::Ini {
                line: line_number,
                message: format!("missing section header before {line:?}"),
            })?;
            let (key, value) = split_option(line).ok_or_else(|| Error::Ini {
                line: line_number,
                message: format!("expected 'key = value', found {line:?}"),
            })?;
            let options = &mut document
                .sections
                .get_mut(section)
                .ok_or_else(|| Error::NoSection(section.clone()))?
                .options;
            let lookup = option_key(key);
            if options.contains_key(&lookup) {
                return Err(Error::DuplicateOption {
                    section: section.clone(),
                    option: key.to_owned(),
                });
            }
            options.insert(
                lookup.clone(),
                Entry {
                    key: key.to_owned(),
                    value: value.to_owned(),
                },
            );
            continuation = Some(Continuation {
                key: lookup,
                indent,
            });
        }
        Ok(document)
    }

    /// All section names except the default section.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections
            .keys()
            .map(|name| name.as_str())
            .filter(|name| *name != DEFAULT_SECTION)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn add_section(&mut self, section: &str) -> Result<()> {
        if self.has_section(section) {
            return Err(Error::DuplicateSection(section.to_owned()));
        }
        self.sections.insert(section.to_owned(), Section::default());
        Ok(())
    }

    /// The options defined directly in `section`, in order.
    pub fn options(&self, section: &str) -> Result<impl Iterator<Item = (&str, &str)>> {
        let section = self
            .sections
            .get(section)
            .ok_or_else(|| Error::NoSection(section.to_owned()))?;
        Ok(section
            .options
            .values()
            .map(|entry| (entry.key.as_str(), entry.value.as_str())))
    }

    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.get(section, option).is_ok()
    }

    pub fn get(&self, section: &str, option: &str) -> Result<&str> {
        let own = self
            .sections
            .get(section)
            .ok_or_else(|| Error::NoSection(section.to_owned()))?;
        own.get(option)
            .or_else(|| {
                self.sections
                    .get(DEFAULT_SECTION)
                    .and_then(|defaults| defaults.get(option))
            })
            .ok_or_else(|| Error::NoOption {
                section: section.to_owned(),
                option: option.to_owned(),
            })
    }

    /// Set an option, keeping its position if it already exists.
    /// The section has to exist already, except for the default section.
    pub fn set(&mut self, section: &str, option: &str, value: impl fmt::Display) -> Result<()> {
        if section == DEFAULT_SECTION && !self.has_section(section) {
            self.add_section(section)?;
        }
        let options = &mut self
            .sections
            .get_mut(section)
            .ok_or_else(|| Error::NoSection(section.to_owned()))?
            .options;
        let value = value.to_string();
        let lookup = option_key(option);
        match options.get_mut(&lookup) {
            Some(entry) => entry.value = value,
            None => {
                options.insert(
                    lookup,
                    Entry {
                        key: option.to_owned(),
                        value,
                    },
                );
            }
        }
        Ok(())
    }

    /// Returns whether the option existed.
    pub fn remove_option(&mut self, section: &str, option: &str) -> Result<bool> {
        let section = self
            .sections
            .get_mut(section)
            .ok_or_else(|| Error::NoSection(section.to_owned()))?;
        Ok(section.options.remove(&option_key(option)).is_some())
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let defaults = self
            .sections
            .get(DEFAULT_SECTION)
            .map(|section| (DEFAULT_SECTION, section));
        let others = self
            .sections
            .iter()
            .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
            .map(|(name, section)| (name.as_str(), section));
        for (name, section) in defaults.into_iter().chain(others) {
            writeln!(f, "[{name}]")?;
            for entry in section.options.values() {
                writeln!(f, "{} = {}", entry.key, entry.value.replace('\n', "\n\t"))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn parse_section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let end = rest.rfind(']')?;
    let name = rest[..end].trim();
    (!name.is_empty()).then_some(name)
}

fn split_option(line: &str) -> Option<(&str, &str)> {
    let delimiter = line.find(|c| c == '=' || c == ':')?;
    let key = line[..delimiter].trim();
    let value = line[delimiter + 1..].trim();
    (!key.is_empty()).then_some((key, value))
}
