use std::fs;
use std::path::Path;
use std::str::FromStr;

use derive_traits::SimdriverParameters;
use linked_hash_map::LinkedHashMap;
use log::debug;
use serde_yaml::Mapping;
use serde_yaml::Value;

use crate::error::Error;
use crate::error::IoResultExt;
use crate::error::Result;

/// Replaces a value in a campaign file, written as
/// `section/key/subkey=value`. Keys into sequences are indices,
/// e.g. `runs/0/label=brio_wu`.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub section: String,
    pub keys: Vec<String>,
    pub value: Value,
}

impl FromStr for Override {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (path, value) = s
            .split_once('=')
            .ok_or_else(|| Error::Parameters(format!("expected section/key=value, found {s:?}")))?;
        let mut keys = path.trim().split('/').map(|key| key.to_owned());
        let section = keys
            .next()
            .filter(|section| !section.is_empty())
            .ok_or_else(|| Error::Parameters(format!("missing section in override {s:?}")))?;
        let keys: Vec<_> = keys.collect();
        if keys.iter().any(|key| key.is_empty()) {
            return Err(Error::Parameters(format!("empty key in override {s:?}")));
        }
        Ok(Self {
            section,
            keys,
            value: serde_yaml::from_str(value.trim())?,
        })
    }
}

/// The sections of a YAML campaign file. Sections are extracted into
/// parameter structs one at a time, command line overrides are applied
/// on extraction.
#[derive(Debug, Default)]
pub struct ParameterFileContents {
    sections: LinkedHashMap<String, Value>,
    overrides: Vec<Override>,
}

fn insert_overrides(value: &mut Value, overrides: &[Override]) -> Result<()> {
    for o in overrides.iter() {
        set_sublevel_value_by_keys(value, &o.keys, o.value.clone())?;
    }
    Ok(())
}

/// Constructs a map of the form
/// key1: key2: key3: ... key_n: Value
/// If keys is empty, returns value
fn construct_sub_mapping(keys: &[String], value: Value) -> Value {
    match keys.split_first() {
        None => value,
        Some((key, rest)) => {
            let mut map = Mapping::default();
            map.insert(Value::String(key.clone()), construct_sub_mapping(rest, value));
            Value::Mapping(map)
        }
    }
}

fn set_sublevel_value_by_keys(value: &mut Value, keys: &[String], target_value: Value) -> Result<()> {
    let (key, rest) = match keys.split_first() {
        None => {
            *value = target_value;
            return Ok(());
        }
        Some(split) => split,
    };
    if value.is_null() {
        *value = construct_sub_mapping(keys, target_value);
        return Ok(());
    }
    match value {
        Value::Mapping(mapping) => match mapping.get_mut(key.as_str()) {
            Some(sub_value) => set_sublevel_value_by_keys(sub_value, rest, target_value),
            None => {
                mapping.insert(
                    Value::String(key.clone()),
                    construct_sub_mapping(rest, target_value),
                );
                Ok(())
            }
        },
        Value::Sequence(sequence) => {
            let len = sequence.len();
            let element = key
                .parse::<usize>()
                .ok()
                .and_then(|index| sequence.get_mut(index))
                .ok_or_else(|| {
                    Error::Parameters(format!("invalid index {key:?} into list of length {len}"))
                })?;
            set_sublevel_value_by_keys(element, rest, target_value)
        }
        other => Err(Error::Parameters(format!(
            "cannot set key {key:?} inside value {other:?}"
        ))),
    }
}

impl ParameterFileContents {
    pub fn new(contents: &str) -> Result<Self> {
        let value: Value = if contents.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml::from_str(contents)?
        };
        let sections = match value {
            Value::Null => LinkedHashMap::new(),
            Value::Mapping(mapping) => mapping
                .into_iter()
                .map(|(k, v)| match k {
                    Value::String(name) => Ok((name, v)),
                    other => Err(Error::Parameters(format!(
                        "section names must be strings, found {other:?}"
                    ))),
                })
                .collect::<Result<_>>()?,
            _ => {
                return Err(Error::Parameters(
                    "could not parse parameter file as mapping".into(),
                ))
            }
        };
        Ok(Self {
            sections,
            overrides: vec![],
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_owned()));
        }
        Self::new(&fs::read_to_string(path).at_path(path)?)
    }

    pub fn with_overrides(&mut self, overrides: Vec<Override>) {
        self.overrides = overrides;
    }

    pub fn get_section_names(&self) -> impl Iterator<Item = &String> {
        self.sections.keys()
    }

    fn get_overrides_for_section<'a>(
        &'a self,
        section_name: &'a str,
    ) -> impl Iterator<Item = Override> + 'a {
        self.overrides
            .iter()
            .filter(move |o| o.section == section_name)
            .cloned()
    }

    fn has_overrides_for_section(&self, section_name: &str) -> bool {
        self.get_overrides_for_section(section_name).next().is_some()
    }

    /// The sections as they were used, i.e. with overrides applied and
    /// with defaults for omitted sections that have been extracted.
    pub fn contents(&self) -> Result<String> {
        let mut map = Mapping::default();
        for (name, value) in self.sections.iter() {
            map.insert(Value::String(name.into()), value.clone());
        }
        Ok(serde_yaml::to_string(&map)?)
    }

    pub fn extract_parameter_struct<T: SimdriverParameters>(&mut self) -> Result<T> {
        let section_name = T::unwrap_section_name();
        let overrides_this_section: Vec<_> = self.get_overrides_for_section(section_name).collect();
        let (value, present) = match self.sections.get(section_name) {
            Some(section_value) => (section_value.clone(), true),
            None => {
                debug!(
                    "Parameter section missing for '{}', assuming defaults",
                    section_name
                );
                (Value::Mapping(Mapping::default()), false)
            }
        };
        let mut value = value;
        insert_overrides(&mut value, &overrides_this_section)?;
        let extracted = serde_yaml::from_value::<T>(value.clone()).map_err(|e| {
            let overridden = value.as_mapping().map(|m| !m.is_empty()).unwrap_or(true);
            if present || overridden {
                Error::Parameters(format!("failed to parse section {section_name}: {e}"))
            } else {
                Error::Parameters(format!(
                    "required section {section_name} not present in parameter file"
                ))
            }
        })?;
        self.sections
            .insert(section_name.to_owned(), serde_yaml::to_value(&extracted)?);
        Ok(extracted)
    }

    /// Like `extract_parameter_struct`, but returns `None` if neither the
    /// file nor the overrides mention the section.
    pub fn extract_optional_parameter_struct<T: SimdriverParameters>(
        &mut self,
    ) -> Result<Option<T>> {
        let section_name = T::unwrap_section_name();
        if self.sections.contains_key(section_name) || self.has_overrides_for_section(section_name) {
            self.extract_parameter_struct().map(Some)
        } else {
            Ok(None)
        }
    }
}
