//! User settings persisted under the `settings` key

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::Filter;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        })
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" | "auto" => Ok(Theme::System),
            other => Err(Error::InvalidArgument(format!(
                "unknown theme '{other}' (expected light|dark|system)"
            ))),
        }
    }
}

/// Preferences that never affect task invariants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Active view filter used when none is given explicitly
    pub filter: Filter,
    pub theme: Theme,
    /// Completed tasks move to history instead of staying in the list
    pub archive_on_complete: bool,
    pub notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            filter: Filter::All,
            theme: Theme::System,
            archive_on_complete: false,
            notifications: true,
        }
    }
}

/// Partial settings change; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub filter: Option<Filter>,
    pub theme: Option<Theme>,
    pub archive_on_complete: Option<bool>,
    pub notifications: Option<bool>,
}

impl SettingsUpdate {
    /// Build an update from a `key value` pair as typed on the command line
    ///
    /// Keys are accepted in kebab-case, snake_case or camelCase.
    pub fn from_key_value(key: &str, value: &str) -> Result<Self> {
        let normalized: String = key
            .trim()
            .chars()
            .filter(|ch| *ch != '-' && *ch != '_')
            .flat_map(char::to_lowercase)
            .collect();

        let mut update = Self::default();
        match normalized.as_str() {
            "filter" => update.filter = Some(value.parse()?),
            "theme" => update.theme = Some(value.parse()?),
            "archiveoncomplete" => update.archive_on_complete = Some(parse_bool(key, value)?),
            "notifications" => update.notifications = Some(parse_bool(key, value)?),
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "unknown setting '{key}' (expected filter|theme|archive-on-complete|notifications)"
                )))
            }
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(filter) = self.filter {
            settings.filter = filter;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(archive) = self.archive_on_complete {
            settings.archive_on_complete = archive;
        }
        if let Some(notifications) = self.notifications {
            settings.notifications = notifications;
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(Error::InvalidArgument(format!(
            "setting '{key}' expects true|false, got '{other}'"
        ))),
    }
}
