//! # Admission toggles.
//!
//! [`Toggles`] is the configuration surface moderators flip at runtime with
//! `toggle <name>`. Each [`Toggle`] names exactly one boolean.
//!
//! | name           | meaning                                                  |
//! |----------------|----------------------------------------------------------|
//! | `open`         | queue accepts joins                                      |
//! | `subsonlymode` | restrict joins to subscribers                            |
//! | `limit`        | cap main-queue size at `Config::queue_limit`             |
//! | `verbose`      | announce muteable denials                                |
//! | `variety`      | consult the ledger's recency window                      |
//! | `newsubperk`   | offer a sub-list slot on a new subscription              |
//! | `runback`      | allow re-joining after a turn in the same session        |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One named toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Toggle {
    Open,
    SubsOnlyMode,
    Limit,
    Verbose,
    Variety,
    NewSubPerk,
    Runback,
}

impl Toggle {
    /// All toggles in display order.
    pub const ALL: [Toggle; 7] = [
        Toggle::NewSubPerk,
        Toggle::SubsOnlyMode,
        Toggle::Limit,
        Toggle::Open,
        Toggle::Verbose,
        Toggle::Variety,
        Toggle::Runback,
    ];

    /// Command-surface name.
    pub fn name(&self) -> &'static str {
        match self {
            Toggle::Open => "open",
            Toggle::SubsOnlyMode => "subsonlymode",
            Toggle::Limit => "limit",
            Toggle::Verbose => "verbose",
            Toggle::Variety => "variety",
            Toggle::NewSubPerk => "newsubperk",
            Toggle::Runback => "runback",
        }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Toggle {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Toggle::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Toggle::ALL.iter().map(Toggle::name).collect();
                EngineError::invalid(format!(
                    "{s} is not a togglable argument; valid: {}",
                    names.join(", ")
                ))
            })
    }
}

/// Current state of every toggle.
///
/// Defaults: `open=false`, `subsonlymode=false`, `limit=true`, `verbose=true`,
/// `variety=false`, `newsubperk=true`, `runback=false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggles {
    pub open: bool,
    pub subsonlymode: bool,
    pub limit: bool,
    pub verbose: bool,
    pub variety: bool,
    pub newsubperk: bool,
    pub runback: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            open: false,
            subsonlymode: false,
            limit: true,
            verbose: true,
            variety: false,
            newsubperk: true,
            runback: false,
        }
    }
}

impl Toggles {
    /// Reads one toggle.
    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Open => self.open,
            Toggle::SubsOnlyMode => self.subsonlymode,
            Toggle::Limit => self.limit,
            Toggle::Verbose => self.verbose,
            Toggle::Variety => self.variety,
            Toggle::NewSubPerk => self.newsubperk,
            Toggle::Runback => self.runback,
        }
    }

    /// Sets one toggle.
    pub fn set(&mut self, toggle: Toggle, value: bool) {
        let slot = match toggle {
            Toggle::Open => &mut self.open,
            Toggle::SubsOnlyMode => &mut self.subsonlymode,
            Toggle::Limit => &mut self.limit,
            Toggle::Verbose => &mut self.verbose,
            Toggle::Variety => &mut self.variety,
            Toggle::NewSubPerk => &mut self.newsubperk,
            Toggle::Runback => &mut self.runback,
        };
        *slot = value;
    }

    /// Flips one toggle and returns its new value.
    pub fn flip(&mut self, toggle: Toggle) -> bool {
        let value = !self.get(toggle);
        self.set(toggle, value);
        value
    }

    /// Iterates `(toggle, value)` in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Toggle, bool)> + '_ {
        Toggle::ALL.into_iter().map(|t| (t, self.get(t)))
    }
}

impl fmt::Display for Toggles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (toggle, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{toggle}: {value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_changes_exactly_one() {
        let mut toggles = Toggles::default();
        let before = toggles;
        assert!(toggles.flip(Toggle::Open));

        for (toggle, value) in toggles.iter() {
            if toggle == Toggle::Open {
                assert_ne!(value, before.get(toggle));
            } else {
                assert_eq!(value, before.get(toggle), "{toggle} must be untouched");
            }
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("SubsOnlyMode".parse::<Toggle>().unwrap(), Toggle::SubsOnlyMode);
        assert_eq!(" runback ".parse::<Toggle>().unwrap(), Toggle::Runback);
    }

    #[test]
    fn test_unknown_toggle_lists_valid_names() {
        let err = "turbo".parse::<Toggle>().unwrap_err();
        let EngineError::InvalidArgument { reason } = err else {
            panic!("expected InvalidArgument");
        };
        assert!(reason.contains("turbo"));
        assert!(reason.contains("newsubperk"));
    }

    #[test]
    fn test_display_reports_full_map() {
        let rendered = Toggles::default().to_string();
        for toggle in Toggle::ALL {
            assert!(rendered.contains(toggle.name()));
        }
        assert!(rendered.contains("open: false"));
    }
}
