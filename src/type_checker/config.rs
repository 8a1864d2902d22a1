use std::collections::BTreeMap;

use crate::{
    ast::{
        ast::{ConfigEntry, ConfigValue},
        types::Type,
    },
    errors::errors::ErrorImpl,
};

/// A tunable of the generated evaluator, emitted as a C++ constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOption {
    pub name: &'static str,
    pub ty: Type,
    pub c_type: &'static str,
    pub value: ConfigValue,
}

/// The fixed option table, kept in name order.
#[derive(Debug, Clone)]
pub struct ConfigOptions {
    options: BTreeMap<&'static str, ConfigOption>,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        let mut options = BTreeMap::new();
        for option in [
            ConfigOption {
                name: "centipawn_value",
                ty: Type::Num,
                c_type: "int",
                value: ConfigValue::Num(1.0),
            },
            ConfigOption {
                name: "debug",
                ty: Type::Bool,
                c_type: "bool",
                value: ConfigValue::Bool(false),
            },
            ConfigOption {
                name: "default_PStables",
                ty: Type::Bool,
                c_type: "bool",
                value: ConfigValue::Bool(false),
            },
        ] {
            options.insert(option.name, option);
        }

        ConfigOptions { options }
    }
}

impl ConfigOptions {
    pub fn new() -> Self {
        ConfigOptions::default()
    }

    /// Overrides the default of one option.
    pub fn set(&mut self, entry: &ConfigEntry) -> Result<(), ErrorImpl> {
        let option = match self.options.get_mut(entry.name.as_str()) {
            Some(option) => option,
            None => {
                return Err(ErrorImpl::UnknownConfigOption {
                    option: entry.name.clone(),
                })
            }
        };

        // `int` options are emitted as C++ integer constants
        let matches = match (&option.ty, &entry.value) {
            (Type::Num, ConfigValue::Num(value)) => option.c_type != "int" || value.fract() == 0.0,
            (Type::Bool, ConfigValue::Bool(_)) => true,
            _ => false,
        };
        if !matches {
            return Err(ErrorImpl::ConfigOptionTypeError {
                option: entry.name.clone(),
                expected: match option.c_type {
                    "int" => format!("{} (integer)", option.ty),
                    _ => option.ty.to_string(),
                },
            });
        }

        option.value = entry.value.clone();
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ConfigOption> {
        self.options.get(name)
    }

    pub fn options(&self) -> impl Iterator<Item = &ConfigOption> {
        self.options.values()
    }
}
