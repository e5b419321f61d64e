use crate::foundation::error::{TexOpError, TexOpResult};
use std::collections::BTreeMap;

/// Kind, default and range of one parameter.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterKind {
    /// Floating-point slider.
    Float {
        /// Initial value.
        default: f64,
        /// Lowest accepted value.
        min: f64,
        /// Highest accepted value.
        max: f64,
    },
    /// Integer slider.
    Int {
        /// Initial value.
        default: i64,
        /// Lowest accepted value.
        min: i64,
        /// Highest accepted value.
        max: i64,
    },
    /// On/off toggle.
    Toggle {
        /// Initial value.
        default: bool,
    },
    /// Free text.
    Text {
        /// Initial value.
        default: String,
    },
    /// One of a fixed list of items.
    Menu {
        /// Menu item names.
        items: Vec<String>,
        /// Index of the initial item.
        default: usize,
    },
    /// Momentary button; pressing it calls [`crate::TextureOperator::pulse_pressed`].
    Pulse,
}

/// One registered parameter.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParameterDef {
    /// Script name: an uppercase ASCII letter followed by lowercase letters or digits.
    pub name: String,
    /// Display label.
    pub label: String,
    /// UI page the parameter is shown on.
    pub page: String,
    /// Kind, default and range.
    pub kind: ParameterKind,
}

/// Current value of a parameter.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// Value of an int parameter or menu index.
    Int(i64),
    /// Value of a float parameter.
    Float(f64),
    /// Value of a toggle.
    Toggle(bool),
    /// Value of a text parameter.
    Text(String),
}

/// Outcome of registering a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppendResult {
    /// Registered.
    Success,
    /// The name breaks the naming rule.
    InvalidName,
    /// Another parameter already uses this name.
    DuplicateName,
    /// Range or default is inconsistent (`min > max`, default outside a menu, ...).
    InvalidRange,
}

/// Registration surface handed to [`crate::TextureOperator::setup_parameters`] once at load time.
pub struct ParameterManager<'a> {
    store: &'a mut ParameterStore,
    page: String,
}

impl<'a> ParameterManager<'a> {
    pub(crate) fn new(store: &'a mut ParameterStore) -> Self {
        Self {
            store,
            page: "Custom".to_string(),
        }
    }

    /// Page used for subsequently appended parameters.
    pub fn set_page(&mut self, page: impl Into<String>) {
        self.page = page.into();
    }

    /// Register a float parameter.
    pub fn append_float(
        &mut self,
        name: &str,
        label: &str,
        default: f64,
        min: f64,
        max: f64,
    ) -> AppendResult {
        self.append(name, label, ParameterKind::Float { default, min, max })
    }

    /// Register an integer parameter.
    pub fn append_int(
        &mut self,
        name: &str,
        label: &str,
        default: i64,
        min: i64,
        max: i64,
    ) -> AppendResult {
        self.append(name, label, ParameterKind::Int { default, min, max })
    }

    /// Register a toggle.
    pub fn append_toggle(&mut self, name: &str, label: &str, default: bool) -> AppendResult {
        self.append(name, label, ParameterKind::Toggle { default })
    }

    /// Register a text parameter.
    pub fn append_text(&mut self, name: &str, label: &str, default: &str) -> AppendResult {
        self.append(
            name,
            label,
            ParameterKind::Text {
                default: default.to_string(),
            },
        )
    }

    /// Register a menu.
    pub fn append_menu(
        &mut self,
        name: &str,
        label: &str,
        items: &[&str],
        default: usize,
    ) -> AppendResult {
        self.append(
            name,
            label,
            ParameterKind::Menu {
                items: items.iter().map(|s| s.to_string()).collect(),
                default,
            },
        )
    }

    /// Register a pulse button.
    pub fn append_pulse(&mut self, name: &str, label: &str) -> AppendResult {
        self.append(name, label, ParameterKind::Pulse)
    }

    fn append(&mut self, name: &str, label: &str, kind: ParameterKind) -> AppendResult {
        if !is_valid_name(name) {
            return AppendResult::InvalidName;
        }
        if self.store.def(name).is_some() {
            return AppendResult::DuplicateName;
        }
        let Some(initial) = initial_value(&kind) else {
            return AppendResult::InvalidRange;
        };
        self.store.defs.push(ParameterDef {
            name: name.to_string(),
            label: label.to_string(),
            page: self.page.clone(),
            kind,
        });
        if let Some(v) = initial {
            self.store.values.insert(name.to_string(), v);
        }
        AppendResult::Success
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// `None` for an inconsistent definition, `Some(None)` for kinds without a value.
fn initial_value(kind: &ParameterKind) -> Option<Option<ParameterValue>> {
    match kind {
        ParameterKind::Float { default, min, max } => (min <= max && default.is_finite())
            .then(|| Some(ParameterValue::Float(default.clamp(*min, *max)))),
        ParameterKind::Int { default, min, max } => {
            (min <= max).then(|| Some(ParameterValue::Int((*default).clamp(*min, *max))))
        }
        ParameterKind::Toggle { default } => Some(Some(ParameterValue::Toggle(*default))),
        ParameterKind::Text { default } => Some(Some(ParameterValue::Text(default.clone()))),
        ParameterKind::Menu { items, default } => (*default < items.len())
            .then(|| Some(ParameterValue::Int(*default as i64))),
        ParameterKind::Pulse => Some(None),
    }
}

/// Host-owned parameter store of one node.
#[derive(Clone, Debug, Default)]
pub struct ParameterStore {
    defs: Vec<ParameterDef>,
    values: BTreeMap<String, ParameterValue>,
}

impl ParameterStore {
    /// Registered parameters in registration order.
    pub fn defs(&self) -> &[ParameterDef] {
        &self.defs
    }

    /// Definition of `name`.
    pub fn def(&self, name: &str) -> Option<&ParameterDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    /// Raw value of `name`.
    pub fn value(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    /// Float value of `name` (ints are widened).
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Int value of `name`, or the selected index of a menu.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            ParameterValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Toggle value of `name`.
    pub fn toggle(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            ParameterValue::Toggle(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value of `name`, or the selected item of a menu.
    pub fn text(&self, name: &str) -> Option<&str> {
        match (self.values.get(name)?, &self.def(name)?.kind) {
            (ParameterValue::Text(s), _) => Some(s),
            (ParameterValue::Int(i), ParameterKind::Menu { items, .. }) => {
                usize::try_from(*i).ok().and_then(|i| items.get(i)).map(String::as_str)
            }
            _ => None,
        }
    }

    /// Assign a value. Numbers are clamped to the registered range.
    pub fn set(&mut self, name: &str, value: ParameterValue) -> TexOpResult<()> {
        let def = self
            .def(name)
            .ok_or_else(|| TexOpError::validation(format!("unknown parameter '{name}'")))?;
        let stored = match (&def.kind, value) {
            (ParameterKind::Float { min, max, .. }, ParameterValue::Float(v)) if v.is_finite() => {
                ParameterValue::Float(v.clamp(*min, *max))
            }
            (ParameterKind::Float { min, max, .. }, ParameterValue::Int(v)) => {
                ParameterValue::Float((v as f64).clamp(*min, *max))
            }
            (ParameterKind::Int { min, max, .. }, ParameterValue::Int(v)) => {
                ParameterValue::Int(v.clamp(*min, *max))
            }
            (ParameterKind::Toggle { .. }, ParameterValue::Toggle(v)) => ParameterValue::Toggle(v),
            (ParameterKind::Text { .. }, ParameterValue::Text(v)) => ParameterValue::Text(v),
            (ParameterKind::Menu { items, .. }, ParameterValue::Int(i))
                if usize::try_from(i).is_ok_and(|i| i < items.len()) =>
            {
                ParameterValue::Int(i)
            }
            (ParameterKind::Menu { items, .. }, ParameterValue::Text(s)) => {
                let i = items.iter().position(|it| *it == s).ok_or_else(|| {
                    TexOpError::validation(format!("'{s}' is not an item of menu '{name}'"))
                })?;
                ParameterValue::Int(i as i64)
            }
            (ParameterKind::Pulse, _) => {
                return Err(TexOpError::validation(format!(
                    "'{name}' is a pulse; press it instead of assigning"
                )));
            }
            (kind, v) => {
                return Err(TexOpError::validation(format!(
                    "value {v:?} does not fit parameter '{name}' ({kind:?})"
                )));
            }
        };
        self.values.insert(name.to_string(), stored);
        Ok(())
    }

    /// `true` when `name` is a registered pulse parameter.
    pub fn is_pulse(&self, name: &str) -> bool {
        self.def(name)
            .is_some_and(|d| matches!(d.kind, ParameterKind::Pulse))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operator/params.rs"]
mod tests;
