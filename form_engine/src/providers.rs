use log::{debug, warn};
use std::collections::HashMap;

use crate::config::*;

/// The rendering surface the resolver collects answers from.
///
/// An interactive toolkit, a terminal prompt or a scripted fixture can all
/// play this role. The value returned by `get_value` is used as the resolved
/// value without further conversion.
pub trait WidgetProvider {
    fn get_checkbox(&mut self, label: &str, default: bool) -> Result<bool, FormErrors>;

    fn get_value(&mut self, request: &WidgetRequest) -> Result<Value, FormErrors>;

    /// Called for an active field that carries a section header.
    fn show_header(&mut self, _label: &str) {}
}

/// Accepts every default: checkboxes keep their initial state and widgets
/// return their coerced default value.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultsProvider;

impl WidgetProvider for DefaultsProvider {
    fn get_checkbox(&mut self, label: &str, default: bool) -> Result<bool, FormErrors> {
        debug!("DefaultsProvider: checkbox {:?} -> {}", label, default);
        Ok(default)
    }

    fn get_value(&mut self, request: &WidgetRequest) -> Result<Value, FormErrors> {
        debug!(
            "DefaultsProvider: {} {:?} -> {:?}",
            request.kind.name(),
            request.key,
            request.default
        );
        Ok(request.default.clone())
    }
}

/// Replays recorded answers.
///
/// Checkboxes are looked up by label, widgets by key. Without an answer the
/// default is used, unless the provider is strict.
#[derive(Debug, Clone, Default)]
pub struct ReplayProvider {
    checkboxes: HashMap<String, bool>,
    values: HashMap<String, Value>,
    strict: bool,
    headers: Vec<String>,
}

impl ReplayProvider {
    pub fn new(strict: bool) -> ReplayProvider {
        ReplayProvider {
            strict,
            ..ReplayProvider::default()
        }
    }

    pub fn checkbox(mut self, label: &str, checked: bool) -> ReplayProvider {
        self.checkboxes.insert(label.to_string(), checked);
        self
    }

    pub fn value(mut self, key: &str, value: impl Into<Value>) -> ReplayProvider {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// The headers shown so far, in order.
    pub fn headers_shown(&self) -> &[String] {
        &self.headers
    }
}

impl WidgetProvider for ReplayProvider {
    fn get_checkbox(&mut self, label: &str, default: bool) -> Result<bool, FormErrors> {
        match self.checkboxes.get(label) {
            Some(b) => Ok(*b),
            None if self.strict => Err(FormErrors::MissingAnswer(format!("checkbox {:?}", label))),
            None => {
                warn!(
                    "ReplayProvider: no answer for checkbox {:?}, using default {}",
                    label, default
                );
                Ok(default)
            }
        }
    }

    fn get_value(&mut self, request: &WidgetRequest) -> Result<Value, FormErrors> {
        match self.values.get(&request.key) {
            Some(v) => Ok(v.clone()),
            None if self.strict => Err(FormErrors::MissingAnswer(format!(
                "widget {:?} ({})",
                request.key, request.label
            ))),
            None => {
                warn!(
                    "ReplayProvider: no answer for widget {:?}, using default {}",
                    request.key, request.default
                );
                Ok(request.default.clone())
            }
        }
    }

    fn show_header(&mut self, label: &str) {
        self.headers.push(label.to_string());
    }
}
