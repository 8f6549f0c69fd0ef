//! Named device factories.
//!
//! A [`DeviceRegistry`] is an ordinary value the host builds and passes to
//! [`Computer::attach_from_registry`](crate::Computer::attach_from_registry).
//! There is no global registry, so tests stay hermetic.

use std::collections::BTreeMap;

use crate::Device;

type Factory = Box<dyn Fn() -> Box<dyn Device>>;

/// Map from device name to a factory producing fresh instances.
///
/// # Examples
///
/// ```
/// use tr3200::{Device, DeviceRegistry};
///
/// struct Null;
/// impl Device for Null {
///     fn reset(&mut self) {}
///     fn send_cmd(&mut self, _cmd: u16) {}
///     fn dev_type(&self) -> u8 { 0 }
///     fn dev_subtype(&self) -> u8 { 0 }
///     fn dev_id(&self) -> u8 { 0 }
///     fn vendor_id(&self) -> u32 { 0 }
/// }
///
/// let mut registry = DeviceRegistry::new();
/// registry.register("null", || Box::new(Null));
///
/// assert!(registry.create("null").is_some());
/// assert!(registry.create("missing").is_none());
/// assert_eq!(registry.names().collect::<Vec<_>>(), ["null"]);
/// ```
#[derive(Default)]
pub struct DeviceRegistry {
    factories: BTreeMap<String, Factory>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Device> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Builds a new device, or `None` if the name is unknown.
    pub fn create(&self, name: &str) -> Option<Box<dyn Device>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
