//! Discovered device set for one scan

use std::collections::HashMap;

/// A device seen during the current scan
#[derive(Debug, Clone)]
pub struct DiscoveredDevice<T> {
    pub address: String,
    pub name: Option<String>,
    pub handle: T,
}

impl<T> DiscoveredDevice<T> {
    /// `"<name or address> (<address>)"`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name.as_deref().unwrap_or(&self.address), self.address)
    }
}

/// Address-keyed device set that keeps discovery order.
///
/// Reset at the start of every scan; never expires entries.
#[derive(Debug)]
pub struct DeviceRegistry<T> {
    devices: HashMap<String, DiscoveredDevice<T>>,
    order: Vec<String>,
}

impl<T> Default for DeviceRegistry<T> {
    fn default() -> Self {
        Self {
            devices: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T> DeviceRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.devices.clear();
        self.order.clear();
    }

    /// Returns false if the address was already known.
    pub fn insert(&mut self, address: String, name: Option<String>, handle: T) -> bool {
        if self.devices.contains_key(&address) {
            return false;
        }
        self.order.push(address.clone());
        self.devices.insert(
            address.clone(),
            DiscoveredDevice {
                address,
                name,
                handle,
            },
        );
        true
    }

    pub fn get(&self, address: &str) -> Option<&DiscoveredDevice<T>> {
        self.devices.get(address)
    }

    pub fn get_index(&self, index: usize) -> Option<&DiscoveredDevice<T>> {
        self.order.get(index).and_then(|a| self.devices.get(a))
    }

    /// Look up by list index or by address (case-insensitive).
    pub fn select(&self, selector: &str) -> Option<&DiscoveredDevice<T>> {
        let selector = selector.trim();
        if let Ok(index) = selector.parse::<usize>() {
            return self.get_index(index);
        }
        self.get(selector).or_else(|| {
            self.devices
                .values()
                .find(|d| d.address.eq_ignore_ascii_case(selector))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredDevice<T>> {
        self.order.iter().filter_map(|a| self.devices.get(a))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
