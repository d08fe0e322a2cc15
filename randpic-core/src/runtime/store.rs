use std::collections::HashMap;

/// Key of the persisted "background disabled" preference.
pub const DISABLED_KEY: &str = "theme-bg-disabled";

/// String key/value storage that outlives a session (`localStorage` in the
/// browser).
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

pub fn read_disabled<S: PreferenceStore + ?Sized>(store: &S) -> bool {
    store.get(DISABLED_KEY).as_deref() == Some("true")
}

pub fn write_disabled<S: PreferenceStore + ?Sized>(store: &mut S, disabled: bool) {
    store.set(DISABLED_KEY, if disabled { "true" } else { "false" });
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value)
    }
}
