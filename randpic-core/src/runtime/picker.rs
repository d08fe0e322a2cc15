use rand::Rng;
use std::collections::BTreeMap;

use super::device::DeviceClass;
use crate::category::Category;
use crate::manifest::RuntimeConfig;

/// Draws a random URL per category and keeps it for the rest of the session,
/// so every consumer on one page sees the same picture.
///
/// A category is either empty (no entry) or cached. Drawing fills it,
/// reading leaves it alone, [`clear`](Picker::clear) empties all of them.
#[derive(Debug)]
pub struct Picker<R> {
    config: RuntimeConfig,
    rng: R,
    session: BTreeMap<Category, String>,
}

impl<R: Rng> Picker<R> {
    pub fn new(config: RuntimeConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            session: BTreeMap::new(),
        }
    }

    /// Session-stable URL for `category`, or an empty string when the
    /// category has no images.
    pub fn pick(&mut self, category: Category) -> String {
        let count = self.config.count(category);
        if count == 0 {
            return String::new();
        }

        if let Some(url) = self.session.get(&category) {
            return url.clone();
        }

        let n = self.rng.gen_range(1..=count);
        let url = self.config.url_for(category, n);
        self.session.insert(category, url.clone());
        url
    }

    /// Same as [`pick`](Self::pick) for a raw tag. Unknown tags yield an
    /// empty string.
    pub fn pick_tag(&mut self, tag: &str) -> String {
        match Category::from_tag(tag) {
            Some(category) => self.pick(category),
            None => String::new(),
        }
    }

    pub fn pick_by_device(&mut self, user_agent: &str) -> String {
        let category = DeviceClass::classify(user_agent).category();
        self.pick(category)
    }

    pub fn cached(&self, category: Category) -> Option<&str> {
        self.session.get(&category).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}
