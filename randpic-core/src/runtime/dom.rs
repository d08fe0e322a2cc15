use std::collections::{BTreeMap, BTreeSet};

/// Handle to an element inside a [`Document`].
pub type ElementId = usize;

/// Where a background image ends up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BackgroundTarget {
    Body,
    Element(ElementId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageTag {
    pub id: ElementId,
    pub alt: Option<String>,
    pub src: Option<String>,
}

/// The slice of the page the runtime reads and writes.
pub trait Document {
    fn element_by_id(&self, dom_id: &str) -> Option<ElementId>;
    fn body_has_class(&self, class: &str) -> bool;
    /// Elements carrying `attribute`, with its value, in document order.
    fn elements_with_attribute(&self, attribute: &str) -> Vec<(ElementId, String)>;
    fn images(&self) -> Vec<ImageTag>;

    fn set_image_src(&mut self, image: ElementId, src: &str);
    fn set_style(&mut self, target: BackgroundTarget, property: &str, value: &str);
    fn add_class(&mut self, target: BackgroundTarget, class: &str);
    fn remove_class(&mut self, target: BackgroundTarget, class: &str);
    fn set_root_property(&mut self, name: &str, value: &str);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub classes: BTreeSet<String>,
    pub style: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

/// In-memory page used for previews and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticDocument {
    body: Element,
    elements: Vec<Element>,
    root_properties: BTreeMap<String, String>,
}

impl StaticDocument {
    pub fn new() -> Self {
        Self {
            body: Element::new("body"),
            ..Self::default()
        }
    }

    pub fn with_body_class(mut self, class: &str) -> Self {
        self.body.classes.insert(class.to_string());
        self
    }

    pub fn push(&mut self, element: Element) -> ElementId {
        self.elements.push(element);
        self.elements.len() - 1
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    pub fn target(&self, target: BackgroundTarget) -> Option<&Element> {
        match target {
            BackgroundTarget::Body => Some(&self.body),
            BackgroundTarget::Element(id) => self.elements.get(id),
        }
    }

    pub fn root_property(&self, name: &str) -> Option<&str> {
        self.root_properties.get(name).map(String::as_str)
    }

    fn target_mut(&mut self, target: BackgroundTarget) -> Option<&mut Element> {
        match target {
            BackgroundTarget::Body => Some(&mut self.body),
            BackgroundTarget::Element(id) => self.elements.get_mut(id),
        }
    }
}

impl Document for StaticDocument {
    fn element_by_id(&self, dom_id: &str) -> Option<ElementId> {
        self.elements.iter().position(|e| e.attr("id") == Some(dom_id))
    }

    fn body_has_class(&self, class: &str) -> bool {
        self.body.has_class(class)
    }

    fn elements_with_attribute(&self, attribute: &str) -> Vec<(ElementId, String)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(id, e)| e.attr(attribute).map(|v| (id, v.to_string())))
            .collect()
    }

    fn images(&self) -> Vec<ImageTag> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.tag.eq_ignore_ascii_case("img"))
            .map(|(id, e)| ImageTag {
                id,
                alt: e.attr("alt").map(str::to_string),
                src: e.attr("src").map(str::to_string),
            })
            .collect()
    }

    fn set_image_src(&mut self, image: ElementId, src: &str) {
        if let Some(e) = self.elements.get_mut(image) {
            e.attributes.insert("src".to_string(), src.to_string());
        }
    }

    fn set_style(&mut self, target: BackgroundTarget, property: &str, value: &str) {
        if let Some(e) = self.target_mut(target) {
            e.style.insert(property.to_string(), value.to_string());
        }
    }

    fn add_class(&mut self, target: BackgroundTarget, class: &str) {
        if let Some(e) = self.target_mut(target) {
            e.classes.insert(class.to_string());
        }
    }

    fn remove_class(&mut self, target: BackgroundTarget, class: &str) {
        if let Some(e) = self.target_mut(target) {
            e.classes.remove(class);
        }
    }

    fn set_root_property(&mut self, name: &str, value: &str) {
        self.root_properties.insert(name.to_string(), value.to_string());
    }
}
