//! `BEGIN`/`END` blocks.

use super::Property;
use super::property::names;

/// One `BEGIN:<name>` ... `END:<name>` block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    name: String,
    properties: Vec<Property>,
    children: Vec<Component>,
}

impl Component {
    /// Creates an empty block. The name is stored uppercase.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    pub fn push_child(&mut self, child: Component) {
        self.children.push(child);
    }

    /// Returns the first property called `name`.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties_named(name).next()
    }

    /// Returns every property called `name`, in feed order.
    pub fn properties_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Property> {
        self.properties
            .iter()
            .filter(move |property| property.name.eq_ignore_ascii_case(name))
    }

    /// Returns the unescaped text of the first property called `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.property(name)?.value.as_text()
    }

    /// Returns the blocks nested directly inside this one with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Component> {
        self.children
            .iter()
            .filter(move |child| child.name.eq_ignore_ascii_case(name))
    }
}

/// A parsed feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Calendar {
    root: Component,
}

impl Calendar {
    pub(crate) fn new(root: Component) -> Self {
        Self { root }
    }

    /// Returns the VEVENT blocks of the calendar in feed order.
    ///
    /// Blocks nested deeper (alarms, timezone rules) are not included.
    pub fn events(&self) -> impl Iterator<Item = &Component> {
        self.root.children_named(names::VEVENT)
    }
}
