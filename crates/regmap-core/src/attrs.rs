//! Attribute extraction for register and field elements.

use std::fmt;

use ipxact_xml::Element;
use tracing::debug;

use crate::mask::{field_mask, format_mask};
use crate::RegMapError;

/// Output key holding the upper-cased element name.
pub const KEY_ID: &str = "id";
/// Output key holding the verbatim `addressOffset` text.
pub const KEY_ADDRESS: &str = "address";
/// Output key holding the formatted field mask.
pub const KEY_MASK: &str = "mask";
/// Output key holding the short access permission.
pub const KEY_PERMISSION: &str = "permission";
/// Output key holding the single-line description.
pub const KEY_DESCRIPTION: &str = "description";

/// Ordered string mapping used as the attribute set of one output node.
///
/// Keys keep their first insertion position; inserting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMapping {
    entries: Vec<(String, String)>,
}

impl AttributeMapping {
    pub fn new() -> Self {
        AttributeMapping::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = AttributeMapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl fmt::Display for AttributeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value:?}")?;
            first = false;
        }
        Ok(())
    }
}

/// Access permission derived from an IP-XACT `access` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// `read-only`
    ReadOnly,
    /// `read-write`
    ReadWrite,
}

impl Permission {
    /// Map the text of an `access` element.
    pub fn from_access(access: &str) -> Result<Self, RegMapError> {
        match access {
            "read-only" => Ok(Permission::ReadOnly),
            "read-write" => Ok(Permission::ReadWrite),
            other => Err(RegMapError::UnrecognizedAccessKind(other.to_string())),
        }
    }

    /// Short form written to the `permission` attribute.
    pub const fn as_str(self) -> &'static str {
        match self {
            Permission::ReadOnly => "r",
            Permission::ReadWrite => "rw",
        }
    }
}

/// Derives output attributes from register and field elements bound to one
/// namespace.
#[derive(Debug, Clone, Copy)]
pub struct AttributeExtractor<'ns> {
    namespace: &'ns str,
}

impl<'ns> AttributeExtractor<'ns> {
    pub fn new(namespace: &'ns str) -> Self {
        AttributeExtractor { namespace }
    }

    pub fn namespace(&self) -> &'ns str {
        self.namespace
    }

    /// Text of the direct child `local`, `Some("")` for an empty child and
    /// `None` when the child is absent.
    fn child_text<'e>(&self, element: &'e Element, local: &str) -> Option<&'e str> {
        element
            .find(self.namespace, local)
            .map(|child| child.text().unwrap_or(""))
    }

    /// Extract the attributes of `element`, starting from a copy of `seed`.
    ///
    /// Only the five output keys are ever written. Keys whose source child is
    /// absent keep the seeded value.
    pub fn extract(
        &self,
        element: &Element,
        seed: Option<&AttributeMapping>,
    ) -> Result<AttributeMapping, RegMapError> {
        let mut attrs = seed.cloned().unwrap_or_default();

        if let Some(name) = self.child_text(element, "name") {
            attrs.insert(KEY_ID, name.to_uppercase());
        }
        if let Some(address) = self.child_text(element, "addressOffset") {
            attrs.insert(KEY_ADDRESS, address);
        }

        let bit_width = self
            .child_text(element, "bitWidth")
            .map(|text| parse_bits("bitWidth", text))
            .transpose()?;
        let bit_offset = self
            .child_text(element, "bitOffset")
            .map(|text| parse_bits("bitOffset", text))
            .transpose()?;
        if let (Some(width), Some(offset)) = (bit_width, bit_offset) {
            attrs.insert(KEY_MASK, format_mask(field_mask(width, offset)));
        }

        if let Some(access) = self.child_text(element, "access") {
            attrs.insert(KEY_PERMISSION, Permission::from_access(access)?.as_str());
        }
        if let Some(description) = self.child_text(element, "description") {
            let single_line: String = description
                .chars()
                .filter(|c| *c != '\r' && *c != '\n')
                .collect();
            attrs.insert(KEY_DESCRIPTION, single_line);
        }

        debug!(
            tag = element.name(),
            seeded = seed.is_some(),
            attrs = %attrs,
            "extract attributes"
        );
        Ok(attrs)
    }
}

fn parse_bits(element: &'static str, text: &str) -> Result<u32, RegMapError> {
    let trimmed = text.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|_| RegMapError::InvalidInteger {
        element,
        value: text.to_string(),
    })
}
