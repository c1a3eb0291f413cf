//! Logical units: the shared offset scheme of layout and search.
//!
//! Every element list flattens into a sequence of units. Text-like elements
//! contribute one unit per character, containers contribute their children's
//! units, and everything else (widgets, images, tables, the checkbox part of a
//! control) contributes a single placeholder unit. Position records and search
//! offsets both index into this sequence.

use super::{Element, ElementKind};

/// Text used for a placeholder unit in a text space.
pub const ZERO: char = '\u{200B}';

/// One rendered unit of an element list.
#[derive(Debug, Clone, Copy)]
pub enum Unit<'a> {
    /// A character of a text-like element
    Char {
        /// The character
        ch: char,
        /// Element the character belongs to
        element: &'a Element,
    },
    /// An atomic element occupying one slot
    Placeholder {
        /// The atomic element
        element: &'a Element,
    },
}

impl<'a> Unit<'a> {
    /// Character of this unit in the searchable text space.
    pub fn as_char(&self) -> char {
        match self {
            Unit::Char { ch, .. } => *ch,
            Unit::Placeholder { .. } => ZERO,
        }
    }

    /// Element the unit belongs to.
    pub fn element(&self) -> &'a Element {
        match self {
            Unit::Char { element, .. } | Unit::Placeholder { element } => element,
        }
    }

    /// Check if this unit ends a line.
    pub fn is_line_break(&self) -> bool {
        matches!(self, Unit::Char { ch: '\n' | ZERO, .. })
    }
}

impl Element {
    /// Visit this element's units in order.
    pub fn for_each_unit<'a>(&'a self, f: &mut impl FnMut(Unit<'a>)) {
        if let Some(value) = self.text_value() {
            for ch in value.chars() {
                f(Unit::Char { ch, element: self });
            }
            return;
        }
        match &self.kind {
            ElementKind::Title { children, .. }
            | ElementKind::List { children, .. }
            | ElementKind::Hyperlink { children, .. }
            | ElementKind::Area { children, .. } => {
                for child in children {
                    child.for_each_unit(f);
                }
            }
            _ => f(Unit::Placeholder { element: self }),
        }
    }

    /// Number of units this element contributes.
    pub fn unit_len(&self) -> usize {
        let mut count = 0;
        self.for_each_unit(&mut |_| count += 1);
        count
    }
}

/// Flatten an element list into its units.
pub fn units(elements: &[Element]) -> Vec<Unit<'_>> {
    let mut out = Vec::new();
    for element in elements {
        element.for_each_unit(&mut |unit| out.push(unit));
    }
    out
}

/// Build the searchable text space of an element list.
pub fn text_space(elements: &[Element]) -> Vec<char> {
    let mut out = Vec::new();
    for element in elements {
        element.for_each_unit(&mut |unit| out.push(unit.as_char()));
    }
    out
}
