//! Clipboard conversion between element lists and HTML.
//!
//! Both directions go through [`MarkupNode`] trees; nothing here touches a
//! system clipboard.
//!
//! # Example
//!
//! ```
//! use canvasdoc::clipboard::{read_element_list, write_element_list};
//! use canvasdoc::model::Element;
//! use canvasdoc::EditorOptions;
//!
//! let options = EditorOptions::default();
//! let payload = write_element_list(&[Element::text("hello")], &options).unwrap();
//! let pasted = read_element_list(&payload.html, &options).unwrap();
//! assert_eq!(pasted[0].plain_text(), "hello");
//! ```

mod markup;
mod read;
mod write;

pub use markup::{
    parse_markup, parse_px, style_property, text_content, to_html, MarkupElement, MarkupNode,
};
pub use read::read_element_list;
pub use write::{element_list_to_markup, write_element_list, zip_text, ClipboardPayload};
