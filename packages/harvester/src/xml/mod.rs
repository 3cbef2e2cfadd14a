//! XML utilities.

mod element;
mod utils;

pub use element::{Attribute, Element, XML_NAMESPACE};
pub use utils::{child_text, find_child, find_children, find_descendant, get_tag_name, get_text};
