//! Script bodies used to emulate commands some remote ends lack.
//!
//! Each atom is a JavaScript function expression. A rewritten command runs it
//! as `return (<atom>).apply(null, arguments)` with the forwarded parameters
//! as arguments.

/// `function(element, name)`: attribute value with property fallback, as a string or null.
pub const GET_ATTRIBUTE: &str = include_str!("atoms/get-attribute.js");

/// `function(element)`: whether the element is visible to a user.
pub const IS_DISPLAYED: &str = include_str!("atoms/is-displayed.js");

/// `function({relative: {root, filters}})`: elements matching a relative locator.
pub const FIND_ELEMENTS: &str = include_str!("atoms/find-elements.js");

/// Wraps an atom so it can be sent as an execute-script body.
pub fn script_for(atom: &str) -> String {
	format!("return ({}).apply(null, arguments)", atom.trim_end())
}
