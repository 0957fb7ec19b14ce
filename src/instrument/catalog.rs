//! Operation descriptor tables
//!
//! Which operations of which target kind are reported, under which category,
//! and how their titles read.

use super::title::{Arg, Receiver, TitleRule};
use crate::event::Category;
use crate::surface::TargetKind;

use Arg::{Default as Or, Elided, Plain, Quoted};
use Category::{Action, Assertion, Navigation, Wait};

/// Static reporting metadata for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub category: Category,
    pub title: TitleRule,
}

const fn page(
    name: &'static str,
    category: Category,
    args: &'static [Arg],
) -> OperationDescriptor {
    OperationDescriptor {
        name,
        category,
        title: TitleRule::new(Receiver::Page, name, args),
    }
}

const fn locator(
    name: &'static str,
    category: Category,
    args: &'static [Arg],
) -> OperationDescriptor {
    OperationDescriptor {
        name,
        category,
        title: TitleRule::new(Receiver::Locator, name, args),
    }
}

const fn expect(name: &'static str, args: &'static [Arg]) -> OperationDescriptor {
    OperationDescriptor {
        name,
        category: Assertion,
        title: TitleRule::new(Receiver::Expect, name, args),
    }
}

pub const PAGE_OPERATIONS: &[OperationDescriptor] = &[
    // navigation
    page("goto", Navigation, &[Plain("url")]),
    page("reload", Navigation, &[]),
    page("go_back", Navigation, &[]),
    page("go_forward", Navigation, &[]),
    // action
    page("click", Action, &[Plain("selector")]),
    page("dblclick", Action, &[Plain("selector")]),
    page("fill", Action, &[Plain("selector"), Quoted("value")]),
    page("type", Action, &[Plain("selector"), Quoted("text")]),
    page("press", Action, &[Plain("selector"), Plain("key")]),
    page("check", Action, &[Plain("selector")]),
    page("uncheck", Action, &[Plain("selector")]),
    page("select_option", Action, &[Plain("selector")]),
    page("hover", Action, &[Plain("selector")]),
    page("focus", Action, &[Plain("selector")]),
    page("drag_and_drop", Action, &[Plain("source"), Plain("target")]),
    page("screenshot", Action, &[]),
    page("pdf", Action, &[]),
    page("set_input_files", Action, &[Plain("selector"), Elided("files")]),
    // wait
    page("wait_for_selector", Wait, &[Plain("selector")]),
    page("wait_for_load_state", Wait, &[Or("state", "load")]),
    page("wait_for_url", Wait, &[Plain("url")]),
    page("wait_for_timeout", Wait, &[Plain("timeout")]),
    page("wait_for_function", Wait, &[Elided("expression")]),
];

pub const LOCATOR_OPERATIONS: &[OperationDescriptor] = &[
    // action
    locator("click", Action, &[]),
    locator("dblclick", Action, &[]),
    locator("fill", Action, &[Quoted("value")]),
    locator("type", Action, &[Quoted("text")]),
    locator("press", Action, &[Plain("key")]),
    locator("check", Action, &[]),
    locator("uncheck", Action, &[]),
    locator("select_option", Action, &[]),
    locator("hover", Action, &[]),
    locator("focus", Action, &[]),
    locator("scroll_into_view_if_needed", Action, &[]),
    locator("screenshot", Action, &[]),
    locator("set_input_files", Action, &[Elided("files")]),
    locator("select_text", Action, &[]),
    locator("clear", Action, &[]),
    // wait
    locator("wait_for", Wait, &[]),
];

pub const ASSERTION_OPERATIONS: &[OperationDescriptor] = &[
    expect("to_be_visible", &[]),
    expect("to_be_hidden", &[]),
    expect("to_be_enabled", &[]),
    expect("to_be_disabled", &[]),
    expect("to_be_checked", &[]),
    expect("to_be_focused", &[]),
    expect("to_be_editable", &[]),
    expect("to_be_empty", &[]),
    expect("to_be_attached", &[]),
    expect("to_be_in_viewport", &[]),
    expect("to_have_text", &[Quoted("expected")]),
    expect("to_contain_text", &[Quoted("expected")]),
    expect("to_have_value", &[Quoted("value")]),
    expect("to_have_values", &[Elided("values")]),
    expect("to_have_attribute", &[Quoted("name"), Quoted("value")]),
    expect("to_have_class", &[Quoted("expected")]),
    expect("to_have_count", &[Plain("count")]),
    expect("to_have_css", &[Quoted("name"), Quoted("value")]),
    expect("to_have_id", &[Quoted("id")]),
    expect("to_have_js_property", &[Quoted("name"), Elided("value")]),
    expect("to_have_role", &[Quoted("role")]),
    expect("to_have_accessible_name", &[Quoted("name")]),
    expect("to_have_accessible_description", &[Quoted("description")]),
];

/// Descriptor table for a target kind
pub fn operations_for(kind: TargetKind) -> &'static [OperationDescriptor] {
    match kind {
        TargetKind::Page => PAGE_OPERATIONS,
        TargetKind::Locator => LOCATOR_OPERATIONS,
        TargetKind::Assertions => ASSERTION_OPERATIONS,
    }
}

/// Look up the descriptor of one operation
pub fn descriptor(kind: TargetKind, name: &str) -> Option<&'static OperationDescriptor> {
    operations_for(kind).iter().find(|d| d.name == name)
}
