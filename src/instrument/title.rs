//! Step titles derived from call arguments
//!
//! A [`TitleRule`] is a declarative, call-like template:
//! `page.fill(#name, "Ada")`, `locator(#submit).click()`,
//! `expect(h1).to_have_text("Welcome")`. Rendering never fails; an argument
//! that is missing renders as [`MISSING`].

use serde_json::Value;

use crate::surface::Call;

/// Placeholder for an argument the call did not supply
pub const MISSING: &str = "<?>";

/// Receiver description used when the receiver cannot describe itself
pub const UNDESCRIBED: &str = "locator";

/// How the receiver is shown at the start of a title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// `page`
    Page,
    /// `locator(<description>)`
    Locator,
    /// `expect(<description>)`
    Expect,
}

/// One argument slot of a title
///
/// Each slot is looked up by keyword name first, then by its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    /// Strings bare, other values as compact JSON
    Plain(&'static str),
    /// Always as JSON (strings quoted)
    Quoted(&'static str),
    /// Shown as `...` whatever was passed
    Elided(&'static str),
    /// Like `Plain`, falling back to a default instead of [`MISSING`]
    Default(&'static str, &'static str),
}

impl Arg {
    fn render(&self, call: &Call, position: usize) -> String {
        match *self {
            Arg::Plain(name) => lookup(call, name, position)
                .map(plain)
                .unwrap_or_else(|| MISSING.to_string()),
            Arg::Quoted(name) => lookup(call, name, position)
                .map(Value::to_string)
                .unwrap_or_else(|| MISSING.to_string()),
            Arg::Elided(_) => "...".to_string(),
            Arg::Default(name, default) => lookup(call, name, position)
                .map(plain)
                .unwrap_or_else(|| default.to_string()),
        }
    }
}

fn lookup<'a>(call: &'a Call, name: &str, position: usize) -> Option<&'a Value> {
    call.keyword(name).or_else(|| call.positional(position))
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Title template of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleRule {
    pub receiver: Receiver,
    pub method: &'static str,
    pub args: &'static [Arg],
}

impl TitleRule {
    pub const fn new(receiver: Receiver, method: &'static str, args: &'static [Arg]) -> Self {
        Self {
            receiver,
            method,
            args,
        }
    }

    /// Render the title for one call (pure, deterministic)
    pub fn render(&self, call: &Call) -> String {
        let head = match self.receiver {
            Receiver::Page => "page".to_string(),
            Receiver::Locator => format!("locator({})", describe(call)),
            Receiver::Expect => format!("expect({})", describe(call)),
        };
        let args: Vec<String> = self
            .args
            .iter()
            .enumerate()
            .map(|(position, arg)| arg.render(call, position))
            .collect();
        format!("{}.{}({})", head, self.method, args.join(", "))
    }
}

fn describe(call: &Call) -> String {
    call.receiver()
        .describe()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| UNDESCRIBED.to_string())
}
