//! Member paths
//!
//! Paths are built bottom-up while failures bubble out of property and
//! collection adapters: a property prefixes its name (`"Id"` -> `"Sub.Id"`),
//! a collection element prefixes its index (`"Id"` -> `"[1].Id"`).

use crate::foundation::ValidationError;

/// Joins `parent` and a relative `member`.
///
/// Index segments attach without a dot: `compose("Hobbies", "[1]")` is
/// `"Hobbies[1]"`.
pub fn compose(parent: &str, member: &str) -> String {
    match (parent.is_empty(), member.is_empty()) {
        (true, _) => member.to_owned(),
        (_, true) => parent.to_owned(),
        _ if member.starts_with('[') => format!("{parent}{member}"),
        _ => format!("{parent}.{member}"),
    }
}

/// The path of element `index` below `parent`.
pub fn index(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// Whether `member` already lies under `prefix`.
pub fn is_under(member: &str, prefix: &str) -> bool {
    member
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.') || rest.starts_with('['))
}

/// Prefixes every failure with `prefix`; root failures get `[prefix]`.
pub(crate) fn prefix(errors: &mut [ValidationError], prefix: &str) {
    if prefix.is_empty() {
        return;
    }
    for error in errors {
        if error.members.is_empty() {
            error.members.push(prefix.to_owned());
        } else {
            for member in &mut error.members {
                *member = compose(prefix, member);
            }
        }
    }
}

/// Prefixes every failure with an element index.
pub(crate) fn prefix_index(errors: &mut [ValidationError], position: usize) {
    prefix(errors, &index("", position));
}

/// Re-prefixes failures with `prefix`, skipping members already under it.
///
/// Repairing twice with the same prefix changes nothing the second time, and
/// `None` or an empty prefix is a no-op.
pub fn repair(errors: &mut [ValidationError], prefix: Option<&str>) {
    let Some(prefix) = prefix.filter(|p| !p.is_empty()) else {
        return;
    };
    for error in errors {
        if error.members.is_empty() {
            error.members.push(prefix.to_owned());
            continue;
        }
        for member in &mut error.members {
            if !is_under(member, prefix) {
                *member = compose(prefix, member);
            }
        }
    }
}
