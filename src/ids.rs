//! Base-identifier generation.
//!
//! Tab and panel ids are derived from one base token per widget instance.
//! The token comes through the [`IdSource`] seam so tests get reproducible
//! ids while the browser build gets collision-resistant random ones.

/// Produces the base token used to mint `{base}-tab-{i}` / `{base}-panel-{i}`
/// identifier pairs. Called at most once per widget instance - the token is
/// persisted for the instance's life.
pub trait IdSource {
    fn base_token(&mut self) -> String;
}

/// Deterministic source for tests: `tabs-1`, `tabs-2`, ...
#[derive(Default)]
pub struct SequentialIds {
    next: usize,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn base_token(&mut self) -> String {
        self.next += 1;
        format!("tabs-{}", self.next)
    }
}

/// Browser source: short base36 token from `Math.random`.
///
/// js-sys is already in the stack and `Math.random` is plenty for DOM id
/// uniqueness within one page - this is not security material.
pub struct EntropyIds;

impl IdSource for EntropyIds {
    fn base_token(&mut self) -> String {
        let raw = (js_sys::Math::random() * (36f64.powi(8))) as u64;
        format!("tabs-{}", to_base36(raw))
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_stable() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.base_token(), "tabs-1");
        assert_eq!(ids.base_token(), "tabs-2");
    }

    #[test]
    fn base36_digit_mapping() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
