//! Function names on the wire and in the graph.
//!
//! The analyzer marks a function it had to recompile with a different
//! signature on one side (most commonly a forced `void` return) by
//! suffixing its name. Inside the graph that convention becomes a
//! discriminated type, so normalization works on checked variants instead
//! of re-parsing strings; the suffix only exists at the wire boundary.

use std::fmt;

/// Suffix the analyzer appends to a variant function's name.
pub const VARIANT_SUFFIX: &str = ".void";

/// A function name, canonical or variant.
///
/// Both forms carry the canonical name; `Variant` additionally records that
/// the comparison was done against a signature-altered stand-in and must be
/// resolved during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolName {
    /// A function under its own name.
    Canonical(String),
    /// A stand-in for the named function, compiled with an altered
    /// signature on at least one side.
    Variant(String),
}

impl SymbolName {
    /// Parse a wire-format name, splitting off the variant suffix.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.strip_suffix(VARIANT_SUFFIX) {
            Some(base) if !base.is_empty() => SymbolName::Variant(base.to_string()),
            _ => SymbolName::Canonical(raw.to_string()),
        }
    }

    /// The canonical function name, without any variant marker.
    #[must_use]
    pub fn canonical(&self) -> &str {
        match self {
            SymbolName::Canonical(name) | SymbolName::Variant(name) => name,
        }
    }

    /// True for variant stand-ins.
    #[must_use]
    pub const fn is_variant(&self) -> bool {
        matches!(self, SymbolName::Variant(_))
    }

    /// This name with the variant marker dropped.
    #[must_use]
    pub fn to_canonical(&self) -> SymbolName {
        SymbolName::Canonical(self.canonical().to_string())
    }
}

impl fmt::Display for SymbolName {
    /// Renders the wire form: the canonical name, suffixed for variants.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolName::Canonical(name) => f.write_str(name),
            SymbolName::Variant(name) => write!(f, "{name}{VARIANT_SUFFIX}"),
        }
    }
}

impl From<&str> for SymbolName {
    fn from(raw: &str) -> Self {
        SymbolName::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        let name = SymbolName::parse("kmalloc");
        assert_eq!(name, SymbolName::Canonical("kmalloc".to_string()));
        assert!(!name.is_variant());
    }

    #[test]
    fn test_parse_variant() {
        let name = SymbolName::parse("down_write.void");
        assert_eq!(name, SymbolName::Variant("down_write".to_string()));
        assert!(name.is_variant());
        assert_eq!(name.canonical(), "down_write");
    }

    #[test]
    fn test_bare_suffix_is_canonical() {
        // A name that is nothing but the marker has no base to stand in for.
        let name = SymbolName::parse(".void");
        assert_eq!(name, SymbolName::Canonical(".void".to_string()));
    }

    #[test]
    fn test_display_round_trips_wire_form() {
        for raw in ["kfree", "do_check.void"] {
            assert_eq!(SymbolName::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_to_canonical_strips_marker() {
        let variant = SymbolName::parse("queue_work.void");
        assert_eq!(
            variant.to_canonical(),
            SymbolName::Canonical("queue_work".to_string())
        );
    }
}
