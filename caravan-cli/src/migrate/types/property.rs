//! Property references: the `@` sigil syntax for row lookups

use serde_json::Value;

use super::row::Row;

/// Which record on the row a reference reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTarget {
    Source,
    Destination,
}

/// A configuration value naming a row property.
///
/// A leading run of `@` characters selects the record: an odd count reads
/// the destination record, an even count (including zero) reads the source
/// record. Sigils beyond the selecting one collapse pairwise into literal
/// `@` characters of the property name:
///
/// - `"foo"` reads source property `foo`
/// - `"@foo"` reads destination property `foo`
/// - `"@@foo"` reads source property `@foo`
/// - `"@@@foo"` reads destination property `@foo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyReference {
    target: ReferenceTarget,
    name: String,
}

impl PropertyReference {
    /// Parse a raw configuration string into a reference.
    ///
    /// Returns None only for the empty string; `"0"` is a valid property
    /// name, not an absent value.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }

        let sigils = raw.chars().take_while(|&c| c == '@').count();
        let rest = &raw[sigils..];

        let (target, literal_sigils) = if sigils % 2 == 1 {
            (ReferenceTarget::Destination, (sigils - 1) / 2)
        } else {
            (ReferenceTarget::Source, sigils / 2)
        };

        Some(PropertyReference {
            target,
            name: format!("{}{}", "@".repeat(literal_sigils), rest),
        })
    }

    pub fn target(&self) -> ReferenceTarget {
        self.target
    }

    /// The property name after sigil collapsing.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve against a row, returning whatever is stored there
    /// (scalar or structured).
    pub fn resolve(&self, row: &Row) -> Option<Value> {
        match self.target {
            ReferenceTarget::Source => row.source_property(&self.name).cloned(),
            ReferenceTarget::Destination => row.destination_property(&self.name).cloned(),
        }
    }

    /// Parse and resolve in one step. Absent raw values and absent row
    /// properties both come back as None.
    pub fn lookup(raw: &str, row: &Row) -> Option<Value> {
        Self::parse(raw)?.resolve(row)
    }
}
