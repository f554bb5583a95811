use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogEntry {
    /// Position among accepted records, starting at 0.
    pub ordinal: usize,
    /// First field of the listing record.
    pub label: String,
    pub identifier: String,
    pub found: bool,
}

/// The pokedex: every known identifier and whether it has been unlocked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
}

impl CatalogIndex {
    /// Parses a `label:identifier` listing, one record per line.
    ///
    /// Records without a colon or with an empty identifier are skipped, as are
    /// repeats of an identifier already seen.
    pub fn parse<S: AsRef<str>>(raw: &str, starters: &[S]) -> Self {
        let mut entries: Vec<CatalogEntry> = Vec::new();
        for line in raw.lines() {
            let Some((label, identifier)) = parse_record(line) else {
                continue;
            };
            if entries.iter().any(|entry| entry.identifier == identifier) {
                continue;
            }
            let found = starters.iter().any(|s| s.as_ref() == identifier);
            entries.push(CatalogEntry {
                ordinal: entries.len(),
                label: label.to_string(),
                identifier: identifier.to_string(),
                found,
            });
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.identifier == identifier)
    }

    pub fn is_found(&self, identifier: &str) -> bool {
        self.get(identifier).map(|entry| entry.found).unwrap_or(false)
    }

    /// Returns true only when the entry flipped from unfound to found.
    pub fn mark_found(&mut self, identifier: &str) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.identifier == identifier)
        {
            Some(entry) if !entry.found => {
                entry.found = true;
                true
            }
            _ => false,
        }
    }

    pub fn found_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.found).count()
    }
}

fn parse_record(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let mut fields = line.split(':');
    let label = fields.next()?.trim();
    let identifier = fields.next()?.trim();
    if identifier.is_empty() {
        return None;
    }
    Some((label, identifier))
}
