use std::collections::HashMap;
use std::fs;

// Flat contact file, one "name=email" per line. Loaded once at startup
// and read-only afterwards. Lookups are case-insensitive on the name.
#[derive(Debug, Default, Clone)]
pub struct ContactDirectory {
    entries: HashMap<String, String>,
}

impl ContactDirectory {
    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Unable to read contact file {}: {}", path, e))?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((name, email)) = trimmed.split_once('=') else {
                continue;
            };
            let email = email.trim();
            if email.is_empty() {
                continue;
            }
            entries.insert(name.trim().to_lowercase(), email.to_string());
        }
        Self { entries }
    }

    // Resolves a single attendee identifier: raw addresses pass through,
    // names go through the directory.
    pub fn resolve(&self, identifier: &str) -> Option<String> {
        let trimmed = identifier.trim();
        if trimmed.contains('@') {
            return Some(trimmed.to_string());
        }
        self.entries.get(&trimmed.to_lowercase()).cloned()
    }

    pub fn known_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
