// Sectioned key/value configuration file
//
// A small reader/writer for `[Section]` / `Key = value` files built on the
// toml crate. Keys are addressed as `Section::Key`. Reading is lenient: typed
// getters accept values written in a neighbouring type (numbers as strings,
// booleans as 0/1), and a document that is not valid as a whole is recovered
// line by line, with unquoted values kept as raw strings. Writing keeps
// insertion order, aligns values within a section, and can attach a comment
// to each entry.

use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::Path;
use toml::Value;

/// One `Key = value` entry
#[derive(Debug, Clone, PartialEq)]
struct Entry {
    key: String,
    value: Value,
    comment: Option<String>,
}

/// One `[Section]` and its entries, in insertion order
#[derive(Debug, Clone, PartialEq)]
struct Section {
    name: String,
    entries: Vec<Entry>,
}

/// Sectioned key/value document
#[derive(Debug, Clone, PartialEq)]
pub struct ConfFile {
    sections: Vec<Section>,
    show_comments: bool,
    nice_alignment: bool,
}

impl Default for ConfFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `Section::Key`; keys without a section live in the unnamed root
fn split_key(key: &str) -> (&str, &str) {
    key.split_once("::").unwrap_or(("", key))
}

/// Render a key or section name, quoting it when it is not a bare TOML key
fn format_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        Value::String(key.to_string()).to_string()
    }
}

/// Split a line that is not valid TOML into its key and raw value
fn raw_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim().trim_matches('"');
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Some((key, value))
}

impl ConfFile {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            show_comments: false,
            nice_alignment: false,
        }
    }

    /// Read and parse a file
    ///
    /// Only I/O failures are errors; malformed content is skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Parse document text
    pub fn parse(text: &str) -> Self {
        match text.parse::<toml::Table>() {
            Ok(table) => Self::from_table(table),
            Err(e) => {
                log::warn!("Config file is not well-formed, recovering line by line: {}", e);
                Self::recover(text)
            }
        }
    }

    fn from_table(table: toml::Table) -> Self {
        let mut conf = Self::new();
        for (name, value) in table {
            match value {
                Value::Table(section) => {
                    for (key, value) in section {
                        conf.insert(&name, &key, value, None);
                    }
                }
                value => conf.insert("", &name, value, None),
            }
        }
        conf
    }

    /// Parse each line on its own, keeping whatever is valid
    fn recover(text: &str) -> Self {
        let mut conf = Self::new();
        let mut current = String::new();

        for (number, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let parsed = trimmed.parse::<toml::Table>();
            if trimmed.starts_with('[') {
                match parsed.ok().and_then(|t| t.into_iter().next()) {
                    Some((name, _)) => current = name,
                    None => {
                        log::debug!("Skipping malformed section header on line {}", number + 1);
                        // Keep later keys out of the previous section
                        current = trimmed.trim_matches(|c| c == '[' || c == ']').to_string();
                    }
                }
                continue;
            }

            match parsed {
                Ok(table) => {
                    for (key, value) in table {
                        conf.insert(&current, &key, value, None);
                    }
                }
                // Unquoted values are kept verbatim as strings
                Err(_) => match raw_entry(trimmed) {
                    Some((key, value)) => {
                        conf.insert(&current, key, Value::String(value.to_string()), None)
                    }
                    None => log::debug!("Skipping malformed config line {}", number + 1),
                },
            }
        }
        conf
    }

    fn insert(&mut self, section: &str, key: &str, value: Value, comment: Option<String>) {
        let index = match self.sections.iter().position(|s| s.name == section) {
            Some(index) => index,
            None => {
                self.sections.push(Section {
                    name: section.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };

        let entries = &mut self.sections[index].entries;
        match entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.value = value;
                entry.comment = comment;
            }
            None => entries.push(Entry {
                key: key.to_string(),
                value,
                comment,
            }),
        }
    }

    /// Raw value stored under `Section::Key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        let (section, key) = split_key(key);
        self.sections
            .iter()
            .find(|s| s.name == section)?
            .entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Boolean(b) => Some(*b),
            Value::Integer(i) => Some(*i != 0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Value::Boolean(b) => Some(i64::from(*b)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
            }
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Datetime(d) => Some(d.to_string()),
            Value::Array(_) | Value::Table(_) => None,
        }
    }

    /// Deserialize a value into any type with a serde string or scalar form
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?.clone();
        match value.try_into() {
            Ok(v) => Some(v),
            Err(e) => {
                log::debug!("Ignoring invalid value for {}: {}", key, e);
                None
            }
        }
    }

    /// Store a value under `Section::Key`, replacing any previous entry
    pub fn set<V: Into<Value>>(&mut self, key: &str, value: V, comment: &str) {
        let (section, key) = split_key(key);
        let comment = (!comment.is_empty()).then(|| comment.to_string());
        self.insert(section, key, value.into(), comment);
    }

    pub fn set_bool(&mut self, key: &str, value: bool, comment: &str) {
        self.set(key, value, comment);
    }

    pub fn set_int(&mut self, key: &str, value: i64, comment: &str) {
        self.set(key, value, comment);
    }

    pub fn set_float(&mut self, key: &str, value: f64, comment: &str) {
        self.set(key, value, comment);
    }

    pub fn set_string(&mut self, key: &str, value: &str, comment: &str) {
        self.set(key, value, comment);
    }

    /// Write entry comments when rendering
    pub fn set_show_comments(&mut self, show: bool) {
        self.show_comments = show;
    }

    /// Align values within each section when rendering
    pub fn set_nice_alignment(&mut self, align: bool) {
        self.nice_alignment = align;
    }

    /// Render the document
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        // Root entries must come before any table header
        let mut sections: Vec<&Section> = self.sections.iter().collect();
        sections.sort_by_key(|s| !s.name.is_empty());

        for section in sections {
            if section.entries.is_empty() {
                continue;
            }
            if !section.name.is_empty() {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&format!("[{}]\n", format_key(&section.name)));
            }

            let keys: Vec<String> = section.entries.iter().map(|e| format_key(&e.key)).collect();
            let key_width = if self.nice_alignment {
                keys.iter().map(|k| k.len()).max().unwrap_or(0)
            } else {
                0
            };
            let values: Vec<String> = section.entries.iter().map(|e| e.value.to_string()).collect();
            let value_width = if self.nice_alignment {
                values.iter().map(|v| v.len()).max().unwrap_or(0)
            } else {
                0
            };

            for ((entry, key), value) in section.entries.iter().zip(&keys).zip(&values) {
                let comment = entry.comment.as_deref().filter(|_| self.show_comments);
                match comment {
                    Some(comment) => out.push_str(&format!(
                        "{:kw$} = {:vw$}  # {}\n",
                        key,
                        value,
                        comment,
                        kw = key_width,
                        vw = value_width
                    )),
                    None => out.push_str(&format!("{:kw$} = {}\n", key, value, kw = key_width)),
                }
            }
        }
        out
    }

    /// Write the document to `path`, replacing any existing file
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let conf = ConfFile::parse(
            r#"
            [Display]
            ScaleToFit = true
            AspectRatio = 3

            ["Window State"]
            MainWidth = -1
            "#,
        );
        assert_eq!(conf.get_bool("Display::ScaleToFit"), Some(true));
        assert_eq!(conf.get_int("Display::AspectRatio"), Some(3));
        assert_eq!(conf.get_int("Window State::MainWidth"), Some(-1));
        assert!(!conf.exists("Display::Missing"));
    }

    #[test]
    fn test_lenient_getters() {
        let conf = ConfFile::parse(
            r#"
            [S]
            a = "42"
            b = "yes"
            c = 1
            d = "0.25"
            e = 3
            f = 7.9
            "#,
        );
        assert_eq!(conf.get_int("S::a"), Some(42));
        assert_eq!(conf.get_bool("S::b"), Some(true));
        assert_eq!(conf.get_bool("S::c"), Some(true));
        assert_eq!(conf.get_float("S::d"), Some(0.25));
        assert_eq!(conf.get_float("S::e"), Some(3.0));
        assert_eq!(conf.get_int("S::f"), Some(7));
        assert_eq!(conf.get_string("S::e"), Some("3".to_string()));
        assert_eq!(conf.get_bool("S::d"), None);
    }

    #[test]
    fn test_recovers_from_malformed_lines() {
        let conf = ConfFile::parse(
            "[Sound]\nMuteSound = true\nBufferSize = = 12\nInputRate = 32000\n[Files\nLastDirectory = \"/tmp\"\n",
        );
        assert_eq!(conf.get_bool("Sound::MuteSound"), Some(true));
        assert_eq!(conf.get_int("Sound::InputRate"), Some(32000));
        assert_eq!(conf.get_int("Sound::BufferSize"), None);
        assert!(!conf.exists("Sound::LastDirectory"));
        assert_eq!(
            conf.get_string("Files::LastDirectory"),
            Some("/tmp".to_string())
        );
    }

    #[test]
    fn test_unquoted_values_are_read_as_strings() {
        let conf = ConfFile::parse(
            "[Files]\nLastDirectory = /home/x\n\n[Joypad 0]\nTurbo A = Keyboard KeyX\nUp =\n[Sound]\nBufferSize = 48\n",
        );
        assert_eq!(
            conf.get_string("Files::LastDirectory"),
            Some("/home/x".to_string())
        );
        assert_eq!(
            conf.get_string("Joypad 0::Turbo A"),
            Some("Keyboard KeyX".to_string())
        );
        assert_eq!(conf.get_string("Joypad 0::Up"), Some(String::new()));
        assert_eq!(conf.get_int("Sound::BufferSize"), Some(48));
    }

    #[test]
    fn test_render_quotes_names_and_aligns() {
        let mut conf = ConfFile::new();
        conf.set_bool("Window State::UIVisible", true, "");
        conf.set_int("Window State::MainWidth", 640, "Pixels");
        conf.set_string("Joypad 0::Turbo A", "Keyboard KeyX", "");
        conf.set_show_comments(true);
        conf.set_nice_alignment(true);

        let text = conf.to_text();
        assert!(text.contains("[\"Window State\"]\n"));
        assert!(text.contains("UIVisible = true\n"));
        assert!(text.contains("MainWidth = 640   # Pixels\n"));
        assert!(text.contains("\"Turbo A\" = \"Keyboard KeyX\"\n"));

        let reparsed = ConfFile::parse(&text);
        assert_eq!(reparsed.get_int("Window State::MainWidth"), Some(640));
        assert_eq!(
            reparsed.get_string("Joypad 0::Turbo A"),
            Some("Keyboard KeyX".to_string())
        );
    }

    #[test]
    fn test_set_replaces_existing_entry() {
        let mut conf = ConfFile::new();
        conf.set_int("A::x", 1, "");
        conf.set_int("A::x", 2, "");
        assert_eq!(conf.get_int("A::x"), Some(2));
        assert_eq!(conf.to_text().matches("x = ").count(), 1);
    }

    #[test]
    fn test_comments_hidden_by_default() {
        let mut conf = ConfFile::new();
        conf.set_bool("A::flag", false, "A comment");
        assert!(!conf.to_text().contains('#'));
    }
}
