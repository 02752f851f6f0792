use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;

use crate::errors::{MetadateError, Result};

pub const COMMENT_MARKER: char = '#';

/// A blog entry split in its three parts. Every line keeps its own line ending,
/// so joining the parts back gives the exact file content.
///
/// Example of entry
/// This is the title of my entry
/// #published 2009-08-05 22:36:17
///
/// This is the content of my entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    pub title: String,
    pub metadata: Vec<String>,
    pub body: Vec<String>,
}

enum ParseState {
    Title,
    Metadata,
    Body,
}

impl Entry {
    pub fn from_file(file_name: &Path) -> Result<Entry> {
        let content = fs::read_to_string(file_name)
            .map_err(|e| MetadateError::read(file_name, e))?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Entry {
        let mut entry = Entry::default();
        let mut state = ParseState::Title;

        for line in content.split_inclusive('\n') {
            match state {
                ParseState::Title => {
                    entry.title = line.to_string();
                    state = ParseState::Metadata;
                }
                ParseState::Metadata if line.starts_with(COMMENT_MARKER) => {
                    entry.metadata.push(line.to_string());
                }
                // Once the body starts, a line beginning with # is just text
                ParseState::Metadata | ParseState::Body => {
                    entry.body.push(line.to_string());
                    state = ParseState::Body;
                }
            }
        }

        entry
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.metadata.is_empty() && self.body.is_empty()
    }

    /// Copy of this entry with `line` as its first metadata line.
    /// A title without line ending (single line file) gets one, otherwise
    /// the new line would be glued to the title.
    pub fn with_metadata_first(&self, line: &str) -> Entry {
        let mut title = self.title.clone();
        if !title.ends_with('\n') {
            title.push('\n');
        }

        let mut metadata = Vec::with_capacity(self.metadata.len() + 1);
        metadata.push(line.to_string());
        metadata.extend(self.metadata.iter().cloned());

        Entry {
            title,
            metadata,
            body: self.body.clone(),
        }
    }

    pub fn to_content(&self) -> String {
        let mut content = self.title.clone();
        self.metadata.iter().for_each(|line| content.push_str(line));
        self.body.iter().for_each(|line| content.push_str(line));
        content
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "title={}metadata lines={}, body lines={}",
               self.title,
               self.metadata.len(),
               self.body.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::test_data::{ENTRY_DATA, ENTRY_NO_METADATA, ENTRY_NO_TRAILING_NEWLINE};

    use super::*;

    #[test]
    fn test_parse_entry() {
        let entry = Entry::parse(ENTRY_DATA);
        println!("{}", entry);
        assert_eq!(entry.title, "What I learned after 20+ years of software development\n");
        assert_eq!(entry.metadata, [
            "#published 2022-04-02 12:05:00\n",
            "#tags rust career\n",
        ]);
        assert_eq!(entry.body.first().map(String::as_str), Some("\n"));
        assert_eq!(entry.body.last().map(String::as_str), Some("# Not a metadata line\n"));
    }

    #[test]
    fn test_round_trip() {
        for content in [ENTRY_DATA, ENTRY_NO_METADATA, ENTRY_NO_TRAILING_NEWLINE, "", "\n", "#\n#\n", "Only title"] {
            assert_eq!(Entry::parse(content).to_content(), content);
        }
    }

    #[test]
    fn test_empty_content() {
        let entry = Entry::parse("");
        assert!(entry.is_empty());
        assert_eq!(entry.title, "");
    }

    #[test]
    fn test_second_line_not_comment() {
        let entry = Entry::parse(ENTRY_NO_METADATA);
        assert!(entry.metadata.is_empty());
        assert_eq!(entry.title, "Title\n");
        assert_eq!(entry.body, ["Body line\n", "#comment in the body\n"]);
    }

    #[test]
    fn test_keeps_missing_trailing_newline() {
        let entry = Entry::parse(ENTRY_NO_TRAILING_NEWLINE);
        assert_eq!(entry.body.last().map(String::as_str), Some("last line"));
    }

    #[test]
    fn test_title_starting_with_marker() {
        let entry = Entry::parse("#Title\n#meta\nbody\n");
        assert_eq!(entry.title, "#Title\n");
        assert_eq!(entry.metadata, ["#meta\n"]);
    }

    #[test]
    fn test_metadata_first() {
        let entry = Entry::parse("Title\n#tags a b\nBody\n");
        let entry = entry.with_metadata_first("#published 2020-01-01 00:00:00\n");
        assert_eq!(entry.to_content(), "Title\n#published 2020-01-01 00:00:00\n#tags a b\nBody\n");

        let entry = Entry::parse("Only title").with_metadata_first("#x\n");
        assert_eq!(entry.to_content(), "Only title\n#x\n");
    }

    #[test]
    fn test_from_missing_file() {
        let file_name = PathBuf::from("entries/does/not/exist.txt");
        match Entry::from_file(&file_name) {
            Err(MetadateError::Read { path, .. }) => assert_eq!(path, file_name),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
