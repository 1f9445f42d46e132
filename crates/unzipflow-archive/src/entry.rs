/// One entry read out of an archive, in the order the archive lists it.
#[derive(Clone, Debug)]
pub struct Entry {
    pub index: usize,
    pub full_name: String,
    pub name: String,
    pub size: u64,
    pub kind: EntryKind,
}

#[derive(Clone, Debug)]
pub enum EntryKind {
    /// A regular file. Contents are read with [`ArchiveReader::stream_entry`].
    ///
    /// [`ArchiveReader::stream_entry`]: crate::ArchiveReader::stream_entry
    File,
    /// A directory marker; its full name ends with a separator.
    Directory,
    /// An entry whose leaf name is empty.
    Unnamed,
}

impl Entry {
    pub(crate) fn classify(index: usize, full_name: String, size: u64, is_dir: bool) -> Self {
        let name = leaf_name(&full_name).to_string();
        let kind = if is_dir || is_directory_name(&full_name) {
            EntryKind::Directory
        } else if name.is_empty() {
            EntryKind::Unnamed
        } else {
            EntryKind::File
        };
        Self {
            index,
            full_name,
            name,
            size,
            kind,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }
}

fn is_directory_name(full_name: &str) -> bool {
    full_name.ends_with('/') || full_name.ends_with('\\')
}

/// The last path component of an entry name. Both `/` and `\` separate.
pub fn leaf_name(full_name: &str) -> &str {
    full_name.rsplit(['/', '\\']).next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_of_nested_path() {
        assert_eq!(leaf_name("reports/2024/q1.csv"), "q1.csv");
    }

    #[test]
    fn leaf_of_windows_path() {
        assert_eq!(leaf_name("reports\\q1.csv"), "q1.csv");
    }

    #[test]
    fn leaf_of_plain_name() {
        assert_eq!(leaf_name("a.txt"), "a.txt");
    }

    #[test]
    fn leaf_of_directory_is_empty() {
        assert_eq!(leaf_name("sub/"), "");
        assert_eq!(leaf_name(""), "");
    }

    #[test]
    fn trailing_slash_is_directory() {
        let entry = Entry::classify(0, "sub/".into(), 0, false);
        assert!(entry.is_directory());
        assert!(!entry.is_file());
    }

    #[test]
    fn trailing_backslash_is_directory() {
        let entry = Entry::classify(0, "sub\\".into(), 0, false);
        assert!(entry.is_directory());
    }

    #[test]
    fn empty_name_is_unnamed() {
        let entry = Entry::classify(3, String::new(), 0, false);
        assert!(matches!(entry.kind, EntryKind::Unnamed));
        assert!(!entry.is_file());
    }

    #[test]
    fn regular_file_keeps_full_and_leaf_names() {
        let entry = Entry::classify(1, "sub/a.txt".into(), 5, false);
        assert!(entry.is_file());
        assert_eq!(entry.full_name, "sub/a.txt");
        assert_eq!(entry.name, "a.txt");
        assert_eq!(entry.size, 5);
    }
}
