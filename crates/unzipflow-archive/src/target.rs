/// Object name an extracted entry is uploaded to.
///
/// The leaf is joined under `folder` with `/` (no separator is added when the
/// folder is empty or already ends with one), then every `\` becomes `/`.
/// Archive sub-directories are not reproduced; two entries with the same leaf
/// map to the same object.
pub fn destination_object_name(folder: &str, leaf: &str) -> String {
    let joined = if folder.is_empty() {
        leaf.to_string()
    } else if folder.ends_with(['/', '\\']) {
        format!("{folder}{leaf}")
    } else {
        format!("{folder}/{leaf}")
    };
    joined.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_slash() {
        assert_eq!(destination_object_name("drop", "x.csv"), "drop/x.csv");
    }

    #[test]
    fn normalizes_backslashes() {
        assert_eq!(
            destination_object_name("inbound\\2024", "x.csv"),
            "inbound/2024/x.csv"
        );
    }

    #[test]
    fn folder_with_trailing_separator() {
        assert_eq!(destination_object_name("drop/", "x.csv"), "drop/x.csv");
        assert_eq!(destination_object_name("drop\\", "x.csv"), "drop/x.csv");
    }

    #[test]
    fn empty_folder_is_container_root() {
        assert_eq!(destination_object_name("", "x.csv"), "x.csv");
    }
}
