/// Characters that are rejected by common filesystems.
pub const RESERVED_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Removes the reserved characters from a candidate file name.
///
/// Everything else is kept as is, including spaces and non-ASCII letters. The
/// result may be empty.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| !RESERVED_FILENAME_CHARS.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_reserved() {
        assert_eq!(sanitize("My/File:Name"), "MyFileName");
        assert_eq!(sanitize(r#"a<b>c:d"e/f\g|h?i*j"#), "abcdefghij");
    }

    #[test]
    fn keeps_spaces_and_accents() {
        assert_eq!(sanitize("Avaliação de Impacto 2024"), "Avaliação de Impacto 2024");
    }

    #[test]
    fn all_reserved_gives_empty() {
        assert_eq!(sanitize("<>:\"/\\|?*"), "");
    }

    #[test]
    fn idempotent() {
        for s in [
            "",
            "plain",
            "My/File:Name",
            "??**",
            "São Paulo | Q3 <draft>",
            "tab\there",
        ] {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once);
        }
    }
}
