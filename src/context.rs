//! # Context Block
//! The labeled concatenation of both documents that rides along with every query.
//!
//! Assembly is a pure function of the two current document texts. Nothing is stored: the block is
//! recomputed from the documents on each query, so editing or re-uploading a document is always
//! reflected in the next request.

/// Label opening the first document's section.
pub const FILE_1_LABEL: &str = "--- File 1 ---\n";
/// Label opening the second document's section.
pub const FILE_2_LABEL: &str = "\n--- File 2 ---\n";

/// Concatenate the two document texts into one labeled block.
pub fn assemble_context(file_1: &str, file_2: &str) -> String {
    let mut block = String::with_capacity(
        FILE_1_LABEL.len() + file_1.len() + FILE_2_LABEL.len() + file_2.len() + 1,
    );
    block.push_str(FILE_1_LABEL);
    block.push_str(file_1);
    block.push('\n');
    block.push_str(FILE_2_LABEL);
    block.push_str(file_2);
    block
}

/// Split an assembled block back into its two document texts.
/// Returns None if the block does not carry the labels inserted by [assemble_context].
///
/// The labels are markers, not escapes: if the first document's own text contains the
/// "File 2" label sequence, the split happens at that first occurrence and the recovered
/// halves differ from the originals.
pub fn split_context(block: &str) -> Option<(&str, &str)> {
    let rest = block.strip_prefix(FILE_1_LABEL)?;
    let (first, second) = rest.split_once(FILE_2_LABEL)?;
    Some((first.strip_suffix('\n')?, second))
}

#[cfg(test)]
mod test_context {
    use super::{assemble_context, split_context};

    #[test]
    fn test_assemble_labels_both_files() {
        let block = assemble_context("alice is 31", "bob is 29");
        assert!(block.contains("File 1"));
        assert!(block.contains("File 2"));
        assert!(block.contains("alice is 31"));
        assert!(block.contains("bob is 29"));
    }

    #[test]
    fn test_split_recovers_both_halves_exactly() {
        let a = "{\"name\": \"alice\"}\nwith a second line";
        let b = "{\"name\": \"bob\"}";
        let block = assemble_context(a, b);
        let (got_a, got_b) = split_context(&block).unwrap();
        assert_eq!(a, got_a);
        assert_eq!(b, got_b);
    }

    #[test]
    fn test_split_of_empty_documents() {
        let block = assemble_context("", "");
        assert_eq!(Some(("", "")), split_context(&block));
    }

    #[test]
    fn test_split_at_first_label_occurrence() {
        // a document that contains the label sequence itself wins the split; the labels
        // are markers, not escapes
        let a = format!("before\n{}after", super::FILE_2_LABEL);
        let block = assemble_context(&a, "b");
        let (got_a, _) = split_context(&block).unwrap();
        assert_eq!("before", got_a);
    }

    #[test]
    fn test_split_rejects_foreign_text() {
        assert!(split_context("not an assembled block").is_none());
    }
}
