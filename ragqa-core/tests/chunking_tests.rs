//! Property tests for recursive chunking.

use proptest::prelude::*;
use ragqa_core::{Chunk, Chunker, Document, RagError, RecursiveChunker};

/// Text built from short words joined by a mix of separators.
fn arb_text() -> impl Strategy<Value = String> {
    let joiner =
        prop_oneof![Just(" "), Just(". "), Just("\n"), Just("\n\n"), Just("! "), Just("?")];
    proptest::collection::vec(("[a-zA-Zé]{1,8}", joiner), 1..60).prop_map(|parts| {
        parts.into_iter().map(|(word, sep)| format!("{word}{sep}")).collect::<String>()
    })
}

fn chunker(size: usize, overlap: usize) -> RecursiveChunker {
    RecursiveChunker::new(size, overlap).with_separators(["\n\n", "\n", ".", "!", "?", " "])
}

/// **Property: lossless reconstruction**
/// *For any* non-empty text and `chunk_size > chunk_overlap >= 0`, the chunk
/// sequence is non-empty and its bodies (overlap removed) concatenate to the
/// original text.
mod prop_lossless {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn bodies_reconstruct_text(
            text in arb_text(),
            size in 20usize..120,
            overlap_ratio in 0.0f64..0.9,
        ) {
            let overlap = ((size as f64) * overlap_ratio) as usize;
            let doc = Document::new("doc", text.clone());
            let chunks = chunker(size, overlap).chunk(&doc).unwrap();

            prop_assert!(!chunks.is_empty());
            let rebuilt: String = chunks.iter().map(Chunk::body).collect();
            prop_assert_eq!(rebuilt, text);
        }
    }
}

/// **Property: size bound and overlap prefix**
/// *For any* text whose words all fit, every chunk is at most `chunk_size`
/// characters, indices are consecutive, and each chunk's overlap prefix is
/// the tail of the previous chunk's text.
mod prop_bounds {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn chunks_respect_size_and_share_overlap(
            text in arb_text(),
            size in 20usize..120,
            overlap_ratio in 0.0f64..0.9,
        ) {
            let overlap = ((size as f64) * overlap_ratio) as usize;
            let doc = Document::new("doc", text);
            let chunks = chunker(size, overlap).chunk(&doc).unwrap();

            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.sequence_index, i);
                prop_assert!(chunk.text.chars().count() <= size);
                prop_assert!(chunk.overlap <= overlap);
            }
            prop_assert_eq!(chunks[0].overlap, 0);
            for pair in chunks.windows(2) {
                let prefix: String = pair[1].text.chars().take(pair[1].overlap).collect();
                prop_assert!(pair[0].text.ends_with(&prefix));
            }
        }
    }
}

/// **Property: text that fits is never split**
/// *For any* text no longer than `chunk_size` characters, chunking yields
/// exactly one chunk equal to the text, whatever the overlap.
mod prop_fits_in_one_chunk {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn short_text_is_a_single_chunk(
            text in arb_text(),
            slack in 0usize..40,
            overlap_ratio in 0.0f64..0.9,
        ) {
            let size = text.chars().count() + slack;
            let overlap = ((size as f64) * overlap_ratio) as usize;
            let chunks = chunker(size, overlap).chunk(&Document::new("doc", text.clone())).unwrap();

            prop_assert_eq!(chunks.len(), 1);
            prop_assert_eq!(&chunks[0].text, &text);
            prop_assert_eq!(chunks[0].overlap, 0);
        }
    }
}

/// **Property: nonsensical overlap is rejected**
/// *For any* `chunk_overlap >= chunk_size`, chunking fails with `ChunkingError`.
mod prop_overlap_rejected {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn overlap_at_or_above_size_fails(
            size in 0usize..200,
            extra in 0usize..50,
            text in "[a-z ]{1,40}",
        ) {
            let doc = Document::new("doc", text);
            let result = RecursiveChunker::new(size, size + extra).chunk(&doc);
            prop_assert!(matches!(result, Err(RagError::ChunkingError(_))));
        }
    }
}

#[test]
fn oversized_units_are_never_dropped() {
    let unit = "x".repeat(300);
    let text = format!("small start. {unit}. small end.");
    let chunks = chunker(50, 10).chunk(&Document::new("doc", text.clone())).unwrap();

    let oversized: Vec<&Chunk> = chunks.iter().filter(|c| c.text.chars().count() > 50).collect();
    assert_eq!(oversized.len(), 1);
    assert!(oversized[0].text.contains(&unit));
    let rebuilt: String = chunks.iter().map(Chunk::body).collect();
    assert_eq!(rebuilt, text);
}
