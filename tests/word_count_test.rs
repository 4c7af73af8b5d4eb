use std::cell::Cell;
use std::collections::HashMap;

use acdyn::AhoCorasick;

const TEXT: &str = "\
    In a hole in the ground there lived a hobbit. Not a nasty, dirty, wet \
    hole, filled with the ends of worms and an oozy smell, nor yet a dry, \
    bare, sandy hole with nothing in it to sit down on or to eat: it was a \
    hobbit-hole, and that means comfort. The hobbit was a very well-to-do \
    hobbit, and his name was Baggins.";

/// Lowercases the text and squeezes every non-alphabetic run into a single
/// space, so that whole words are exactly the space-delimited keywords.
fn normalize(text: &str) -> Vec<u8> {
    let mut out = vec![b' '];
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            out.push(c.to_ascii_lowercase() as u8);
        } else if *out.last().unwrap() != b' ' {
            out.push(b' ');
        }
    }
    if *out.last().unwrap() != b' ' {
        out.push(b' ');
    }
    out
}

fn occurrences(haystack: &[u8], needle: &[u8]) -> u32 {
    (0..haystack.len())
        .filter(|&i| haystack[i..].starts_with(needle))
        .count() as u32
}

#[test]
fn test_word_occurrence_accounting() {
    let text = normalize(TEXT);

    // Each distinct word is registered as " word " with a zeroed counter.
    // Delimiting spaces make the matches whole-word, and consecutive words
    // still both match because reported occurrences may overlap.
    let mut pma = AhoCorasick::<u8, Cell<u32>>::new();
    let mut expected = HashMap::new();
    for word in TEXT
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
    {
        let mut keyword = vec![b' '];
        keyword.extend(word.to_ascii_lowercase().into_bytes());
        keyword.push(b' ');
        if pma.register(&keyword, Cell::new(0)) {
            expected.insert(keyword.clone(), occurrences(&text, &keyword));
        }
    }
    assert!(pma.keyword_count() > 30);

    // One pass over the text, bumping each match's counter through the
    // retrieved value.
    let mut cur = pma.cursor();
    for c in &text {
        for i in 0..pma.feed(&mut cur, c) {
            let counter = pma.match_at(&cur, i).value();
            counter.set(counter.get() + 1);
        }
    }

    let mut seen = 0;
    pma.for_each_keyword(|kw, counter| {
        assert_eq!(counter.get(), expected[kw], "wrong count for {:?}", kw);
        assert!(counter.get() >= 1);
        seen += 1;
    });
    assert_eq!(seen, expected.len());

    // The frequent words come out with their known counts.
    assert_eq!(pma.get(b" hobbit ").unwrap().get(), 4);
    assert_eq!(pma.get(b" hole ").unwrap().get(), 4);
    assert_eq!(pma.get(b" the ").unwrap().get(), 3);
    assert_eq!(pma.get(b" a ").unwrap().get(), 6);
}
