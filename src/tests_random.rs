use super::*;

use std::collections::HashMap;

use rand::Rng;

use crate::tests::{check_output_counts, check_structure};

fn generate_random_string(size: usize) -> Vec<u8> {
    const CHARSET: &[u8] = b"random";
    let mut rng = rand::thread_rng();
    (0..size)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())])
        .collect()
}

// props are a sequence of (num, length) to generate.
fn generate_random_patvals(props: &[(usize, usize)]) -> HashMap<Vec<u8>, u32> {
    let mut rng = rand::thread_rng();
    let mut patvals = HashMap::new();
    for &(num, len) in props {
        for _ in 0..num {
            let val = rng.gen_range(0..100);
            patvals.insert(generate_random_string(len), val);
        }
    }
    patvals
}

/// Keywords ending at `pos`, longest first: the order `match_at` reports.
fn naive_suffix_matches(patterns: &HashMap<Vec<u8>, u32>, consumed: &[u8]) -> Vec<Vec<u8>> {
    let mut matches: Vec<Vec<u8>> = patterns
        .keys()
        .filter(|p| consumed.ends_with(p))
        .cloned()
        .collect();
    matches.sort_by(|a, b| b.len().cmp(&a.len()));
    matches
}

fn build_machine(patvals: &HashMap<Vec<u8>, u32>) -> AhoCorasick<u8, u32> {
    let mut pma = AhoCorasick::new();
    for (pat, &val) in patvals {
        assert!(pma.register(pat, val));
    }
    pma
}

/// Feeds `haystack` and compares every report against the naive reference.
fn verify_scan(pma: &AhoCorasick<u8, u32>, patvals: &HashMap<Vec<u8>, u32>, haystack: &[u8]) {
    let mut cur = pma.cursor();
    for pos in 0..haystack.len() {
        let count = pma.feed(&mut cur, &haystack[pos]);
        let expected = naive_suffix_matches(patvals, &haystack[..=pos]);
        assert_eq!(count, expected.len());
        for (i, pat) in expected.iter().enumerate() {
            let m = pma.match_at(&cur, i);
            assert_eq!(&m.keyword(), pat);
            assert_eq!(m.value(), &patvals[pat]);
        }
    }
}

#[test]
fn test_scan_random() {
    for _ in 0..30 {
        let patvals = generate_random_patvals(&[(6, 1), (20, 2), (50, 3), (100, 4)]);
        let haystack = generate_random_string(100);

        let pma = build_machine(&patvals);
        verify_scan(&pma, &patvals, &haystack);
        check_structure(&pma);
        check_output_counts(&pma);
    }
}

#[test]
fn test_scan_after_random_removals() {
    for _ in 0..30 {
        let mut patvals = generate_random_patvals(&[(6, 1), (20, 2), (50, 3), (100, 4)]);
        let haystack = generate_random_string(100);
        let mut pma = build_machine(&patvals);

        // Remove every other keyword and verify that the survivors behave
        // exactly like a machine that never contained the others.
        let mut doomed: Vec<_> = patvals.keys().cloned().collect();
        doomed.sort();
        for pat in doomed.iter().step_by(2) {
            assert!(pma.unregister(pat));
            patvals.remove(pat);
        }
        assert_eq!(pma.keyword_count(), patvals.len());

        verify_scan(&pma, &patvals, &haystack);
        check_structure(&pma);
        check_output_counts(&pma);
    }
}

#[test]
fn test_registration_churn_random() {
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        let mut patvals: HashMap<Vec<u8>, u32> = HashMap::new();
        let mut pma = AhoCorasick::<u8, u32>::new();
        let mut last_rank = None;

        for _ in 0..500 {
            let pat = generate_random_string(rng.gen_range(1..5));
            if rng.gen_bool(0.6) {
                let val = rng.gen_range(0..100);
                let fresh = pma.register(&pat, val);
                assert_eq!(fresh, !patvals.contains_key(&pat));
                if fresh {
                    patvals.insert(pat.clone(), val);

                    // Ranks must strictly increase over insertion events.
                    let mut cur = pma.cursor();
                    let mut count = 0;
                    for c in &pat {
                        count = pma.feed(&mut cur, c);
                    }
                    assert!(count >= 1);
                    let rank = pma.match_at(&cur, 0).rank();
                    assert!(last_rank.map_or(true, |r| rank > r));
                    last_rank = Some(rank);
                }
            } else {
                let removed = pma.unregister(&pat);
                assert_eq!(removed, patvals.remove(&pat).is_some());
            }
            assert_eq!(pma.keyword_count(), patvals.len());
        }

        check_structure(&pma);
        let haystack = generate_random_string(200);
        verify_scan(&pma, &patvals, &haystack);
        check_output_counts(&pma);
    }
}

#[test]
fn test_for_each_keyword_random() {
    for _ in 0..30 {
        let mut patvals = generate_random_patvals(&[(30, 2), (60, 3), (60, 4)]);
        let mut pma = build_machine(&patvals);

        let mut doomed: Vec<_> = patvals.keys().cloned().collect();
        doomed.sort();
        for pat in doomed.iter().step_by(3) {
            assert!(pma.unregister(pat));
            patvals.remove(pat);
        }

        let mut seen = HashMap::new();
        pma.for_each_keyword(|kw, &v| {
            assert!(seen.insert(kw.to_vec(), v).is_none(), "keyword visited twice");
        });
        assert_eq!(seen, patvals);

        for (pat, val) in &patvals {
            assert_eq!(pma.get(pat), Some(val));
        }
    }
}
