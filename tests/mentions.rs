mod common;

use ppaxe::nlp::{
    candidates,
    positions::{take_closest, take_farthest},
    proteins::{extract_mentions, extract_spans},
    NerTag, Token,
};
use proptest::prelude::*;

fn tagged(flags: &[bool]) -> Vec<Token> {
    flags
        .iter()
        .enumerate()
        .map(|(i, protein)| {
            let ner = if *protein { NerTag::Protein } else { NerTag::Other };
            let word = format!("w{}", i + 1);
            Token::new(i + 1, word.clone(), word, "NN", ner)
        })
        .collect()
}

#[test]
fn adjacent_protein_tokens_form_one_span() {
    let tokens = tagged(&[false, true, true, false, true]);
    assert_eq!(extract_spans(&tokens), vec![vec![2, 3], vec![5]]);

    let mentions = extract_mentions(&tokens).unwrap();
    assert_eq!(mentions[0].symbol, "w2 w3");
    assert_eq!(mentions[1].symbol, "w5");
    assert_eq!(mentions[0].to_string(), "w2 w3 found in positions 2:3");
}

#[test]
fn mention_display_names_positions() {
    let mentions = extract_mentions(&common::mapk_tokens()).unwrap();
    assert_eq!(mentions[0].to_string(), "MAPK found in positions 3");
    assert_eq!(mentions[1].to_string(), "cryoglobulin found in positions 7");
}

#[test]
fn three_mentions_give_three_ordered_pairs() {
    let tokens = tagged(&[true, false, true, false, false, true]);
    let mentions = extract_mentions(&tokens).unwrap();
    let pairs = candidates::generate(&mentions);
    let symbols: Vec<_> = pairs
        .iter()
        .map(|c| (c.prot1.symbol.as_str(), c.prot2.symbol.as_str()))
        .collect();
    assert_eq!(symbols, vec![("w1", "w3"), ("w1", "w6"), ("w3", "w6")]);
}

proptest! {
    #[test]
    fn spans_are_maximal_contiguous_runs(flags in prop::collection::vec(any::<bool>(), 0..40)) {
        let tokens = tagged(&flags);
        let spans = extract_spans(&tokens);

        let covered: usize = spans.iter().map(Vec::len).sum();
        prop_assert_eq!(covered, flags.iter().filter(|f| **f).count());
        for span in &spans {
            prop_assert!(!span.is_empty());
            prop_assert!(span.windows(2).all(|w| w[1] == w[0] + 1));
            prop_assert!(span.iter().all(|&i| flags[i - 1]));
            let first = span[0];
            let last = span[span.len() - 1];
            prop_assert!(first == 1 || !flags[first - 2]);
            prop_assert!(last == flags.len() || !flags[last]);
        }
    }

    #[test]
    fn candidates_cover_every_pair_once(flags in prop::collection::vec(any::<bool>(), 0..30)) {
        let tokens = tagged(&flags);
        let mentions = extract_mentions(&tokens).unwrap();
        let pairs = candidates::generate(&mentions);
        let n = mentions.len();
        prop_assert_eq!(pairs.len(), n * n.saturating_sub(1) / 2);
        for pair in &pairs {
            prop_assert!(pair.prot1.last() < pair.prot2.first());
        }
    }

    #[test]
    fn closest_has_minimal_distance(
        mut values in prop::collection::vec(1usize..200, 1..20),
        target in 1usize..200,
    ) {
        values.sort_unstable();
        let closest = take_closest(&values, target).unwrap();
        let farthest = take_farthest(&values, target).unwrap();
        prop_assert!(values.contains(&closest));
        prop_assert!(values.contains(&farthest));
        for v in &values {
            prop_assert!(closest.abs_diff(target) <= v.abs_diff(target));
            prop_assert!(farthest.abs_diff(target) >= v.abs_diff(target));
        }
    }
}
