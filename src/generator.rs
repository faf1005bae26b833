
// imports
use crate::vocab::{Vocab, UNKNOWN_ID};

use std::collections::HashSet;
use std::error::Error;
use rand::{thread_rng, Rng};
use rand::seq::SliceRandom;


// one training batch - three parallel arrays, one entry per (target, context) pair.
// label 1.0 marks a pair that co-occurred within the window, 0.0 a sampled negative.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub targets: Vec<usize>,
    pub contexts: Vec<usize>,
    pub labels: Vec<f32>
}

impl Batch {

    fn push(&mut self, target: usize, context: usize, label: f32) {
        self.targets.push(target);
        self.contexts.push(context);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        return self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        return self.targets.is_empty()
    }

}


// supplies an endless randomized stream of labeled skip-gram pairs, one batch
// per call, one record per batch. Holds a shuffled permutation of the record
// indices and a cursor into it as its only mutable state. When the permutation
// is exhausted it is re-shuffled and the stream restarts transparently, so
// every record is visited in full before any record is visited again.
pub struct SkipGramGenerator<'a> {
    records: &'a [String],
    vocab: &'a Vocab,
    window_size: usize,
    negative_samples: usize,
    order: Vec<usize>,
    cursor: usize
}

impl<'a> SkipGramGenerator<'a> {

    pub fn new(
        records: &'a [String],
        vocab: &'a Vocab,
        window_size: usize,
        negative_samples: usize) -> Result<SkipGramGenerator<'a>, Box<dyn Error>> {

        // an empty permutation would make the stream loop forever producing nothing
        if records.is_empty() {
            return Err(format!("cannot build a generator over zero records").into());
        }
        if vocab.is_empty() {
            return Err(format!("cannot build a generator over an empty vocabulary").into());
        }

        let mut order = (0..records.len()).collect::<Vec<usize>>();
        order.shuffle(&mut thread_rng());

        Ok(
            Self {
                records: records,
                vocab: vocab,
                window_size: window_size,
                negative_samples: negative_samples,
                order: order,
                cursor: 0
            }
        )
    }

    // the number of batches that visits every record exactly once
    pub fn epoch_len(&self) -> usize {
        return self.records.len()
    }

    pub fn next_batch(&mut self) -> Batch {

        if self.cursor >= self.order.len() {
            self.order.shuffle(&mut thread_rng());
            self.cursor = 0;
        }

        let record = &self.records[self.order[self.cursor]];
        self.cursor += 1;

        let sequence = self.vocab.encode(record);
        self.pairs_of(&sequence)
    }

    fn pairs_of(&self, sequence: &[usize]) -> Batch {

        // form all (target, context) pairs whose positions lie within the window,
        // labeled positive, and per positive pair draw negatives from the vocabulary
        // that did not co-occur with the target inside this window. Pairs touching
        // the unknown id are dropped, the reserved row is never trained.
        // a record shorter than the window simply yields a small or empty batch.
        let mut batch = Batch::default();
        let mut rng = thread_rng();
        let n = sequence.len();

        for i in 0..n {

            let target = sequence[i];
            if target == UNKNOWN_ID {
                continue
            }

            let lo = i.saturating_sub(self.window_size);
            let hi = std::cmp::min(n, i + self.window_size + 1);

            // everything inside this window is off-limits for negative sampling
            let mut cooccurring: HashSet<usize> = HashSet::new();
            cooccurring.insert(target);
            for j in lo..hi {
                cooccurring.insert(sequence[j]);
            }

            for j in lo..hi {

                if j == i { continue }
                let context = sequence[j];
                if context == UNKNOWN_ID {
                    continue
                }
                batch.push(target, context, 1.0);

                // bounded retries, a tiny vocabulary where every id co-occurs
                // yields fewer negatives instead of spinning
                let mut drawn = 0;
                let mut attempts = 0;
                let max_attempts = 10 * (self.vocab.len() + self.negative_samples);
                while drawn < self.negative_samples && attempts < max_attempts {
                    attempts += 1;
                    let candidate = rng.gen_range(1..=self.vocab.len());
                    if cooccurring.contains(&candidate) {
                        continue
                    }
                    batch.push(target, candidate, 0.0);
                    drawn += 1;
                }

            }

        }

        batch
    }

}

// the stream is infinite by design, `next` never signals termination
impl<'a> Iterator for SkipGramGenerator<'a> {
    type Item = Batch;
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_batch())
    }
}


#[cfg(test)]
mod tests {

    use std::collections::{HashMap, HashSet};
    use crate::vocab::{Vocab, UNKNOWN_ID};
    use super::SkipGramGenerator;

    fn vocab_of(pairs: &[(&str, usize)]) -> Vocab {
        let counts: HashMap<String, usize> = pairs.iter().map(|(t, c)| (t.to_string(), *c)).collect();
        Vocab::build(&counts, pairs.len())
    }

    #[test]
    fn golden_positive_pairs() {

        // "a b a" with window 1 must produce the positives (a->b) and (b->a),
        // each labeled 1, with a=1 and b=2 in the vocabulary
        let records = vec!["a b a".to_string()];
        let vocab = vocab_of(&[("a", 2), ("b", 1)]);
        assert_eq!(vocab.id_of("a"), 1);
        assert_eq!(vocab.id_of("b"), 2);

        let mut generator = SkipGramGenerator::new(&records, &vocab, 1, 0).unwrap();
        let batch = generator.next_batch();

        let mut positives: HashSet<(usize, usize)> = HashSet::new();
        for k in 0..batch.len() {
            assert_eq!(batch.labels[k], 1.0);
            positives.insert((batch.targets[k], batch.contexts[k]));
        }
        assert!(positives.contains(&(1, 2)));
        assert!(positives.contains(&(2, 1)));
    }

    #[test]
    fn positives_lie_within_window() {

        // all tokens distinct, so every id pins down a position in the record
        let records = vec!["a b c d e".to_string()];
        let vocab = vocab_of(&[("a", 5), ("b", 4), ("c", 3), ("d", 2), ("e", 1)]);
        let window_size = 2;

        let mut generator = SkipGramGenerator::new(&records, &vocab, window_size, 0).unwrap();
        let batch = generator.next_batch();

        let sequence = vocab.encode(&records[0]);
        let position_of = |id: usize| sequence.iter().position(|x| *x == id).unwrap();

        // 2+3+4+3+2 windowed pairs over 5 positions with window 2
        assert_eq!(batch.len(), 14);
        for k in 0..batch.len() {
            assert_eq!(batch.labels[k], 1.0);
            let i = position_of(batch.targets[k]);
            let j = position_of(batch.contexts[k]);
            assert!(i != j);
            assert!(i.abs_diff(j) <= window_size);
        }
    }

    #[test]
    fn negatives_never_cooccur() {

        // the record only uses a and b, so every negative context must come
        // from the rest of the vocabulary
        let records = vec!["a b".to_string()];
        let vocab = vocab_of(&[("a", 9), ("b", 8), ("c", 3), ("d", 2), ("e", 1)]);
        let in_record: HashSet<usize> = vec![vocab.id_of("a"), vocab.id_of("b")].into_iter().collect();

        let mut generator = SkipGramGenerator::new(&records, &vocab, 1, 3).unwrap();
        let batch = generator.next_batch();

        let mut n_negatives = 0;
        for k in 0..batch.len() {
            if batch.labels[k] == 0.0 {
                n_negatives += 1;
                assert!(!in_record.contains(&batch.contexts[k]));
                assert!(batch.contexts[k] != UNKNOWN_ID);
            }
        }
        // 2 positives, 3 negatives each
        assert_eq!(n_negatives, 6);
    }

    #[test]
    fn tiny_vocab_bounds_negative_sampling() {

        // every vocabulary id co-occurs here, no negative can exist -
        // the generator must return rather than spin
        let records = vec!["a b".to_string()];
        let vocab = vocab_of(&[("a", 2), ("b", 1)]);

        let mut generator = SkipGramGenerator::new(&records, &vocab, 1, 5).unwrap();
        let batch = generator.next_batch();
        assert!(batch.labels.iter().all(|l| *l == 1.0));
    }

    #[test]
    fn short_record_yields_empty_batch() {

        let records = vec!["a".to_string()];
        let vocab = vocab_of(&[("a", 1), ("b", 1)]);

        let mut generator = SkipGramGenerator::new(&records, &vocab, 4, 2).unwrap();
        for _ in 0..3 {
            // no neighbor exists, the batch is empty but the stream keeps going
            let batch = generator.next_batch();
            assert!(batch.is_empty());
        }
    }

    #[test]
    fn unknown_tokens_are_dropped() {

        let records = vec!["a zzz b".to_string()];
        let vocab = vocab_of(&[("a", 2), ("b", 1)]);

        let mut generator = SkipGramGenerator::new(&records, &vocab, 1, 1).unwrap();
        let batch = generator.next_batch();
        for k in 0..batch.len() {
            assert!(batch.targets[k] != UNKNOWN_ID);
            assert!(batch.contexts[k] != UNKNOWN_ID);
        }
    }

    #[test]
    fn empty_corpus_fails_fast() {
        let records: Vec<String> = Vec::new();
        let vocab = vocab_of(&[("a", 1)]);
        assert!(SkipGramGenerator::new(&records, &vocab, 1, 1).is_err());
    }

    #[test]
    fn reshuffle_covers_all_records() {

        // single-token-type records make the visited record recoverable
        // from the batch contents
        let records = vec!["a a".to_string(), "b b".to_string(), "c c".to_string()];
        let vocab = vocab_of(&[("a", 3), ("b", 2), ("c", 1)]);

        let mut generator = SkipGramGenerator::new(&records, &vocab, 1, 0).unwrap();

        // several epochs in a row, each must cover the full record set
        for _epoch in 0..5 {
            let mut visited: HashSet<usize> = HashSet::new();
            for _ in 0..generator.epoch_len() {
                let batch = generator.next_batch();
                assert!(!batch.is_empty());
                visited.insert(batch.targets[0]);
            }
            assert_eq!(visited.len(), records.len());
        }
    }

    #[test]
    fn generator_is_an_infinite_iterator() {
        let records = vec!["a b".to_string()];
        let vocab = vocab_of(&[("a", 2), ("b", 1)]);
        let generator = SkipGramGenerator::new(&records, &vocab, 1, 1).unwrap();
        // far past exhaustion of the single-record permutation
        assert_eq!(generator.take(10).count(), 10);
    }

}
