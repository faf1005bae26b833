
// imports
use crate::corpus::{Corpus, Tokenizer};

use std::collections::HashMap;


// id 0 is reserved for any token that did not make the frequency cut
pub const UNKNOWN_ID: usize = 0;

// an immutable vocabulary snapshot - built once from corpus counts, then
// passed by reference to the generator, trainer and similarity stages.
// known tokens hold dense ids in 1..=len(), so ids together with the
// unknown id cover [0, len()] with no gaps.
pub struct Vocab {
    t2i: HashMap<String, usize>,
    i2t: HashMap<usize, String>
}

impl Vocab {

    pub fn build(token2count: &HashMap<String, usize>, vocab_size: usize) -> Vocab {

        // populate the snapshot with the vocab_size most common tokens found in token2count.
        // done by sorting by count, breaking ties by token so builds are deterministic,
        // and taking the K first entries. Ranks start at 1 since 0 is the unknown id.
        let mut tup = token2count
        .iter()
        .map(|(k, v)| (k.to_owned(), *v))
        .collect::<Vec<(String, usize)>>();
        tup.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let vocab_size = std::cmp::min(vocab_size, tup.len());
        tup.truncate(vocab_size);

        let mut t2i: HashMap<String, usize> = HashMap::new();
        let mut i2t: HashMap<usize, String> = HashMap::new();
        for (rank, (tok, _count)) in tup.into_iter().enumerate() {
            t2i.insert(tok.clone(), rank + 1);
            i2t.insert(rank + 1, tok);
        }

        println!("using {} most common tokens out of {}", vocab_size, token2count.len());

        Self {
            t2i: t2i,
            i2t: i2t
        }
    }

    pub fn from_map(t2i: HashMap<String, usize>) -> Vocab {

        let mut i2t: HashMap<usize, String> = HashMap::new();
        for (t, i) in &t2i {
            i2t.entry(*i).or_insert(t.to_owned());
        }

        Self {
            t2i: t2i,
            i2t: i2t
        }
    }

    // number of known tokens, excluding the unknown id
    pub fn len(&self) -> usize {
        return self.t2i.len()
    }

    pub fn is_empty(&self) -> bool {
        return self.t2i.is_empty()
    }

    // total number of ids including the reserved unknown id,
    // which is the row count any embedding table over this vocab needs
    pub fn total_ids(&self) -> usize {
        return self.t2i.len() + 1
    }

    pub fn id_of(&self, token: &str) -> usize {
        match self.t2i.get(token) {
            Some(i) => *i,
            None => UNKNOWN_ID
        }
    }

    pub fn token_of(&self, id: usize) -> Option<&String> {
        return self.i2t.get(&id)
    }

    // substitute each word of a record with its vocabulary id
    pub fn encode(&self, record: &str) -> Vec<usize> {
        Corpus::tokenize(record)
        .iter()
        .map(|tok| self.id_of(tok))
        .collect()
    }

    pub fn to_map(&self) -> HashMap<String, usize> {
        return self.t2i.clone()
    }

}
