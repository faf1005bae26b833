
use std::{error::Error, collections::HashMap};
use ndarray::prelude::*;
use ndarray_stats::QuantileExt;
use crate::config::files_handling;


pub struct Similarity {
    w: Array2<f32>,
    t2i: HashMap<String, usize>,
    i2t: HashMap<usize, String>
}

impl Similarity {

    pub fn new(w: &mut Array2<f32>, t2i: HashMap<String, usize>) -> Similarity {

        // normalize each row to unit l2 norm, keeping sign, so a plain dot
        // product against a normalized query is cosine similarity.
        // row 0 is the untrained unknown row and may be all zeros, skip it.
        for mut row in w.axis_iter_mut(Axis(0)) {
            let norm = row.mapv(|a| a.powi(2)).sum().sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|a| a / norm);
            }
        }

        let w_max = *w.max().unwrap();
        let w_min = *w.min().unwrap();
        assert!(w_max <= 1.0 + f32::EPSILON);
        assert!(w_min >= -1.0 - f32::EPSILON);

        let mut i2t: HashMap<usize, String> = HashMap::new();
        for (t, i) in &t2i {
            i2t.entry(*i).or_insert(t.to_owned());
        }

        Self {
            w: w.clone(),
            t2i: t2i,
            i2t: i2t
        }
    }

    pub fn read_weights(file_path: &str) -> Result<Array2<f32>, Box<dyn Error>> {
        let w = files_handling::read_input::<Array2<f32>>(file_path)?;
        Ok(w)
    }

    pub fn read_t2i(file_path: &str) -> Result<HashMap<String, usize>, Box<dyn Error>> {
        let t2i = files_handling::read_input::<HashMap<String, usize>>(file_path)?;
        Ok(t2i)
    }

    pub fn extract_vec_from_word(&self, token: &str) -> Result<Array1<f32>, Box<dyn Error>> {

        // a query word outside the vocabulary is a user error at this surface,
        // unlike corpus text it is not silently mapped to the unknown id
        match self.t2i.get(token) {
            Some(i) => return Ok(self.w.slice(s![*i, ..]).to_owned()),
            None => return Err(format!("token: {} is not in most frequent tokens", token).into())
        };

    }

    pub fn extract_analogy_vec(&self, inputs: [&str; 3]) -> Result<Array1<f32>, Box<dyn Error>> {

        let mut vecs: Vec<Array1<f32>> = Vec::new();
        for e in inputs {
            let vec = self.extract_vec_from_word(e)?;
            vecs.push(vec);
        }

        let analogy = vecs.get(1).unwrap() - vecs.get(0).unwrap() + vecs.get(2).unwrap();
        Ok(analogy)
    }

    pub fn extract_analogies(&self, inputs: [&str; 3], k: usize) -> Result<Vec<(String, f32)>, Box<dyn Error>> {

        let analogy = self.extract_analogy_vec(inputs)?;
        let best_analogies = self.find_k_most_similar(&analogy, k)?;
        Ok(best_analogies)
    }

    // nearest vocabulary neighbors of a word, the word itself included
    pub fn most_similar(&self, token: &str, k: usize) -> Result<Vec<(String, f32)>, Box<dyn Error>> {
        let vec = self.extract_vec_from_word(token)?;
        self.find_k_most_similar(&vec, k)
    }

    // where the expected word lands among the top k analogy candidates,
    // None when it misses the cut
    pub fn rank_of_analogy_target(&self, inputs: [&str; 3], target: &str, k: usize) -> Result<Option<usize>, Box<dyn Error>> {
        let ranked = self.extract_analogies(inputs, k)?;
        Ok(ranked.iter().position(|(tok, _score)| tok == target))
    }

    pub fn find_k_most_similar(&self, vec: &Array1<f32>, k: usize) -> Result<Vec<(String, f32)>, Box<dyn Error>> {

        // score every row by its dot product with the query vector
        let mut sim_tokens: Vec<(String, f32)> = Vec::new();
        let scores = self.w.dot(vec); // of size w.0, vocab rows
        let mut indexed_scores: Vec<(usize, f32)> = scores.iter().map(|x| x.to_owned()).enumerate().collect();

        // sort by most similar in descending order
        indexed_scores.sort_by(|(_i, s), (_j, t)| t.total_cmp(s));

        // get k most similar tokens, skipping the unknown row which has no word
        for (index, score) in indexed_scores {
            if sim_tokens.len() == k {
                break
            }
            if let Some(sim_tok) = self.i2t.get(&index) {
                sim_tokens.push((sim_tok.to_string(), score));
            }
        }

        Ok(sim_tokens)
    }

}


#[cfg(test)]
mod tests {

    use std::collections::HashMap;
    use ndarray::array;
    use super::Similarity;

    fn toy_similarity() -> Similarity {

        // row 0 is the unknown row, rows 1..=3 belong to a, b, c
        let mut w = array![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [0.6, 0.8]
        ];
        let t2i: HashMap<String, usize> =
            [("a", 1), ("b", 2), ("c", 3)].iter().map(|(t, i)| (t.to_string(), *i)).collect();
        Similarity::new(&mut w, t2i)
    }

    #[test]
    fn most_similar_ranks_by_cosine() {

        let sim_obj = toy_similarity();
        let query = sim_obj.extract_vec_from_word("a").unwrap();
        let ranked = sim_obj.find_k_most_similar(&query, 3).unwrap();

        // cos(a, a) = 1.0, cos(a, c) = 0.6, cos(a, b) = 0.0
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0, "a");
        assert!((ranked[0].1 - 1.0).abs() < 1e-6);
        assert_eq!(ranked[1].0, "c");
        assert!((ranked[1].1 - 0.6).abs() < 1e-6);
        assert_eq!(ranked[2].0, "b");
    }

    #[test]
    fn unknown_query_word_is_an_error() {
        let sim_obj = toy_similarity();
        assert!(sim_obj.extract_vec_from_word("zzz").is_err());
    }

    #[test]
    fn k_is_capped_by_vocabulary() {
        let sim_obj = toy_similarity();
        let query = sim_obj.extract_vec_from_word("b").unwrap();
        // the unknown row carries no word, only 3 results can exist
        let ranked = sim_obj.find_k_most_similar(&query, 10).unwrap();
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn most_similar_resolves_the_word_itself_first() {
        let sim_obj = toy_similarity();
        let ranked = sim_obj.most_similar("a", 2).unwrap();
        assert_eq!(ranked[0].0, "a");
        assert_eq!(ranked[1].0, "c");
        assert!(sim_obj.most_similar("zzz", 2).is_err());
    }

    #[test]
    fn analogy_target_rank_is_reported() {
        let sim_obj = toy_similarity();
        // b - a + c leans towards b, so b ranks first
        let rank = sim_obj.rank_of_analogy_target(["a", "b", "c"], "b", 3).unwrap();
        assert_eq!(rank, Some(0));
        // a word outside the top k yields no rank
        let missed = sim_obj.rank_of_analogy_target(["a", "b", "c"], "a", 1).unwrap();
        assert_eq!(missed, None);
    }

    #[test]
    fn analogy_arithmetic_finds_target() {

        let sim_obj = toy_similarity();
        // b - a + c leans towards b
        let analogies = sim_obj.extract_analogies(["a", "b", "c"], 1).unwrap();
        assert_eq!(analogies[0].0, "b");
    }

    #[test]
    fn rows_are_normalized() {
        let sim_obj = toy_similarity();
        let c = sim_obj.extract_vec_from_word("c").unwrap();
        let norm = c.mapv(|x| x.powi(2)).sum().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

}
