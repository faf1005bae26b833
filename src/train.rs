

use ndarray::prelude::*;
use ndarray::Array;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use crate::config::TrainParams;
use crate::generator::{Batch, SkipGramGenerator};
use std::error::Error;
use std::time::Instant;


pub struct Train {
    w_tokens: Array2<f32>,
    w_context: Array2<f32>
}

struct DisplayProgress {
    epoch_loss: f32,   // accumulated batch losses within the epoch
    total_batches: f32 // number of non-empty batches seen
}

impl DisplayProgress {

    fn new() -> Self {
        Self {
            epoch_loss: 0.0,
            total_batches: 0.0
        }
    }

    fn reset(&mut self) {
        self.epoch_loss = 0.0;
        self.total_batches = 0.0;
    }

    fn avg_loss(&self) -> f32 {
        if self.total_batches == 0.0 {
            return 0.0
        }
        return self.epoch_loss / self.total_batches
    }

}

impl Train {

    fn new(n_rows: usize, embedding_dim: usize) -> Train {

        Self {
            w_tokens: Array::random((n_rows, embedding_dim), Uniform::new(-0.5, 0.5)) / embedding_dim as f32,
            w_context: Array::random((n_rows, embedding_dim), Uniform::new(-0.5, 0.5)) / embedding_dim as f32
        }
    }

    pub fn get_w_tokens(&self) -> Array2<f32> {
        return self.w_tokens.clone();
    }

    pub fn get_w_context(&self) -> Array2<f32> {
        return self.w_context.clone();
    }

    fn sigmoid(x: f32) -> f32 {
        1.0 / (1.0 + (-x).exp())
    }

    fn do_training_batch(&mut self, batch: &Batch, learning_rate: f32) -> f32 {

        // one logistic SGD step per (target, context, label) triple over the
        // dot product of the pair's rows. Returns the mean binary cross-entropy
        // of the batch. Row 0 is the reserved unknown row, the generator never
        // emits it so it stays at its initialization.
        let mut batch_loss = 0.0;

        for k in 0..batch.len() {

            let target = batch.targets[k];
            let context = batch.contexts[k];
            let label = batch.labels[k];

            let v_tok: Array1<f32> = self.w_tokens.row(target).to_owned();
            let v_context: Array1<f32> = self.w_context.row(context).to_owned();

            let score = Train::sigmoid(v_tok.dot(&v_context));
            let diff = score - label;

            // clamp inside the log so a saturated score cannot produce inf
            let eps = f32::EPSILON;
            batch_loss += -(label * (score.max(eps)).ln() + (1.0 - label) * ((1.0 - score).max(eps)).ln());

            self.w_tokens.row_mut(target).scaled_add(-learning_rate * diff, &v_context);
            self.w_context.row_mut(context).scaled_add(-learning_rate * diff, &v_tok);

        }

        batch_loss / batch.len() as f32
    }


    fn train(&mut self, generator: &mut SkipGramGenerator, train_params: &TrainParams) -> Result<(), Box<dyn Error>> {

        let learning_rate = train_params.learning_rate;
        let progress_verbose = train_params.progress_verbose;
        let mut progress_params = DisplayProgress::new();

        for _epoch in 0..train_params.max_iter {

            let my_time = Instant::now();
            progress_params.reset();

            // one epoch visits every record exactly once, the generator
            // re-shuffles its permutation on its own across epochs
            let epoch_len = generator.epoch_len();
            for pp in 0..epoch_len {

                let batch = generator.next_batch();
                if batch.is_empty() {
                    // records shorter than the window supply nothing to train on
                    continue
                }

                progress_params.epoch_loss += self.do_training_batch(&batch, learning_rate);
                progress_params.total_batches += 1.0;

                let c_bar = 100000;
                if progress_verbose && pp % c_bar == 0 && pp > 0 {
                    let progress = ((pp as f32 / epoch_len as f32) * 100.0).floor();
                    println!("in epoch {}, {}%, loss: {}", _epoch, progress, progress_params.avg_loss());
                }

            }

            println!("finished epoch {}, loss is {}, took: {} seconds...", _epoch, progress_params.avg_loss(), my_time.elapsed().as_secs());
        }

        Ok(())

    }

    pub fn run(generator: &mut SkipGramGenerator, n_rows: usize, train_params: &TrainParams) -> Result<Train, Box<dyn Error>> {

        let mut trainer = Train::new(n_rows, train_params.embedding_dim);
        trainer.train(generator, train_params)?;
        Ok(trainer)
    }

}


#[cfg(test)]
mod tests {

    use std::collections::HashMap;
    use crate::config::TrainParams;
    use crate::generator::SkipGramGenerator;
    use crate::vocab::Vocab;
    use super::Train;

    fn train_params(max_iter: usize) -> TrainParams {
        TrainParams {
            vocab_size: 3,
            negative_samples: 4,
            embedding_dim: 16,
            learning_rate: 0.1,
            max_iter: max_iter,
            progress_verbose: false
        }
    }

    fn toy_vocab() -> Vocab {
        let counts: HashMap<String, usize> =
            [("a", 6), ("b", 5), ("c", 1)].iter().map(|(t, c)| (t.to_string(), *c)).collect();
        Vocab::build(&counts, 3)
    }

    #[test]
    fn sigmoid_is_a_squash() {
        assert_eq!(Train::sigmoid(0.0), 0.5);
        assert!(Train::sigmoid(10.0) > 0.99);
        assert!(Train::sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn trained_tables_have_expected_shape() {

        let records = vec!["a b".to_string(), "a b".to_string()];
        let vocab = toy_vocab();
        let params = train_params(2);

        let mut generator = SkipGramGenerator::new(&records, &vocab, 1, params.negative_samples).unwrap();
        let trainer = Train::run(&mut generator, vocab.total_ids(), &params).unwrap();

        let w_tokens = trainer.get_w_tokens();
        let w_context = trainer.get_w_context();
        assert_eq!(w_tokens.dim(), (4, 16));
        assert_eq!(w_context.dim(), (4, 16));
        assert!(w_tokens.iter().all(|x| x.is_finite()));
        assert!(w_context.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn cooccurring_pair_beats_sampled_pair() {

        // "a b" always co-occur while "c" only ever appears as a negative,
        // so after training the (a, b) score must dominate the (a, c) score
        let records = vec!["a b".to_string(), "a b".to_string(), "a b".to_string()];
        let vocab = toy_vocab();
        let params = train_params(200);

        let mut generator = SkipGramGenerator::new(&records, &vocab, 1, params.negative_samples).unwrap();
        let trainer = Train::run(&mut generator, vocab.total_ids(), &params).unwrap();

        let w_tokens = trainer.get_w_tokens();
        let w_context = trainer.get_w_context();

        let score = |t: usize, c: usize| -> f32 {
            Train::sigmoid(w_tokens.row(t).dot(&w_context.row(c)))
        };

        let a = vocab.id_of("a");
        let b = vocab.id_of("b");
        let c = vocab.id_of("c");
        assert!(score(a, b) > 0.5);
        assert!(score(a, b) > score(a, c));
    }

}
