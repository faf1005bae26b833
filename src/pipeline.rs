
// imports
use crate::config::{files_handling, Config};
use crate::corpus::Corpus;
use crate::generator::SkipGramGenerator;
use crate::train::Train;
use crate::vocab::Vocab;

use core::panic;
use std::collections::HashMap;
use std::env;
use std::time::Instant;
use ndarray::Array2;
use rayon::ThreadPoolBuilder;

pub struct Pipeline {}

impl Pipeline {

    // runs the main procedure of 4 steps -
    // -> configuration of arguments
    // -> corpus loading and vocabulary building
    // -> skip-gram training over the generator stream
    // -> saving trained vectors and token map

    pub fn run() {

        println!("entering program...");
        let args: Vec<String> = env::args().collect();

        println!("building parameters...");
        let params = match Config::new(&args) {
            Ok(config) => config.get_params(),
            Err(e) => panic!("{}", e)
        };
        println!("{}", params);

        if let Err(e) = ThreadPoolBuilder::new().num_threads(params.num_threads).build_global() {
            panic!("{}", e)
        }

        // load the sanitized records, either from the raw corpus or from the
        // cached copy of a previous run
        let timer = Instant::now();
        let records_path = params.output_dir.to_string() + "/records";
        let records: Vec<String> = if params.saved_records.unwrap_or(false) {
            match files_handling::read_input::<Vec<String>>(&records_path) {
                Ok(records) => records,
                Err(e) => panic!("{}", e)
            }
        } else {
            let records = match Corpus::load(&params.corpus_file, params.line_marker.as_deref()) {
                Ok(records) => records,
                Err(e) => panic!("{}", e)
            };
            if let Err(e) = files_handling::save_output::<Vec<String>>(&params.output_dir, "records", records.clone()) {
                panic!("{}", e)
            }
            records
        };
        println!("loaded {} records, took {} seconds ...", records.len(), timer.elapsed().as_secs());

        // build the vocabulary snapshot and save its token map
        let timer = Instant::now();
        println!("starting vocab building...");
        let token2count = Corpus::count_tokens(&records, params.num_threads);
        let vocab = Vocab::build(&token2count, params.train.vocab_size);
        if let Err(e) = files_handling::save_output::<HashMap<String, usize>>(&params.output_dir, "words", vocab.to_map()) {
            panic!("{}", e)
        }
        println!("finished vocab creation, took {} seconds ...", timer.elapsed().as_secs());

        // run training part, pulling batches from the generator stream
        let timer = Instant::now();
        println!("starting training part...");
        let mut generator = match SkipGramGenerator::new(&records, &vocab, params.window_size, params.train.negative_samples) {
            Ok(generator) => generator,
            Err(e) => panic!("{}", e)
        };
        let trainer = match Train::run(&mut generator, vocab.total_ids(), &params.train) {
            Ok(trainer) => trainer,
            Err(e) => panic!("{}", e)
        };

        // the trained vectors are the sum of the token and context tables
        let w = trainer.get_w_tokens() + trainer.get_w_context();
        if let Err(e) = files_handling::save_output::<Array2<f32>>(&params.output_dir, "vecs", w) {
            panic!("{}", e)
        }

        println!("finished training, saved vecs. Took {} seconds ...", timer.elapsed().as_secs());

    }

}
