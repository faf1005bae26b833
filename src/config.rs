

use serde_json::Value;
use std::{fs, error::Error, fmt::Display};

#[derive(Clone, Debug)]
pub struct TrainParams {
    pub vocab_size: usize,
    pub negative_samples: usize,
    pub embedding_dim: usize,
    pub learning_rate: f32,
    pub max_iter: usize,
    pub progress_verbose: bool
}

impl Display for TrainParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "training hyper parameters:
        vocab_size: {},
        negative_samples: {},
        embedding_dim: {},
        learning_rate: {},
        max_iter: {},
        progress_verbose: {}",
        self.vocab_size, self.negative_samples, self.embedding_dim, self.learning_rate, self.max_iter, self.progress_verbose
        )
    }
}

#[derive(Clone, Debug)]
pub struct Params {
    pub corpus_file: String,
    pub output_dir: String,
    pub line_marker: Option<String>,
    pub window_size: usize,
    pub saved_records: Option<bool>,
    pub num_threads: usize,
    pub train: TrainParams
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using hyper-params:
        corpus_file: {}
        output_dir: {}
        line_marker: {:?}
        window_size: {}
        saved_records: {:?}
        num_threads: {},
        Using training hyper-params: {}",
        self.corpus_file, self.output_dir, self.line_marker, self.window_size, self.saved_records, self.num_threads, self.train)
    }
}

pub struct Config {
    params: Params
}

impl Config {

    pub fn get_params(&self) -> Params {
        return self.params.clone()
    }

    pub fn new(args: &[String]) -> Result<Config, Box<dyn Error>> {

        if args.len() != 2 {
            return Err(format!("input should be a path to json file only").into());
        }

        // parse input json
        let f = fs::File::open(&args[1]).expect("cannot open json file");
        let json: Value = serde_json::from_reader(f).expect("cannot read json file");

        // validate input and output in json
        let corpus_file = json.get("corpus_file").expect("corpus_file was not supplied throught json").as_str().expect("cannot cast input file to string");
        let output_dir = json.get("output_dir").expect("output_dir was not supplied throught json").as_str().expect("cannot cast output path to string");

        // handle default vs input parameters
        let vocab_size = match json.get("vocab_size") {
            Some(vocab_size) => vocab_size.as_i64().expect("panic since given vocab_size is not numeric"),
            None => 10000
        };
        let window_size = match json.get("window_size") {
            Some(window_size) => window_size.as_i64().expect("panic since given window_size is not numeric"),
            None => 4
        };
        let negative_samples = match json.get("negative_samples") {
            Some(negative_samples) => negative_samples.as_i64().expect("panic since given negative_samples is not numeric"),
            None => 4
        };
        let embedding_dim = match json.get("embedding_dim") {
            Some(embedding_dim) => embedding_dim.as_i64().expect("panic since given embedding_dim is not numeric"),
            None => 128
        };
        let learning_rate = match json.get("learning_rate") {
            Some(learning_rate) => learning_rate.as_f64().expect("panic since given learning_rate is not numeric"),
            None => 0.05
        };
        let max_iter = match json.get("max_iter") {
            Some(max_iter) => max_iter.as_i64().expect("panic since given max_iter is not numeric"),
            None => 5
        };
        let line_marker = match json.get("line_marker") {
            Some(line_marker) => Some(line_marker.as_str().expect("panic since given line_marker is not a string").to_owned()),
            None => None
        };
        let saved_records = match json.get("saved_records") {
            Some(saved_records) => Some(saved_records.as_bool().expect("panic since given saved_records is not boolean")),
            None => None
        };
        let num_threads = match json.get("num_threads") {
            Some(num_threads) => num_threads.as_i64().expect("panic since given num_threads is not numeric"),
            None => 4
        };
        let progress_verbose = match json.get("progress_verbose") {
            Some(progress_verbose) => progress_verbose.as_bool().expect("panic since given progress_verbose is not boolean"),
            None => false
        };

        // json numerics arrive as i64, reject negatives before casting so a
        // bad parameter file cannot wrap into an absurd value
        let numeric_params = [
            ("vocab_size", vocab_size),
            ("window_size", window_size),
            ("negative_samples", negative_samples),
            ("embedding_dim", embedding_dim),
            ("max_iter", max_iter),
            ("num_threads", num_threads)
        ];
        for (name, value) in numeric_params {
            if value < 0 {
                return Err(format!("{} must be non-negative, got {}", name, value).into());
            }
        }
        if learning_rate < 0.0 {
            return Err(format!("learning_rate must be non-negative, got {}", learning_rate).into());
        }

        let params = Params {
            corpus_file: corpus_file.to_owned(),
            output_dir: output_dir.to_owned(),
            line_marker: line_marker,
            window_size: window_size as usize,
            saved_records: saved_records,
            num_threads: num_threads as usize,
            train: TrainParams {
                vocab_size: vocab_size as usize,
                negative_samples: negative_samples as usize,
                embedding_dim: embedding_dim as usize,
                learning_rate: learning_rate as f32,
                max_iter: max_iter as usize,
                progress_verbose: progress_verbose
            }
        };

        Ok (
            Self {
                params: params
            }
        )
    }

}


pub mod files_handling {

    use ndarray::Array2;
    use ndarray_npy::{ReadNpyError, read_npy, write_npy};
    use std::{fs::{self, File}, error::Error, collections::HashMap, io::{BufWriter, BufReader}};
    use std::io::prelude::*;
    use flate2::{Compression, read::GzDecoder, write::GzEncoder};

    pub fn read_input<R: ReadFile>(file_path: &str) -> Result<<R as ReadFile>::Item, <R as ReadFile>::Error> {
        let input = <R as ReadFile>::read_file(file_path)?;
        Ok(input)
    }

    pub fn save_output<S: SaveFile>(output_dir: &str, file_name: &str, item: S) -> Result<(), <S as SaveFile>::Error> {

        // create output folder
        if let Err(e) = fs::create_dir_all(output_dir) {
            panic!("{}", e)
        }

        // SaveFile can be Array2<f32>, a token map or the sanitized records
        item.save_file(output_dir, file_name)?;
        return Ok(())

    }

    pub trait ReadFile {
        type Error;
        type Item;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error>;
    }

    impl ReadFile for Array2<f32> {
        type Error = ReadNpyError;
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {
            let in_file = file_path.to_string() + ".npy";
            let item = read_npy(in_file)?;
            Ok(item)
        }
    }

    impl ReadFile for HashMap<String, usize> {
        type Error = std::io::Error;
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {
            let in_file = file_path.to_string() + ".txt";
            let f = File::open(in_file)?;
            let item = serde_json::from_reader(f)?;
            return Ok(item)
        }
    }

    impl ReadFile for Vec<String> {
        type Error = Box<dyn Error>;
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {
            let in_file = file_path.to_string() + ".gz";
            let f = BufReader::new(File::open(in_file)?);
            let mut reader = GzDecoder::new(f);
            let mut buf: Vec<u8> = Vec::new();
            reader.read_to_end(&mut buf)?;
            let items: Vec<String> = bincode::deserialize(&buf)?;
            return Ok(items)
        }
    }

    pub trait SaveFile {
        type Error;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error>;
    }

    impl SaveFile for Array2<f32> {
        type Error = Box<dyn Error>;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {
            let out = output_dir.to_string() + "/" + file_name + ".npy";
            write_npy(out, self)?;
            Ok(())
        }
    }

    impl SaveFile for HashMap<String, usize> {
        type Error = std::io::Error;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {
            let out = output_dir.to_string() + "/" + file_name + ".txt";
            let f = File::create(out)?;
            serde_json::to_writer(f, self)?;
            return Ok(())
        }
    }

    impl SaveFile for Vec<String> {
        type Error = Box<dyn Error>;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {
            let out = output_dir.to_string() + "/" + file_name + ".gz";
            let f = BufWriter::new(File::create(out)?);
            let mut writer = GzEncoder::new(f, Compression::default());
            let encoded: Vec<u8> = bincode::serialize(self)?;
            writer.write_all(&encoded)?;
            writer.flush()?;
            Ok(())
        }
    }

}
