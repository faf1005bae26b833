
// imports
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufRead};
use std::error::Error;
use rayon::prelude::*;


pub struct Corpus {}

impl Corpus {

    fn read_file(file_path: &str) -> Result<BufReader<File>, Box<dyn Error>> {

        match File::open(file_path) {
            Ok(f) => Ok(BufReader::new(f)),
            Err(e) => Err(Box::new(e))
        }
    }

    fn parse_line(raw: &[u8], line_marker: Option<&str>) -> Option<String> {

        // a raw line is decoded leniently - bytes that are not valid utf-8 are replaced,
        // so malformed text is sanitized here and never reaches the generator.
        // when a line marker is set, only lines carrying it are kept, and the marker is
        // stripped before normalization. Lines are trimmed and lower cased.
        let line = String::from_utf8_lossy(raw);
        let line = match line_marker {
            Some(marker) => line.strip_prefix(marker)?.to_string(),
            None => line.to_string()
        };

        let line = line.trim().to_lowercase();
        if line.is_empty() {
            return None
        }
        Some(line)
    }

    pub fn load(file_path: &str, line_marker: Option<&str>) -> Result<Vec<String>, Box<dyn Error>> {

        // read corpus lines as bytes, sanitize and filter into records.
        // a record is one sanitized line, immutable once loaded.
        let reader = Corpus::read_file(file_path)?;
        let mut records: Vec<String> = Vec::new();
        for raw in reader.split(b'\n') {
            if let Some(record) = Corpus::parse_line(&raw?, line_marker) {
                records.push(record);
            }
        }

        // the generator depends on a non-empty record set, abort here
        if records.is_empty() {
            return Err(format!("no usable records found in {}", file_path).into());
        }

        Ok(records)
    }

    pub fn count_tokens(records: &[String], num_threads: usize) -> HashMap<String, usize> {

        // count how many times each token appears in the corpus.
        // counting is split into chunks of records, one chunk per thread, merged at the end.
        let chunk_size = std::cmp::max(1, records.len() / std::cmp::max(1, num_threads));

        records
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut local: HashMap<String, usize> = HashMap::new();
            for record in chunk {
                for tok in Corpus::tokenize(record) {
                    let val = local.entry(tok).or_insert(0);
                    *val += 1;
                }
            }
            local
        })
        .reduce(HashMap::new, |mut acc, local| {
            for (tok, count) in local {
                let val = acc.entry(tok).or_insert(0);
                *val += count;
            }
            acc
        })
    }

}


// defines the behavior needed for tokinizing a corpus
pub trait Tokenizer {
    fn tokenize(sequence: &str) -> Vec<String>;
}

impl Tokenizer for Corpus {
    // simple tokenizer by whitespace split
    fn tokenize(sequence: &str) -> Vec<String> {
        return sequence.split_whitespace().map(|x| x.to_string()).collect();
    }
}
