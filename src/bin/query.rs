
use std::{env, error::Error, fs::File, io::{BufRead, BufReader}, process};
use skipgram_trainer::Similarity;


// standalone probe over the outputs of a finished training run: ranks analogy
// quartets or lists nearest neighbors, without touching the pipeline itself.
//
// usage: query <analogies|similar> <input-file> <vecs-path> <words-path>
// where vecs-path and words-path are the pipeline outputs without extension,
// e.g. Output/vecs Output/words. The input file holds one query per line:
// four words for analogies (king queen man woman), one word for similar.

const TOP_K: usize = 10;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {

    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        return Err(format!("usage: query <analogies|similar> <input-file> <vecs-path> <words-path>").into());
    }

    let lines = read_query_lines(&args[2])?;
    let mut w = Similarity::read_weights(&args[3])?;
    let t2i = Similarity::read_t2i(&args[4])?;
    let sim_obj = Similarity::new(&mut w, t2i);

    match args[1].as_str() {
        "analogies" => run_analogies(&lines, &sim_obj),
        "similar" => run_similar(&lines, &sim_obj),
        other => Err(format!("unknown task '{}', expected analogies or similar", other).into())
    }
}

fn read_query_lines(file_path: &str) -> Result<Vec<String>, Box<dyn Error>> {

    let f = File::open(file_path)?;
    let mut lines: Vec<String> = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn run_analogies(lines: &[String], sim_obj: &Similarity) -> Result<(), Box<dyn Error>> {

    // each line is a quartet: a is to b as c is to d, the first three words
    // form the query vector b - a + c and d is where it should land
    for line in lines {

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() != 4 {
            return Err(format!("analogy line needs exactly 4 words, got '{}'", line).into());
        }
        let source = [words[0], words[1], words[2]];
        let target = words[3];

        match sim_obj.rank_of_analogy_target(source, target, TOP_K)? {
            Some(place) => println!("{} - {} + {} : '{}' ranked {} of {}", source[1], source[0], source[2], target, place + 1, TOP_K),
            None => println!("{} - {} + {} : '{}' missed the top {}", source[1], source[0], source[2], target, TOP_K)
        }
    }
    Ok(())
}

fn run_similar(lines: &[String], sim_obj: &Similarity) -> Result<(), Box<dyn Error>> {

    // each line is a single word to look up
    for token in lines {

        println!("nearest to {}:", token);
        let neighbors = sim_obj.most_similar(token, TOP_K)?;
        for (i, (neighbor, score)) in neighbors.iter().enumerate() {
            println!("{:>2}. {} ({:.4})", i + 1, neighbor, score);
        }
    }
    Ok(())
}
