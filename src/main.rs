use skipgram_trainer::Pipeline;

fn main() {
    Pipeline::run();
}

// corpus expectations:
// one record per line, optionally prefixed by a marker to filter on,
// bad encoding is replaced at load time
