use CalphadActivity::Examples::activity_examples::activity_examples;
use CalphadActivity::Utils::logger::init_logger;
use log::LevelFilter;

pub fn main() {
    init_logger(LevelFilter::Info);
    let task: usize = 0;
    activity_examples(task);
}
