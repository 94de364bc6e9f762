pub mod lexicon;
pub mod persons;
