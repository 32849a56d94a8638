pub mod history;
pub mod languages;
pub mod repl;
pub mod translate;
