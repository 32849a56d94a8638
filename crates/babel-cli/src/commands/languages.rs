use babel_core::Language;
use colored::Colorize;

pub fn run() {
    println!("{}", "Supported languages".bright_magenta().bold());
    print_table();
}

pub fn print_table() {
    for language in Language::all() {
        let locale = language.locale().unwrap_or("-");
        println!(
            "  {:<4} {:<12} {}",
            language.code().bright_cyan(),
            language.name(),
            locale.bright_black()
        );
    }
}
