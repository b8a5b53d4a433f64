//! Plain-text rendering for terminal output.

use quotebook_core::{Quote, ALL_CATEGORIES};

pub fn print_quote(quote: &Quote) {
    println!("Quote: \"{}\"", quote.text);
    println!("Category: {}", quote.category);
}

pub fn print_list(selection: &str, quotes: &[&Quote]) {
    if quotes.is_empty() {
        println!("No quotes in \"{selection}\".");
        return;
    }
    for quote in quotes {
        println!("- \"{}\" ({})", quote.text, quote.category);
    }
}

/// Prints `all` first, then each category, marking the active filter.
pub fn print_categories(categories: &[String], selected: &str) {
    let marker = |value: &str| if value == selected { "*" } else { " " };
    println!("{} {ALL_CATEGORIES}", marker(ALL_CATEGORIES));
    for category in categories {
        println!("{} {category}", marker(category));
    }
}
