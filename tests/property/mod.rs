mod parser {
    include!("parser.rs");
}
mod analyzer {
    include!("analyzer.rs");
}
