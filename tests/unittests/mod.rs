mod parser {
    include!("parser.rs");
}
mod analyzer {
    include!("analyzer.rs");
}
mod scopes {
    include!("scopes.rs");
}
mod errors {
    include!("errors.rs");
}
