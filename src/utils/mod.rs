mod escape;

pub use escape::html_escape;
