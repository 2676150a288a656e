/// A chunk of policy text returned by the vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyFragment {
    pub text: String,
    pub source: Option<String>,
    pub page: Option<u32>,
}

impl PolicyFragment {
    pub fn new(text: String, source: Option<String>, page: Option<u32>) -> Self {
        Self { text, source, page }
    }
}
