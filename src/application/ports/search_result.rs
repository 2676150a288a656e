use crate::domain::PolicyFragment;

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub fragment: PolicyFragment,
    pub score: f32,
}
