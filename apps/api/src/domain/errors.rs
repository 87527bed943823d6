use thiserror::Error;

/// A status change that the entity's lifecycle does not allow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot move {entity} from {from} to {to}")]
pub struct TransitionError {
    pub entity: &'static str,
    pub from: String,
    pub to: String,
}

impl TransitionError {
    pub fn new(entity: &'static str, from: impl ToString, to: impl ToString) -> Self {
        Self {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
