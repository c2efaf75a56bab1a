use async_trait::async_trait;

use crate::defs::ImportError;
use crate::defs::SourcePlugin;

/// Placeholder plugin for feeds that are configured but have nothing to offer yet.
pub struct EmptySource {
    name: String,
}

impl EmptySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl<E: Send + 'static> SourcePlugin<E> for EmptySource {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn fetch(&self) -> Result<Vec<E>, ImportError> {
        // Nothing scheduled, nothing posted.
        Ok(vec![])
    }
}
