use crate::utils::validation::file_extension;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
#[error("identifier source failed: {0}")]
pub struct IdentifierGenerationFailure(pub String);

/// Source of globally unique identifiers used for generated file names.
pub trait IdProvider: Send + Sync {
    fn next_id(&self) -> Result<String, IdentifierGenerationFailure>;
}

/// Random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn next_id(&self) -> Result<String, IdentifierGenerationFailure> {
        Ok(Uuid::new_v4().to_string())
    }
}

/// Builds `<id><ext>` for `file_name`, keeping the original extension verbatim.
///
/// # Panics
///
/// Panics when the provider cannot produce an identifier. A broken identifier
/// source is a process-level fault, so no partial name is ever handed out.
pub fn unique_name(provider: &dyn IdProvider, file_name: &str) -> String {
    let id = match provider.next_id() {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Unique name generation failed for {}: {}", file_name, e);
            panic!("unique name generation failed: {}", e);
        }
    };

    format!("{}{}", id, file_extension(file_name))
}
