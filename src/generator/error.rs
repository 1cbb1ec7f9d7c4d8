use std::path::PathBuf;
use std::time::Duration;

/// Errors raised while deriving, rendering, writing or compiling a schema.
///
/// Every variant is fatal for the current run. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// A handler's request or response type is not a record.
    #[error("handler `{handler}`: {role} type must be a record, found {found} `{type_name}`")]
    InvalidHandler {
        handler: String,
        role: &'static str,
        found: &'static str,
        type_name: String,
    },

    /// Two structurally different records share one declared name.
    #[error("record name collision: `{name}` is declared with two different shapes")]
    NameCollision { name: String },

    /// The schema template could not be rendered.
    #[error("failed to render schema: {0}")]
    Render(#[from] askama::Error),

    /// Writing the schema file failed. The file content is indeterminate.
    #[error("failed to write schema file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external compiler could not be started.
    #[error("failed to start schema compiler `{program}`: {source}")]
    CompilerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external compiler ran and rejected the schema.
    #[error("schema compiler `{program}` failed ({status}):\n{diagnostics}")]
    Compiler {
        program: String,
        status: String,
        diagnostics: String,
    },

    /// The external compiler did not finish in time and was killed.
    #[error("schema compiler `{program}` timed out after {timeout:?}")]
    CompilerTimeout { program: String, timeout: Duration },
}
