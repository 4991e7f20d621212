use std::path::PathBuf;

/// Errors that can occur while loading, partitioning, or writing documents.
///
/// Fatal conditions only: a dangling reference discovered during closure
/// resolution is *not* an error (see [`SplitReport`](crate::split::SplitReport)),
/// it is reported alongside the result instead.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum SplitError {
    /// Filesystem error while reading the source document or writing output.
    Io(std::io::Error),

    /// The source document (or a service document) failed to parse or serialize as YAML.
    Yaml(serde_yaml::Error),

    /// The source document failed to parse or serialize as JSON.
    Json(serde_json::Error),

    /// The output directory already exists and the overwrite flag is not set.
    ///
    /// Partitioning never clobbers an existing directory silently.
    #[display("destination directory {path:?} already exists, enable overwrite to replace it")]
    #[from(skip)]
    DestinationExists {
        /// The offending directory.
        path: PathBuf,
    },

    /// The document is structurally unusable (e.g. the root is not a mapping,
    /// or a YAML mapping key cannot be represented as a string).
    #[display("malformed document: {reason}")]
    #[from(skip)]
    MalformedDocument {
        /// Description of the structural problem.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_be_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SplitError>();
        assert_sync::<SplitError>();
    }

    #[test]
    fn should_display_destination_exists() {
        let error = SplitError::DestinationExists {
            path: PathBuf::from("out/services"),
        };
        insta::assert_snapshot!(error, @r#"destination directory "out/services" already exists, enable overwrite to replace it"#);
    }
}
