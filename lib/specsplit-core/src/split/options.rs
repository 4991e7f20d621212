use std::collections::BTreeMap;
use std::str::FromStr;

/// A service computed or overridden to this name drops its operations
/// entirely.
pub const SKIP_SENTINEL: &str = "skip";

/// Strategy for deciding which service an operation belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::Display)]
pub enum Discriminator {
    /// Group by the operation's first tag (snake-cased), `default` when the
    /// operation has no tags.
    #[default]
    #[display("tag")]
    Tag,
    /// Group by the first path segment that is neither `api` nor a version
    /// segment (`v1`, `v2`, ...), `default` when no such segment exists.
    #[display("path")]
    Path,
}

impl FromStr for Discriminator {
    type Err = InvalidDiscriminator;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tag" => Ok(Self::Tag),
            "path" => Ok(Self::Path),
            other => Err(InvalidDiscriminator {
                value: other.to_string(),
            }),
        }
    }
}

/// The discriminator flag was neither `tag` nor `path`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid discriminator {value:?}, expected \"tag\" or \"path\"")]
pub struct InvalidDiscriminator {
    /// The rejected flag value.
    pub value: String,
}

/// Configuration for one partitioning run.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Provider name used in generated `info` descriptions.
    pub provider: String,
    /// The active service discriminator.
    pub discriminator: Discriminator,
    /// Operations carrying any of these tags are dropped.
    pub exclude: Vec<String>,
    /// Replace an existing output directory instead of failing.
    pub overwrite: bool,
    /// Re-maps a computed service name to a final one; mapping to
    /// [`SKIP_SENTINEL`] drops the service's operations.
    pub name_overrides: BTreeMap<String, String>,
}

impl SplitOptions {
    /// Creates options with the defaults: tag discriminator, nothing
    /// excluded, no overrides, no overwrite.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            discriminator: Discriminator::default(),
            exclude: Vec::new(),
            overwrite: false,
            name_overrides: BTreeMap::new(),
        }
    }

    /// Sets the service discriminator.
    #[must_use]
    pub fn with_discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = discriminator;
        self
    }

    /// Sets the tags whose operations are excluded from every service.
    #[must_use]
    pub fn with_exclude<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    /// Allows clearing and recreating an existing output directory.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Adds a single service-name override.
    #[must_use]
    pub fn with_name_override(
        mut self,
        computed: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        self.name_overrides
            .insert(computed.into(), replacement.into());
        self
    }

    /// Replaces the whole override table.
    #[must_use]
    pub fn with_name_overrides(mut self, overrides: BTreeMap<String, String>) -> Self {
        self.name_overrides = overrides;
        self
    }
}
