//! Decoder configuration, fixed when the engine is built.

/// Bounds on what a single decode may visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// How many nested objects deep sub-decoders may go below the root object
    pub max_depth: usize,
    /// How many fields a single object may have
    pub max_fields: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_fields: 1024,
        }
    }
}

/// Options for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Depth and size bounds
    pub limits: Limits,
    /// Skip fields no constructor parameter consumes instead of decoding them.
    ///
    /// Off by default: every field is decoded, so an unsupported token or an
    /// unregistered nested object fails the decode even when nothing uses it.
    /// Skipped fields must still be well-formed JSON.
    pub skip_unknown_fields: bool,
}

impl DecoderConfig {
    /// Set the limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set whether unconsumed fields are skipped.
    pub fn with_skip_unknown_fields(mut self, skip: bool) -> Self {
        self.skip_unknown_fields = skip;
        self
    }
}
