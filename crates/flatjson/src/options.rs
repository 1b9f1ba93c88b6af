use crate::scanner::DEFAULT_MAX_DEPTH;

/// Storage and nesting options for a [`Document`](crate::Document).
///
/// Apart from the nesting limit, these options only affect how the token
/// table is allocated.
///
/// # Default
///
/// No slots are reserved, storage is never shrunk and containers may nest
/// [`DEFAULT_MAX_DEPTH`](crate::DEFAULT_MAX_DEPTH) levels deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Number of token slots to reserve up front.
    ///
    /// When non-zero, each load skips the counting pass and parses straight
    /// into the reserved slots. A document needing more tokens than reserved
    /// fails with [`ErrorCode::NoFreeTokens`](crate::ErrorCode::NoFreeTokens)
    /// instead of growing the table. This suits callers that repeatedly load
    /// messages of a known maximum shape.
    ///
    /// # Default
    ///
    /// `0`, meaning every load counts tokens first and allocates exactly.
    pub reserve: usize,

    /// Whether to release unused reserved slots after a successful load.
    ///
    /// # Default
    ///
    /// `false`
    pub shrink_to_fit: bool,

    /// Maximum number of containers open at once.
    ///
    /// Deeper documents fail with
    /// [`ErrorCode::DepthOverflow`](crate::ErrorCode::DepthOverflow). The
    /// scanner recurses once per level, so this bounds its stack use.
    ///
    /// # Default
    ///
    /// [`DEFAULT_MAX_DEPTH`](crate::DEFAULT_MAX_DEPTH)
    pub max_depth: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self::with_reserve(0)
    }
}

impl DocumentOptions {
    /// Options reserving `reserve` token slots.
    #[must_use]
    pub const fn with_reserve(reserve: usize) -> Self {
        Self {
            reserve,
            shrink_to_fit: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Returns these options with the nesting limit set to `max_depth`.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub(crate) const fn single_pass(&self) -> bool {
        self.reserve != 0
    }
}
