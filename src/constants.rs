//! Library level constants

/// Maximum number of tags the collector accepts in a stream tagged metric
/// name.
pub const MAX_TAGS: usize = 256;

/// Maximum length, in bytes, of a metric name including its stream tag
/// suffix. Anything longer is rejected by the collector along with every
/// other metric in the same submission, so we drop it ourselves.
pub const MAX_METRIC_NAME_LEN: usize = 4096;

/// Initial capacity of the buffer a flush encodes into when the configuration
/// does not ask for something else.
pub const DEFAULT_BUFFER_SIZE: usize = 32_768;

/// Character substituted for non-printable characters in text metrics.
pub const DEFAULT_NON_PRINT_CHAR_REPLACE: char = '_';
