//! Error taxonomy shared by every part of the rendering and reading pipeline.
//!
//! All failures are synchronous: they terminate the render or populate call
//! in progress and are never retried. A failed render produces no output.
use thiserror::Error;

/// Broad category of a [`FeedError`], used by callers that only care about
/// which class of failure happened (configuration, bad data, missing
/// accessor, wrong call order, I/O).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown feed, unknown format, missing required configuration.
    Configuration,
    /// Malformed value produced by an item at render time.
    Validation,
    /// An item does not answer an accessor a field asked for.
    Capability,
    /// An operation was called before its preconditions were met.
    State,
    /// Reading a source or writing output failed.
    Io,
    /// A feed document could not be parsed.
    Parse,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Specified feed '{0}' is not defined in your configuration.")]
    FeedNotConfigured(String),

    #[error("Unable to find a formatter service for format \"{0}\".")]
    UnknownFormat(String),

    #[error("Atom formatter requires an \"author\" parameter in configuration.")]
    MissingAuthor,

    /// The feed link is a route but no link generator was bound.
    #[error("Feed link is a route \"{0}\" but no link generator is available.")]
    MissingLinkGenerator(String),

    #[error("Route \"{0}\" does not exist.")]
    UnknownRoute(String),

    #[error("Route \"{route}\" requires a \"{parameter}\" parameter.")]
    MissingRouteParameter { route: String, parameter: String },

    #[error("Media field has no element name for format \"{0}\".")]
    MissingMediaName(String),

    #[error("Item media method must returns an array with following keys: type, length & value.")]
    InvalidMedia,

    #[error("'attribute' parameter required an 'attribute_name' parameter.")]
    MissingAttributeName,

    #[error("Field \"{0}\" should be a DateTime instance.")]
    NotADate(String),

    #[error("Date layout \"{0}\" is not a valid format string.")]
    InvalidDateFormat(String),

    #[error("\"{0}\" is not a valid XML element or attribute name.")]
    InvalidName(String),

    #[error("Name \"{0}\" cannot be written in a non UTF-8 feed encoding.")]
    UnencodableName(String),

    /// A value that must end up as text (element content, attribute) was a
    /// map or a nested list.
    #[error("Field \"{0}\" cannot be rendered as text.")]
    NotScalar(String),

    #[error("Method \"{0}\" should be defined in your entity.")]
    AccessorNotFound(String),

    #[error("There is not feed loaded. Please make sure to load a feed before using the get() method.")]
    NotLoaded,

    #[error("An entity should be set OR you should use setItems() first")]
    NothingToDump,

    #[error("The \"{0}\" option is required to dump a feed.")]
    MissingDumpOption(&'static str),

    #[error("\"direction\" option should be set with \"orderBy\" and should be ASC or DESC")]
    InvalidDirection,

    #[error("Feed encoding \"{0}\" is not supported; use UTF-8 or an ASCII-compatible encoding.")]
    UnsupportedEncoding(String),

    #[error("Remote feed \"{0}\" cannot be loaded: no remote source configured")]
    NoRemoteSource(String),

    #[error("Invalid feed source \"{source_str}\": {reason}")]
    InvalidSource { source_str: String, reason: String },

    #[error("Failed to parse feed: {0}")]
    Parse(String),

    #[error("Failed to write XML: {0}")]
    Xml(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeedError::FeedNotConfigured(_)
            | FeedError::UnknownFormat(_)
            | FeedError::MissingAuthor
            | FeedError::MissingLinkGenerator(_)
            | FeedError::UnknownRoute(_)
            | FeedError::MissingRouteParameter { .. }
            | FeedError::MissingMediaName(_)
            | FeedError::MissingDumpOption(_)
            | FeedError::UnsupportedEncoding(_)
            | FeedError::NoRemoteSource(_)
            | FeedError::InvalidSource { .. } => ErrorKind::Configuration,
            FeedError::InvalidMedia
            | FeedError::MissingAttributeName
            | FeedError::NotADate(_)
            | FeedError::InvalidDateFormat(_)
            | FeedError::NotScalar(_)
            | FeedError::InvalidName(_)
            | FeedError::UnencodableName(_)
            | FeedError::InvalidDirection => ErrorKind::Validation,
            FeedError::AccessorNotFound(_) => ErrorKind::Capability,
            FeedError::NotLoaded | FeedError::NothingToDump => ErrorKind::State,
            FeedError::Io(_) | FeedError::Xml(_) => ErrorKind::Io,
            FeedError::Parse(_) => ErrorKind::Parse,
        }
    }
}

pub type Result<T, E = FeedError> = std::result::Result<T, E>;
