use thiserror::Error;

/// Errors raised while building or querying the item graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Invalid arguments (construction time)
    #[error("Item has an empty type list")]
    EmptyTypeList,

    #[error("Property name is empty")]
    EmptyPropertyName,

    #[error("Invalid value for property '{name}': {reason}")]
    InvalidPropertyValue { name: String, reason: String },

    #[error("Profiled name is missing a name")]
    MissingName,

    #[error("Invalid item index: {index}")]
    InvalidItemIndex { index: String },

    // Lookups
    #[error("Unknown property '{name}'")]
    UnknownProperty { name: String },

    #[error("Property '{name}' has no value at index {index}")]
    PropertyIndexOutOfBounds { name: String, index: usize },

    #[error("No item of type '{types}' at index {index}")]
    ItemIndexOutOfBounds { types: String, index: usize },

    #[error("No item of requested type(s): {types}")]
    NoItemOfType { types: String },

    #[error("Invalid rel type '{rel}' or index {index}")]
    InvalidRel { rel: String, index: usize },

    #[error("Invalid alternate type '{media_type}'")]
    InvalidAlternate { media_type: String },

    // Runtime
    #[error("Invalid language tag '{language}'")]
    InvalidLanguage { language: String },

    #[error("{level}: {message}")]
    Logged { level: String, message: String },

    // I/O and decoding
    #[error("Failed to fetch '{url}': {message}")]
    Fetch { url: String, message: String },

    #[error("Invalid URL '{url}': {message}")]
    Url { url: String, message: String },

    #[error("JSON error: {message}")]
    Json { message: String },

    #[error("Failed to load JSON-LD context '{url}': {message}")]
    ContextLoad { url: String, message: String },

    #[error("Invalid selector '{selector}'")]
    Selector { selector: String },
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
