use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn unknown_column(name: impl Into<String>) -> Error {
        Error(ErrorKind::UnknownColumn { name: name.into() }.into())
    }

    pub fn query(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Query {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn empty_atlas() -> Error {
        Error(ErrorKind::EmptyAtlas.into())
    }

    pub fn dimension_mismatch(
        path: impl Into<String>,
        expected: (u32, u32),
        actual: (u32, u32),
    ) -> Error {
        Error(
            ErrorKind::DimensionMismatch {
                path: path.into(),
                expected,
                actual,
            }
            .into(),
        )
    }

    pub fn csv<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Csv {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    pub fn image<E>(path: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Image {
                path: path.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("column '{name}' not found in the csv header")]
    UnknownColumn { name: String },

    #[error("malformed filter predicate: {message}")]
    Query { message: String },

    #[error("cannot build an atlas from zero images")]
    EmptyAtlas,

    #[error(
        "all images must have the same width and height: \
         first image is {}x{}, '{path}' is {}x{}",
        expected.0, expected.1, actual.0, actual.1
    )]
    DimensionMismatch {
        path: String,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("csv error for '{context}': {source}")]
    Csv {
        context: String,
        source: StdErrorBoxed,
    },

    #[error("image error for '{path}': {source}")]
    Image { path: String, source: StdErrorBoxed },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
