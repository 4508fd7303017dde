use std::error::Error as StdError;
use std::fmt;

/// Exit code reported for every initialization failure.
pub const FAILURE_EXIT_CODE: i32 = -1;

/// Fatal setup failures. Nothing here is retried.
#[derive(Debug)]
pub enum Error {
    /// The windowing subsystem could not start (no display server).
    Subsystem(String),
    /// The graphics backend could not be initialized.
    Backend(String),
    /// The OS refused to create the window.
    Window(String),
    /// The window could not be bound to a presentable surface.
    Surface(String),
    /// No adapter could drive the surface, or the device failed to open.
    Adapter(String),
    /// A shader program failed to load or link into a pipeline.
    Shader { name: String, reason: String },
    /// A GPU object (buffer, memory, render pass, ...) could not be created.
    Resource { what: &'static str, reason: String },
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        FAILURE_EXIT_CODE
    }

    pub(crate) fn resource<E: fmt::Debug>(what: &'static str) -> impl FnOnce(E) -> Error {
        move |err| Error::Resource {
            what,
            reason: format!("{:?}", err),
        }
    }

    pub(crate) fn shader<E: fmt::Debug>(name: impl Into<String>) -> impl FnOnce(E) -> Error {
        let name = name.into();
        move |err| Error::Shader {
            name,
            reason: format!("{:?}", err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Subsystem(reason) => write!(f, "windowing subsystem failed to start: {}", reason),
            Error::Backend(reason) => write!(f, "failed to initialize graphics backend: {}", reason),
            Error::Window(reason) => write!(f, "can't open the window: {}", reason),
            Error::Surface(reason) => write!(f, "failed to bind window surface: {}", reason),
            Error::Adapter(reason) => write!(f, "no usable graphics adapter: {}", reason),
            Error::Shader { name, reason } => write!(f, "shader program {}: {}", name, reason),
            Error::Resource { what, reason } => write!(f, "failed to create {}: {}", what, reason),
        }
    }
}

impl StdError for Error {}

impl From<winit::error::OsError> for Error {
    fn from(err: winit::error::OsError) -> Self {
        Error::Window(err.to_string())
    }
}

/// Maps a program run onto its process exit code.
pub fn exit_code<T>(result: &Result<T, Error>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => err.exit_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_exits_with_minus_one() {
        let errors = vec![
            Error::Subsystem("no display".into()),
            Error::Backend("unsupported".into()),
            Error::Window("no display".into()),
            Error::Surface("no handle".into()),
            Error::Adapter("none".into()),
            Error::Shader {
                name: "hw1vertex+hw1triang1".into(),
                reason: "link".into(),
            },
            Error::resource("vertex buffer")("out of memory"),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), -1, "{}", err);
            assert_eq!(exit_code::<()>(&Err(err)), -1);
        }
    }

    #[test]
    fn success_exits_with_zero() {
        assert_eq!(exit_code::<u64>(&Ok(12)), 0);
    }

    #[test]
    fn messages_name_the_failing_piece() {
        let err = Error::shader("hw1vertex+hw1triang2")("bad spirv");
        assert_eq!(
            err.to_string(),
            "shader program hw1vertex+hw1triang2: \"bad spirv\""
        );

        let err = Error::resource("render pass")("OutOfMemory");
        assert!(err.to_string().starts_with("failed to create render pass"));
    }
}
