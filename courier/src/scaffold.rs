//! Scaffolding for `courier add-request`: renders a request with its validator and handler.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("request name must be PascalCase, got {0:?}")]
    InvalidName(String),
    #[error("refusing to overwrite {}", .0.display())]
    Exists(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What kind of request to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Command,
    Query,
}

pub fn snake_case(s: &str) -> String {
    let mut out = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn check_name(name: &str) -> Result<(), ScaffoldError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidName(name.to_string()))
    }
}

const COMMAND_RS: &str = r#"//! __NAME__: command, validator and handler.

use courier::{
    async_trait, BoxError, CancellationToken, Command, CommandHandler, HandlerModule,
    ValidationResult, Validator,
};

#[derive(Clone, Debug, Command)]
pub struct __NAME__ {}

pub struct __NAME__Validator;

#[async_trait]
impl Validator<__NAME__> for __NAME__Validator {
    async fn validate(
        &self,
        _request: &__NAME__,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, BoxError> {
        Ok(ValidationResult::success())
    }
}

pub struct __NAME__Handler;

#[async_trait]
impl CommandHandler<__NAME__> for __NAME__Handler {
    async fn handle(&self, _command: __NAME__, _cancel: &CancellationToken) -> Result<(), BoxError> {
        Ok(())
    }
}

pub fn module() -> HandlerModule {
    HandlerModule::new("__CONTEXT__.__SNAKE__")
        .command::<__NAME__, _>(__NAME__Handler)
        .validator::<__NAME__, _>(__NAME__Validator)
}
"#;

const QUERY_RS: &str = r#"//! __NAME__: query, validator and handler.

use courier::{
    async_trait, BoxError, CancellationToken, HandlerModule, Request, RequestHandler,
    ValidationResult, Validator,
};

#[derive(Clone, Debug, Request)]
#[response(__NAME__Response)]
pub struct __NAME__ {}

#[derive(Clone, Debug)]
pub struct __NAME__Response {}

pub struct __NAME__Validator;

#[async_trait]
impl Validator<__NAME__> for __NAME__Validator {
    async fn validate(
        &self,
        _request: &__NAME__,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, BoxError> {
        Ok(ValidationResult::success())
    }
}

pub struct __NAME__Handler;

#[async_trait]
impl RequestHandler<__NAME__> for __NAME__Handler {
    async fn handle(
        &self,
        _request: __NAME__,
        _cancel: &CancellationToken,
    ) -> Result<__NAME__Response, BoxError> {
        Ok(__NAME__Response {})
    }
}

pub fn module() -> HandlerModule {
    HandlerModule::new("__CONTEXT__.__SNAKE__")
        .request::<__NAME__, _>(__NAME__Handler)
        .validator::<__NAME__, _>(__NAME__Validator)
}
"#;

/// Render the source file for one request.
pub fn render(context: &str, name: &str, kind: RequestKind) -> Result<String, ScaffoldError> {
    check_name(name)?;
    let template = match kind {
        RequestKind::Command => COMMAND_RS,
        RequestKind::Query => QUERY_RS,
    };
    Ok(template
        .replace("__CONTEXT__", context)
        .replace("__SNAKE__", &snake_case(name))
        .replace("__NAME__", name))
}

/// Write `<root>/<context>/<snake_name>.rs` and declare it in `<context>/mod.rs`.
/// Returns the path of the new file.
pub fn write_request(
    root: &Path,
    context: &str,
    name: &str,
    kind: RequestKind,
) -> Result<PathBuf, ScaffoldError> {
    let source = render(context, name, kind)?;
    let snake = snake_case(name);
    let dir = root.join(context);
    let file = dir.join(format!("{}.rs", snake));
    if file.exists() {
        return Err(ScaffoldError::Exists(file));
    }
    let mod_rs = dir.join("mod.rs");
    let existing = match fs::read_to_string(&mod_rs) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    fs::create_dir_all(&dir)?;
    fs::write(&file, source)?;

    let declaration = format!("pub mod {};", snake);
    if !existing.lines().any(|l| l.trim() == declaration) {
        let mut f = OpenOptions::new().create(true).append(true).open(&mod_rs)?;
        if !existing.is_empty() && !existing.ends_with('\n') {
            writeln!(f)?;
        }
        writeln!(f, "{}", declaration)?;
    }
    Ok(file)
}
