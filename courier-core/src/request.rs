//! Request markers. A command produces no value; a request produces `Response`.

/// Unit of work with no return value. Use `#[derive(Command)]` from the facade.
pub trait Command: Send + Sync + 'static {}

/// Unit of work producing a value. The response type is fixed by the request type,
/// not chosen at the call site.
pub trait Request: Send + Sync + 'static {
    type Response: Send + 'static;
}
