//! Request/response model shared by storage, network and the worker

mod origin;
mod request;
mod response;

pub use origin::Origin;
pub use request::{Method, Request, RequestKey, RequestMode};
pub use response::{Response, ResponseType};
