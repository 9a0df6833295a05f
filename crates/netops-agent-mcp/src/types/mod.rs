//! All MCP data types used by the server.

pub mod capabilities;
pub mod error;
pub mod message;
pub mod request;
pub mod response;
pub mod schema;

pub use capabilities::*;
pub use error::*;
pub use message::*;
pub use request::*;
pub use response::*;
pub use schema::*;
