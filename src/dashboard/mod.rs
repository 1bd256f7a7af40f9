// ABOUTME: Read-only deploy history dashboard.
// ABOUTME: Text renderer, HTTP request handler, and the hyper accept loop.

mod handler;
mod render;
mod server;

pub use handler::{
    Dashboard, MALFORMED_SINCE, MalformedSince, channel_id_from_uri, channel_segment,
    since_from_query,
};
pub use render::{HEADER, NO_DEPLOYS, Renderer};
pub use server::serve;
