mod chat;
mod health;
mod status;

pub use chat::chat_routes;
pub use health::health_routes;
pub use status::status_routes;

#[cfg(test)]
pub(crate) mod test_support;
