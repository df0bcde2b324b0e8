pub mod kv_store;
pub mod model_client;

pub use kv_store::SqliteKvAdapter;
pub use model_client::MessagesApiAdapter;
