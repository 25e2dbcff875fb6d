// Item module
// Per-user items; every read and write is scoped to the authenticated owner

pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::{create_item_handler, get_item_handler, list_items_handler, update_item_handler};
pub use models::{Item, ItemList, ItemRequest};
pub use service::ItemService;
