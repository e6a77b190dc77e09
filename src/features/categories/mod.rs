//! Categories group payments under a unique name.
//!
//! Deleting a category deletes every payment filed under it.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/categories` | Create category |
//! | GET | `/api/categories` | List categories (`skip`, `limit`, `order`) |
//! | GET | `/api/categories/{id}` | Get category with its payments |
//! | PUT | `/api/categories/{id}` | Replace category |
//! | DELETE | `/api/categories/{id}` | Delete category and its payments |
//! | GET | `/api/search/categories` | Search by name prefix (`name`) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CategoryService;
