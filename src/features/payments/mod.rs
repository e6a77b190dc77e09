//! Payments are monetary records, each owned by exactly one category.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/payments` | Create payment |
//! | GET | `/api/payments` | List payments (`skip`, `limit`) |
//! | GET | `/api/payments/{id}` | Get payment |
//! | PUT | `/api/payments/{id}` | Replace payment |
//! | DELETE | `/api/payments/{id}` | Delete payment |
//! | GET | `/api/search/payments` | Search by name prefix (`name`) |
//! | GET | `/api/search/payments-by-category` | Search by category name prefix (`name`) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::PaymentService;
