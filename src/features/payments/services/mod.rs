mod payment_service;

pub(crate) use payment_service::payments_for_categories;
pub use payment_service::PaymentService;
