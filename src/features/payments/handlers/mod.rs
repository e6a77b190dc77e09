pub mod payment_handler;

pub use payment_handler::{
    __path_create_payment, __path_delete_payment, __path_get_payment, __path_list_payments,
    __path_search_payments, __path_search_payments_by_category, __path_update_payment,
    create_payment, delete_payment, get_payment, list_payments, search_payments,
    search_payments_by_category, update_payment,
};
