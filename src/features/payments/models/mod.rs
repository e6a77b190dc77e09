mod payment;

pub use payment::Payment;
