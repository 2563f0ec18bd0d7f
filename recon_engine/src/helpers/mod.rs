mod order_number;

pub use order_number::{candidate_order_number, timestamp_fallback, ORDER_NUMBER_ATTEMPTS, ORDER_NUMBER_LEN};
