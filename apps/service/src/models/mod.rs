pub mod check;

pub use check::{CHECK_ID_LEN, Check, CheckState, HttpMethod, Protocol, random_check_id};
