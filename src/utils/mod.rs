pub mod lenient_serde;
