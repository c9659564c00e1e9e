pub mod diphone;
pub mod inventory;

pub use diphone::{extract_sentence, extract_word, unique, Diphone};
pub use inventory::{PhoneInventory, DEFAULT_PHONEMES};
