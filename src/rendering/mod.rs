pub mod codec;

pub use codec::{decode, decode_rgb, encode, encode_png, is_png, writable_format};
